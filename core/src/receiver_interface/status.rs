use serde::{Deserialize, Serialize};

/// Receiver error severity (0 = none .. 3 = fatal).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    None,
    Info,
    Reduced,
    Fatal,
}

impl Severity {
    pub fn from_raw(level: u8) -> Self {
        match level {
            0 => Severity::None,
            1 => Severity::Info,
            2 => Severity::Reduced,
            _ => Severity::Fatal,
        }
    }
}

/// Receiver-reported error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceiverError {
    pub code: u16,
    pub severity: Severity,
    pub text: String,
}

/// A long-running receiver operation, such as a firmware or database update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationProgress {
    pub operation: String,
    pub percent: u8,
}

/// Connectivity and housekeeping flags exposed by the protocol decoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceiverStatus {
    pub connected: bool,
    pub tx_ok: bool,
    pub gps_ok: bool,
    pub rx_count: u32,
    pub error: Option<ReceiverError>,
    pub sw_version: Option<String>,
    pub hw_version: Option<String>,
    pub obstacle_db_version: Option<String>,
    pub progress: Option<OperationProgress>,
}

impl Default for ReceiverStatus {
    fn default() -> Self {
        Self {
            connected: true,
            tx_ok: true,
            gps_ok: true,
            rx_count: 0,
            error: None,
            sw_version: None,
            hw_version: None,
            obstacle_db_version: None,
            progress: None,
        }
    }
}

/// Polled by the engine once per full pass; must be free of side effects.
pub trait StatusProvider: Send + Sync {
    fn status(&self) -> ReceiverStatus;
}
