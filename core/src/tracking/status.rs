use crate::display_interface::StatusLine;
use crate::receiver_interface::{ReceiverStatus, Severity, StatusProvider};
use log::info;
use std::sync::Arc;

/// Passes the info overlay stays up after an error, version or progress line.
pub const INFO_PASSES: u32 = 40;
/// TX and GPS lines are re-sent every this many passes (200 ticks).
pub const REASSERT_PASSES: u64 = 40;

/// Output of one status poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub lines: Vec<StatusLine>,
    pub info_active: bool,
}

/// Turns receiver housekeeping flags into overlay lines. Never touches target state.
pub struct StatusMonitor {
    provider: Option<Arc<dyn StatusProvider>>,
    last: Option<ReceiverStatus>,
    info_timer: u32,
    polls: u64,
}

impl StatusMonitor {
    pub fn new(provider: Option<Arc<dyn StatusProvider>>) -> Self {
        Self {
            provider,
            last: None,
            info_timer: 0,
            polls: 0,
        }
    }

    pub fn info_active(&self) -> bool {
        self.info_timer > 0
    }

    pub fn poll(&mut self) -> StatusUpdate {
        let Some(provider) = self.provider.as_ref() else {
            return StatusUpdate::default();
        };
        let status = provider.status();
        self.polls += 1;
        if self.info_timer > 0 {
            self.info_timer -= 1;
        }

        let reassert = self.polls % REASSERT_PASSES == 0;
        let prev = self.last.take();
        let mut lines = Vec::new();

        if reassert || prev.as_ref().map_or(true, |p| p.tx_ok != status.tx_ok) {
            lines.push(line("NO TX", Severity::Reduced, !status.tx_ok));
        }
        if reassert || prev.as_ref().map_or(true, |p| p.gps_ok != status.gps_ok) {
            lines.push(line("NO GPS", Severity::Reduced, !status.gps_ok));
        }
        if prev
            .as_ref()
            .map_or(!status.connected, |p| p.connected != status.connected)
        {
            info!("receiver connected: {}", status.connected);
            lines.push(line("NO FLARM", Severity::Fatal, !status.connected));
        }

        if prev.as_ref().map(|p| &p.error) != Some(&status.error) {
            if let Some(error) = status.error.as_ref() {
                info!(
                    "receiver error code:{} severity:{:?} error:{}",
                    error.code, error.severity, error.text
                );
                self.info_timer = INFO_PASSES;
                lines.push(line(&error.text, error.severity, error.severity != Severity::None));
            }
        }

        let versions = [
            ("SW", prev.as_ref().map(|p| &p.sw_version), &status.sw_version),
            ("HW", prev.as_ref().map(|p| &p.hw_version), &status.hw_version),
            (
                "ODB",
                prev.as_ref().map(|p| &p.obstacle_db_version),
                &status.obstacle_db_version,
            ),
        ];
        for (label, before, now) in versions {
            if before != Some(now) {
                if let Some(version) = now {
                    self.info_timer = INFO_PASSES;
                    lines.push(line(&format!("Flarm {}: {}", label, version), Severity::Info, true));
                }
            }
        }

        if prev.as_ref().map(|p| &p.progress) != Some(&status.progress) {
            if let Some(progress) = status.progress.as_ref() {
                self.info_timer = INFO_PASSES;
                lines.push(line(
                    &format!("{}: {} %", progress.operation, progress.percent),
                    Severity::Info,
                    true,
                ));
            }
        }

        self.last = Some(status);
        StatusUpdate {
            lines,
            info_active: self.info_timer > 0,
        }
    }
}

fn line(text: &str, severity: Severity, shown: bool) -> StatusLine {
    StatusLine {
        text: text.to_string(),
        severity,
        shown,
    }
}
