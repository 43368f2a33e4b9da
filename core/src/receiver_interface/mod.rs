pub mod button;
pub mod report;
pub mod status;

pub use button::ButtonEvent;
pub use report::{AlarmLevel, TargetReport, NO_OBJECT};
pub use status::{OperationProgress, ReceiverError, ReceiverStatus, Severity, StatusProvider};
