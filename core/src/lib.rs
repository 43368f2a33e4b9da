//! Traffic display core for a FLARM collision-avoidance receiver.
//!
//! Target reports from the receiver are held in a shared registry; a periodic
//! tick unit ages them, picks the nearest/best/priority records, handles the
//! selection button, and hands render frames and audio cues to the display and
//! sound collaborators.

pub mod display_interface;
pub mod math;
pub mod prelude;
pub mod receiver_interface;
pub mod telemetry;
pub mod tracking;

pub use prelude::{ConfigSource, DisplayMode, TrafficConfig, TrafficError, TrafficResult};
pub use tracking::{ArbitrationEngine, EngineHandle, TargetRegistry, TickOutcome};
