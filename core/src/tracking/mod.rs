pub mod alarm;
pub mod arbitration;
pub mod registry;
pub mod selection;
pub mod status;
pub mod target;

pub use alarm::{AlarmArbiter, Cue, CueQueue, CUE_QUEUE_DEPTH};
pub use arbitration::{
    ArbitrationEngine, EngineHandle, PassReport, TickOutcome, TICKS_PER_PASS,
};
pub use registry::{IngestOutcome, RegistryState, TargetRegistry};
pub use selection::{SelectionController, SelectionState};
pub use status::{StatusMonitor, StatusUpdate};
pub use target::{SampleClock, TargetRecord, AGEOUT};
