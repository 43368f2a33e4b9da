use crate::tracking::target::TargetRecord;
use log::{debug, info};

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// One-line trace of a record after ingestion.
    pub fn dump_target(&self, record: &TargetRecord) {
        debug!(
            "Target (ID {:06X}) age:{} alt:{:.0} m, dis:{:.2} km, var:{:.1} m/s, trck:{:.0}",
            record.id(),
            record.age(),
            record.report().rel_vertical,
            record.distance() / 1000.0,
            record.climb(),
            record.report().heading
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
