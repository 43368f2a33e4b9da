use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters since start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub ingested: usize,
    pub dropped: usize,
    pub created: usize,
    pub evicted: usize,
    pub passes: usize,
    pub cues_enqueued: usize,
    pub cues_dropped: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn bump(&self, counter: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            counter(&mut metrics);
        }
    }

    pub fn record_ingested(&self, created: bool) {
        self.bump(|m| {
            m.ingested += 1;
            if created {
                m.created += 1;
            }
        });
    }

    pub fn record_dropped(&self) {
        self.bump(|m| m.dropped += 1);
    }

    pub fn record_evicted(&self) {
        self.bump(|m| m.evicted += 1);
    }

    pub fn record_pass(&self) {
        self.bump(|m| m.passes += 1);
    }

    pub fn record_cue(&self, enqueued: bool) {
        self.bump(|m| {
            if enqueued {
                m.cues_enqueued += 1;
            } else {
                m.cues_dropped += 1;
            }
        });
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
