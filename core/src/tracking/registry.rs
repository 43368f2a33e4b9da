use crate::prelude::{ConfigSource, TrafficError, TrafficResult};
use crate::receiver_interface::TargetReport;
use crate::telemetry::{LogManager, MetricsRecorder};
use crate::tracking::arbitration::TICKS_PER_PASS;
use crate::tracking::target::{SampleClock, TargetRecord, AGEOUT};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of a single `ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Created,
    Updated,
    /// Slow report filtered by the hide-non-moving policy.
    Dropped,
}

/// Everything guarded by the registry's exclusive-access section.
#[derive(Debug, Default)]
pub struct RegistryState {
    targets: BTreeMap<u32, TargetRecord>,
    cursor: Option<u32>,
    locked: Option<u32>,
    priority: Option<u32>,
    pass: u64,
    own_heading: f32,
}

impl RegistryState {
    pub fn targets(&self) -> &BTreeMap<u32, TargetRecord> {
        &self.targets
    }

    pub(crate) fn targets_mut(&mut self) -> &mut BTreeMap<u32, TargetRecord> {
        &mut self.targets
    }

    pub fn get(&self, id: u32) -> Option<&TargetRecord> {
        self.targets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn cursor(&self) -> Option<u32> {
        self.cursor
    }

    pub fn locked(&self) -> Option<u32> {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, id: u32) {
        self.locked = Some(id);
    }

    pub fn priority(&self) -> Option<u32> {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, id: Option<u32>) {
        self.priority = id;
    }

    /// Full passes run so far; the time base of report timestamps.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub(crate) fn advance_pass(&mut self) -> u64 {
        self.pass += 1;
        self.pass
    }

    pub fn own_heading(&self) -> f32 {
        self.own_heading
    }

    /// Moves the selection cursor to the next identifier in key order,
    /// wrapping at the end. `skip` is stepped over once if the cursor lands on it.
    pub(crate) fn advance_cursor(&mut self, skip: Option<u32>) -> Option<u32> {
        let mut next = match self.cursor {
            Some(current) => self.key_after(current),
            None => self.targets.keys().next().copied(),
        };
        if next.is_some() && next == skip {
            next = next.and_then(|id| self.key_after(id));
        }
        self.cursor = next;
        next
    }

    fn key_after(&self, id: u32) -> Option<u32> {
        self.targets
            .range((Excluded(id), Unbounded))
            .next()
            .map(|(key, _)| *key)
            .or_else(|| self.targets.keys().next().copied())
    }

    /// Removes a stale record unless it is the current priority record.
    pub fn evict_if_stale(&mut self, id: u32) -> bool {
        let stale = self
            .targets
            .get(&id)
            .is_some_and(|record| record.age() >= AGEOUT);
        stale && self.evict_unless_priority(id)
    }

    /// Removes a record unless it is the current priority record. The cursor is
    /// re-homed to the following identifier when its referent goes.
    pub(crate) fn evict_unless_priority(&mut self, id: u32) -> bool {
        if self.priority == Some(id) {
            return false;
        }
        if self.targets.remove(&id).is_none() {
            return false;
        }
        if self.cursor == Some(id) {
            self.cursor = if self.targets.is_empty() {
                None
            } else {
                Some(self.key_after(id).unwrap_or(id))
            };
        }
        true
    }
}

/// Owner of all target records. Ingestion and the tick unit share one
/// instance behind an `Arc`; every mutation happens under one mutex.
pub struct TargetRegistry {
    state: Mutex<RegistryState>,
    config: Arc<dyn ConfigSource>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl TargetRegistry {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            config,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
        }
    }

    /// Enters the exclusive-access section.
    pub fn lock(&self) -> TrafficResult<MutexGuard<'_, RegistryState>> {
        self.state
            .lock()
            .map_err(|_| TrafficError::LockPoisoned("registry"))
    }

    pub fn config(&self) -> &dyn ConfigSource {
        self.config.as_ref()
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Seconds covered by one full pass at the configured tick period.
    pub fn pass_seconds(&self) -> f32 {
        (self.config.tick_period_ms() * TICKS_PER_PASS) as f32 / 1000.0
    }

    /// Inserts or updates the record for `report.id`.
    pub fn ingest(&self, report: TargetReport) -> TrafficResult<IngestOutcome> {
        if self.config.hide_non_moving() && report.ground_speed < self.config.moving_speed_floor()
        {
            self.metrics.record_dropped();
            return Ok(IngestOutcome::Dropped);
        }

        let pass_seconds = self.pass_seconds();
        let mut state = self.lock()?;
        let clock = SampleClock {
            pass: state.pass,
            pass_seconds,
        };
        let own_heading = state.own_heading;

        let (outcome, record) = match state.targets.entry(report.id) {
            Entry::Vacant(slot) => {
                let record = TargetRecord::create(report, clock, own_heading)?;
                (IngestOutcome::Created, slot.insert(record))
            }
            Entry::Occupied(slot) => {
                let record = slot.into_mut();
                record.update(report, clock, own_heading);
                (IngestOutcome::Updated, record)
            }
        };
        self.logger.dump_target(record);
        drop(state);

        self.metrics
            .record_ingested(outcome == IngestOutcome::Created);
        Ok(outcome)
    }

    /// Own ground course from the receiver, applied from the next pass on.
    pub fn set_own_heading(&self, heading: f32) -> TrafficResult<()> {
        let mut state = self.lock()?;
        state.own_heading = heading;
        Ok(())
    }

    pub fn evict_if_stale(&self, id: u32) -> TrafficResult<bool> {
        let evicted = self.lock()?.evict_if_stale(id);
        if evicted {
            debug!("evicted stale target {:06X}", id);
            self.metrics.record_evicted();
        }
        Ok(evicted)
    }

    pub fn len(&self) -> TrafficResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> TrafficResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of a record, for callers outside the tick unit.
    pub fn get(&self, id: u32) -> TrafficResult<Option<TargetRecord>> {
        Ok(self.lock()?.get(id).cloned())
    }
}
