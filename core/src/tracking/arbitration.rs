use crate::display_interface::{
    DetailCommand, DetailReadout, MarkerSnapshot, RenderFrame, Renderer,
};
use crate::prelude::{DisplayMode, TrafficResult};
use crate::receiver_interface::{ButtonEvent, StatusProvider, TargetReport};
use crate::telemetry::LogManager;
use crate::tracking::alarm::{AlarmArbiter, Cue, CueQueue};
use crate::tracking::registry::{IngestOutcome, TargetRegistry};
use crate::tracking::selection::SelectionController;
use crate::tracking::status::StatusMonitor;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A full pass runs on every 5th tick.
pub const TICKS_PER_PASS: u64 = 5;
/// The visual-refresh counter advances every 4th tick...
pub const REFRESH_STRIDE: u64 = 4;
/// ...and requests a full redraw each time it wraps.
pub const REFRESH_WRAP: u32 = 8;
/// Cues are checked on every 2nd full pass.
pub const CUE_PASS_STRIDE: u64 = 2;
pub const BUTTON_QUEUE_DEPTH: usize = 16;
const COUNT_LOG_STRIDE: u64 = 20;

/// What a single `tick()` did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Setup mode is active; nothing was touched.
    Suspended,
    /// Timers only.
    Idle,
    Pass(PassReport),
}

/// Result of a full pass, also handed to the renderer as `frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub frame: RenderFrame,
    pub nearest: Option<u32>,
    pub best: Option<u32>,
    pub cues: Vec<Cue>,
}

/// Cloneable entry point for the ingestion side, the button collaborator and
/// configuration changes.
#[derive(Clone)]
pub struct EngineHandle {
    registry: Arc<TargetRegistry>,
    buttons: mpsc::Sender<ButtonEvent>,
    config_changed: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn ingest(&self, report: TargetReport) -> TrafficResult<IngestOutcome> {
        self.registry.ingest(report)
    }

    pub fn set_own_heading(&self, heading: f32) -> TrafficResult<()> {
        self.registry.set_own_heading(heading)
    }

    /// Queues a button event for the next tick. Returns false if it was dropped.
    pub fn button(&self, event: ButtonEvent) -> bool {
        match self.buttons.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("button queue full, {:?} dropped", event);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Forces a full redraw on the next pass, e.g. after a unit change.
    pub fn notify_config_changed(&self) {
        self.config_changed.store(true, Ordering::SeqCst);
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }
}

/// Periodic tick unit: ages records, flags nearest/best, picks the priority
/// record, evicts, and emits a render frame plus cues.
pub struct ArbitrationEngine {
    registry: Arc<TargetRegistry>,
    selection: SelectionController,
    renderer: Box<dyn Renderer>,
    cues: CueQueue,
    status: StatusMonitor,
    buttons_tx: mpsc::Sender<ButtonEvent>,
    buttons_rx: mpsc::Receiver<ButtonEvent>,
    config_changed: Arc<AtomicBool>,
    tick: u64,
    refresh_counter: u32,
    redraw_requested: bool,
    auto_nearest: Option<u32>,
    logger: LogManager,
}

impl ArbitrationEngine {
    pub fn new(registry: Arc<TargetRegistry>, renderer: Box<dyn Renderer>, cues: CueQueue) -> Self {
        let (buttons_tx, buttons_rx) = mpsc::channel(BUTTON_QUEUE_DEPTH);
        Self {
            registry,
            selection: SelectionController::new(),
            renderer,
            cues,
            status: StatusMonitor::new(None),
            buttons_tx,
            buttons_rx,
            config_changed: Arc::new(AtomicBool::new(false)),
            tick: 0,
            refresh_counter: 0,
            redraw_requested: true,
            auto_nearest: None,
            logger: LogManager::new(),
        }
    }

    pub fn with_status_provider(mut self, provider: Arc<dyn StatusProvider>) -> Self {
        self.status = StatusMonitor::new(Some(provider));
        self
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            registry: Arc::clone(&self.registry),
            buttons: self.buttons_tx.clone(),
            config_changed: Arc::clone(&self.config_changed),
        }
    }

    pub fn notify_config_changed(&self) {
        self.config_changed.store(true, Ordering::SeqCst);
    }

    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn tick(&mut self) -> TrafficResult<TickOutcome> {
        let registry = Arc::clone(&self.registry);
        if registry.config().setup_active() {
            return Ok(TickOutcome::Suspended);
        }

        self.tick += 1;
        self.selection.tick();
        self.drain_buttons(&registry)?;

        if self.tick % REFRESH_STRIDE == 0 {
            self.refresh_counter += 1;
            if self.refresh_counter >= REFRESH_WRAP {
                self.refresh_counter = 0;
                self.redraw_requested = true;
            }
        }
        if self.config_changed.swap(false, Ordering::SeqCst) {
            self.redraw_requested = true;
        }
        if self.tick % COUNT_LOG_STRIDE == 0 {
            info!("Num targets: {}", registry.len()?);
        }

        if self.tick % TICKS_PER_PASS != 0 {
            return Ok(TickOutcome::Idle);
        }

        let report = self.full_pass(&registry)?;
        self.renderer.present(&report.frame);
        Ok(TickOutcome::Pass(report))
    }

    fn drain_buttons(&mut self, registry: &TargetRegistry) -> TrafficResult<()> {
        while let Ok(event) = self.buttons_rx.try_recv() {
            match event {
                ButtonEvent::Press => {
                    let mode = registry.config().display_mode();
                    let mut state = registry.lock()?;
                    self.selection.press(&mut state, mode, self.auto_nearest);
                }
                ButtonEvent::LongLongPress => {
                    let mut state = registry.lock()?;
                    self.selection.long_long_press(&mut state);
                }
                ButtonEvent::LongPress | ButtonEvent::Up(_) | ButtonEvent::Down(_) => {
                    debug!("{:?} left to the setup menu", event);
                }
            }
        }
        Ok(())
    }

    fn full_pass(&mut self, registry: &TargetRegistry) -> TrafficResult<PassReport> {
        let config = registry.config();
        let mode = config.display_mode();
        let warn_distance = config.warn_distance().meters();
        let volume = config.master_volume();
        let units = config.units();
        let status = self.status.poll();

        let mut state = registry.lock()?;
        let pass = state.advance_pass();
        let own_heading = state.own_heading();

        // age pass
        for record in state.targets_mut().values_mut() {
            record.age_tick(own_heading);
        }
        if state
            .targets()
            .values()
            .any(|record| record.is_live() && record.has_alarm())
        {
            self.selection.release();
        }
        let manual = self.selection.is_manual();

        let mut best: Option<(u32, f32)> = None;
        let mut closest: Option<(u32, f32)> = None;
        for (&id, record) in state.targets().iter().filter(|(_, r)| r.is_live()) {
            if best.map_or(true, |(_, climb)| record.climb() > climb) {
                best = Some((id, record.climb()));
            }
            if !manual && closest.map_or(true, |(_, prox)| record.proximity() < prox) {
                closest = Some((id, record.proximity()));
            }
        }
        let best = best.map(|(id, _)| id);
        let nearest = if manual {
            state
                .cursor()
                .filter(|id| state.get(*id).is_some_and(|record| record.is_live()))
        } else {
            closest.map(|(id, _)| id)
        };
        if !manual {
            self.auto_nearest = nearest;
        }

        // flag pass
        for (&id, record) in state.targets_mut().iter_mut() {
            record.set_best(best == Some(id));
            record.set_nearest(nearest == Some(id));
        }

        // visibility filter; evictions are checked against last pass's priority
        let previous_priority = state.priority();
        let mut visible = Vec::new();
        let mut hidden = Vec::new();
        for (&id, record) in state.targets() {
            if record.is_live() && (mode == DisplayMode::Multi || record.is_nearest()) {
                visible.push(id);
            } else {
                hidden.push(id);
            }
        }

        let mut evicted = Vec::new();
        for id in hidden {
            if state.evict_unless_priority(id) {
                debug!("evicted target {:06X}", id);
                registry.metrics().record_evicted();
                evicted.push(id);
            }
        }

        // priority selection
        let priority = visible
            .iter()
            .copied()
            .find(|id| state.get(*id).is_some_and(|record| record.has_alarm()))
            .or_else(|| {
                visible
                    .iter()
                    .copied()
                    .find(|id| state.get(*id).is_some_and(|record| record.is_nearest()))
            });

        let full_redraw = std::mem::take(&mut self.redraw_requested);
        let changed = priority != previous_priority;
        let mut detail = Vec::new();
        if changed {
            info!("priority target {:X?} -> {:X?}", previous_priority, priority);
            if let Some(id) = previous_priority {
                detail.push(DetailCommand::Erase { id });
            }
        }
        if let Some(record) = priority.and_then(|id| state.get(id)) {
            let readout = DetailReadout::from_record(record, units);
            detail.push(if changed || full_redraw {
                DetailCommand::Draw { readout }
            } else {
                DetailCommand::Refresh { readout }
            });
        }
        state.set_priority(priority);

        // draw order: priority last
        let mut order: Vec<u32> = visible
            .iter()
            .copied()
            .filter(|id| Some(*id) != priority)
            .collect();
        order.extend(priority);

        // cue pass
        let mut cues = Vec::new();
        if pass % CUE_PASS_STRIDE == 0 {
            let phase = pass / CUE_PASS_STRIDE;
            for id in &order {
                if let Some(record) = state.targets_mut().get_mut(id) {
                    if record.check_close(warn_distance) {
                        info!("close target {:06X} at {:.0} m", id, record.distance());
                        cues.push(AlarmArbiter::proximity_cue(volume));
                    }
                }
            }
            if let Some(record) = priority.and_then(|id| state.get(id)) {
                if record.has_alarm() {
                    cues.extend(AlarmArbiter::alarm_cue(record.alarm_level(), phase, volume));
                }
            }
        }

        let team = state.locked();
        let markers = order
            .iter()
            .filter_map(|id| state.get(*id))
            .map(|record| MarkerSnapshot::from_record(record, team == Some(record.id())))
            .collect();
        drop(state);

        for cue in &cues {
            let enqueued = self.cues.push(*cue);
            registry.metrics().record_cue(enqueued);
        }
        registry.metrics().record_pass();
        if !evicted.is_empty() {
            self.logger
                .record(&format!("pass {} evicted {} target(s)", pass, evicted.len()));
        }

        let frame = RenderFrame {
            tick: self.tick,
            pass,
            own_heading,
            markers,
            priority,
            team,
            detail,
            evicted,
            full_redraw,
            status_lines: status.lines,
            info_active: status.info_active,
        };

        Ok(PassReport {
            frame,
            nearest,
            best,
            cues,
        })
    }
}
