use crate::generator::profile::{DemoReceiver, TrafficScenario};
use crate::gui_bridge::bridge::{DisplayBridge, SharedSettings};
use crate::workflow::config::SimConfig;
use anyhow::Context;
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use trafficcore::display_interface::{RenderFrame, Renderer};
use trafficcore::telemetry::MetricsSnapshot;
use trafficcore::tracking::{
    ArbitrationEngine, Cue, CueQueue, EngineHandle, TargetRegistry, TickOutcome, CUE_QUEUE_DEPTH,
};

/// Summary of an offline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub passes: u64,
    pub targets: usize,
    pub cues: Vec<Cue>,
    pub priority_changes: usize,
    pub metrics: MetricsSnapshot,
    pub last_frame: Option<RenderFrame>,
}

#[derive(Clone)]
pub struct Runner {
    config: SimConfig,
}

impl Runner {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn settings(&self) -> SharedSettings {
        Arc::new(RwLock::new(self.config.traffic.clone()))
    }

    pub fn bridge_addr(&self) -> SocketAddr {
        SocketAddr::from((self.config.bridge.host, self.config.bridge.port))
    }

    fn ticks_per_second(&self) -> u64 {
        (1000 / self.config.traffic.tick_period_ms.max(1)).max(1)
    }

    fn build_engine(
        &self,
        settings: SharedSettings,
        renderer: Box<dyn Renderer>,
    ) -> anyhow::Result<(ArbitrationEngine, mpsc::Receiver<Cue>)> {
        let registry = Arc::new(TargetRegistry::new(settings));
        registry
            .set_own_heading(self.config.scenario.own_heading)
            .context("setting own heading")?;
        let (cues, receiver) = CueQueue::new(CUE_QUEUE_DEPTH);
        let engine = ArbitrationEngine::new(registry, renderer, cues)
            .with_status_provider(Arc::new(DemoReceiver::new()));
        Ok((engine, receiver))
    }

    /// Runs `ticks` ticks on the calling thread with one report burst per
    /// simulated second. Same seed, same result.
    pub fn run_offline(&self, ticks: u64, renderer: Box<dyn Renderer>) -> anyhow::Result<RunSummary> {
        let (mut engine, mut cue_rx) = self.build_engine(self.settings(), renderer)?;
        let handle = engine.handle();
        let mut scenario = TrafficScenario::new(&self.config.scenario);
        let burst_every = self.ticks_per_second();

        let mut summary = RunSummary {
            ticks: 0,
            passes: 0,
            targets: 0,
            cues: Vec::new(),
            priority_changes: 0,
            metrics: MetricsSnapshot::default(),
            last_frame: None,
        };
        let mut last_priority = None;

        for tick in 0..ticks {
            if tick % burst_every == 0 {
                ingest_burst(&handle, scenario.advance(1.0));
            }
            let outcome = engine
                .tick()
                .with_context(|| format!("offline tick {}", tick + 1))?;
            summary.ticks += 1;
            if let TickOutcome::Pass(report) = outcome {
                summary.passes += 1;
                if report.frame.priority != last_priority {
                    summary.priority_changes += 1;
                    last_priority = report.frame.priority;
                }
                summary.last_frame = Some(report.frame);
            }
            while let Ok(cue) = cue_rx.try_recv() {
                summary.cues.push(cue);
            }
        }

        summary.targets = engine.registry().len().context("counting targets")?;
        summary.metrics = engine.registry().metrics().snapshot();
        Ok(summary)
    }

    /// Live mode: 1 Hz ingestion with burst jitter, the tick on a fixed
    /// interval, and a cue player, until Ctrl+C.
    pub async fn run_live(&self, bridge: Option<&DisplayBridge>) -> anyhow::Result<()> {
        let settings = self.settings();
        let renderer: Box<dyn Renderer> = match bridge {
            Some(bridge) => Box::new(bridge.renderer()),
            None => Box::new(trafficcore::display_interface::NullRenderer),
        };
        let (mut engine, mut cue_rx) = self.build_engine(settings.clone(), renderer)?;
        let handle = engine.handle();
        if let Some(bridge) = bridge {
            bridge.serve(handle.clone(), settings, self.bridge_addr());
        }

        let mut scenario = TrafficScenario::new(&self.config.scenario);
        let gliders = scenario.len();
        let jitter_ms = self.config.scenario.burst_jitter_ms;
        let mut jitter_rng = StdRng::seed_from_u64(self.config.scenario.seed.wrapping_add(1));
        let ingest_handle = handle.clone();
        let ingestion = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                if jitter_ms > 0 {
                    let delay = jitter_rng.gen_range(0..=jitter_ms);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                ingest_burst(&ingest_handle, scenario.advance(1.0));
            }
        });

        let tick_period = Duration::from_millis(self.config.traffic.tick_period_ms.max(1));
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_period);
            loop {
                interval.tick().await;
                if let Err(err) = engine.tick() {
                    warn!("tick failed, stopping: {}", err);
                    break;
                }
            }
        });

        let audio = tokio::spawn(async move {
            while let Some(cue) = cue_rx.recv().await {
                info!(
                    "cue {}/{} Hz x{} at {}%",
                    cue.tones.0, cue.tones.1, cue.repeat, cue.volume
                );
            }
        });

        info!("live traffic running with {} glider(s) (Ctrl+C to stop)", gliders);
        tokio::signal::ctrl_c()
            .await
            .context("awaiting Ctrl+C to exit")?;

        ingestion.abort();
        ticker.abort();
        audio.abort();
        info!("metrics at exit: {:?}", handle.registry().metrics().snapshot());
        if let Some(bridge) = bridge {
            info!("display bridge served {} frame(s)", bridge.snapshot().frames_seen);
        }
        Ok(())
    }
}

fn ingest_burst(handle: &EngineHandle, reports: Vec<trafficcore::receiver_interface::TargetReport>) {
    for report in reports {
        if let Err(err) = handle.ingest(report) {
            warn!("report rejected: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::ScenarioConfig;
    use trafficcore::display_interface::NullRenderer;
    use trafficcore::prelude::{TrafficConfig, WarnDistance};

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            traffic: TrafficConfig {
                warn_distance: WarnDistance::M1000,
                ..Default::default()
            },
            scenario: ScenarioConfig {
                seed,
                targets: 5,
                spread_m: 1500.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn offline_run_is_deterministic() {
        let runner = Runner::new(config(21));
        let a = runner.run_offline(400, Box::new(NullRenderer)).unwrap();
        let b = runner.run_offline(400, Box::new(NullRenderer)).unwrap();
        assert_eq!(a.passes, 80);
        assert_eq!(a.cues, b.cues);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.last_frame, b.last_frame);
    }

    #[test]
    fn offline_run_tracks_the_scenario() {
        let runner = Runner::new(config(5));
        let summary = runner.run_offline(200, Box::new(NullRenderer)).unwrap();
        assert_eq!(summary.ticks, 200);
        assert!(summary.targets <= 5);
        assert!(summary.metrics.ingested > 0);
        let frame = summary.last_frame.unwrap();
        assert_eq!(frame.pass, 40);
        assert!(frame.markers.len() <= summary.targets);
        assert!(summary.priority_changes >= 1);
    }

    #[test]
    fn offline_run_feeds_the_bridge() {
        let runner = Runner::new(config(8));
        let bridge = DisplayBridge::new();
        runner.run_offline(25, Box::new(bridge.renderer())).unwrap();
        assert_eq!(bridge.snapshot().frames_seen, 5);
        assert_eq!(bridge.snapshot().frame.pass, 5);
    }
}
