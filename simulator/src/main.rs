use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::DisplayBridge;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use trafficcore::display_interface::NullRenderer;
use workflow::config::SimConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic glider traffic driver for the traffic display core")]
struct Args {
    /// Load simulator settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run this many ticks offline, print a summary and exit
    #[arg(long)]
    offline: Option<u64>,
    /// Append the offline summary line to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Serve the display bridge over HTTP while running live
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    targets: Option<usize>,
    #[arg(long)]
    tick_ms: Option<u64>,
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    }
    .with_overrides(args.seed, args.targets, args.tick_ms, args.port);

    let runner = Runner::new(config);

    if let Some(ticks) = args.offline {
        let summary = runner.run_offline(ticks, Box::new(NullRenderer))?;
        let line = format!(
            "ticks={} passes={} targets={} cues={} priority_changes={} metrics={:?}\n",
            summary.ticks,
            summary.passes,
            summary.targets,
            summary.cues.len(),
            summary.priority_changes,
            summary.metrics
        );
        print!("Offline run -> {}", line);

        if let Some(report_path) = args.report {
            if let Some(parent) = report_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&report_path)
                .with_context(|| format!("opening {}", report_path.display()))?;
            file.write_all(line.as_bytes())?;
        }
        return Ok(());
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for live traffic")?;
    let bridge = args.serve.then(DisplayBridge::new);
    runtime.block_on(runner.run_live(bridge.as_ref()))
}
