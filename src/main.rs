#![forbid(unsafe_code)]

mod config;
mod sim;
mod terrain;
mod watch;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use voxfield_blocks::BlockRegistry;

use crate::config::AppConfig;
use crate::sim::Sim;

/// Streams generated terrain around a walking observer and logs what a renderer would see.
#[derive(Parser, Debug)]
#[command(name = "voxfield", version, about)]
struct Args {
    /// Config file; missing files fall back to defaults.
    #[arg(long, default_value = "voxfield.toml")]
    config: PathBuf,
    /// Block definitions, overriding `world.blocks`.
    #[arg(long)]
    blocks: Option<PathBuf>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    render_distance: Option<i32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
    /// Reload the blocks file when it changes on disk.
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(args.log_level)
        .parse_env("RUST_LOG")
        .init();

    let mut cfg = AppConfig::load(&args.config)?;
    if let Some(t) = args.ticks {
        cfg.sim.ticks = t;
    }
    if let Some(r) = args.render_distance {
        cfg.stream.render_distance = r.max(1);
    }
    if let Some(s) = args.seed {
        cfg.world.seed = s;
    }
    let blocks_path = args.blocks.unwrap_or_else(|| PathBuf::from(&cfg.world.blocks));
    let registry = BlockRegistry::from_path(&blocks_path)
        .map_err(|e| format!("{}: {e}", blocks_path.display()))?;
    log::info!(
        "{} block states from {}; render distance {}, {} workers",
        registry.len(),
        blocks_path.display(),
        cfg.stream.render_distance,
        cfg.stream.resolved_workers()
    );

    let reload_rx = args.watch.then(|| watch::watch_file(blocks_path.clone()));
    let ticks = cfg.sim.ticks;
    let mut sim = Sim::new(cfg, Arc::new(registry), blocks_path, reload_rx)?;
    sim.run(ticks)
}
