//! swarmform - batch driver for pattern formation runs.
//!
//! Resets the world once per run, ticks until the pattern forms or the tick
//! budget runs out, and logs one `<drones>, <ticks|failure>` line per run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use swarmform_core::{setup_logging, BatchConfig, BatchRunner, DroneCount, Pattern};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "swarmform")]
#[command(about = "Run drone swarms until they form a pattern", long_about = None)]
#[command(version)]
struct Cli {
    /// Pattern name, looked up as <patterns-dir>/<name>.ptn, or a path to a .ptn file
    pattern: String,

    /// JSON batch configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of runs
    #[arg(short, long)]
    runs: Option<usize>,

    /// Tick budget per run
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Fixed drone count for every run (default: 10..=95 in steps of 5)
    #[arg(short, long)]
    drones: Option<usize>,

    /// Base seed for the batch
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory holding named patterns
    #[arg(long)]
    patterns_dir: Option<PathBuf>,

    /// Directory receiving run logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Skip writing the run log
    #[arg(long)]
    no_log: bool,

    /// Print the pattern and the final world of the first run
    #[arg(long)]
    show: bool,

    /// Log filter, e.g. "info" or "swarmform_core=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn batch_config(&self) -> Result<BatchConfig> {
        let mut cfg = match &self.config {
            Some(path) => BatchConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BatchConfig::default(),
        };

        if let Some(runs) = self.runs {
            cfg.runs = runs;
        }
        if let Some(ticks) = self.ticks {
            cfg.tick_limit = ticks;
        }
        if let Some(width) = self.width {
            cfg.swarm.world_width = width;
        }
        if let Some(height) = self.height {
            cfg.swarm.world_height = height;
        }
        if let Some(drones) = self.drones {
            cfg.drones = DroneCount::Fixed(drones);
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(dir) = &self.patterns_dir {
            cfg.patterns_dir = dir.clone();
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = dir.clone();
        }
        Ok(cfg)
    }
}

/// Resolve a pattern argument to `(name, path)`.
fn resolve_pattern(arg: &str, patterns_dir: &Path) -> (String, PathBuf) {
    let direct = PathBuf::from(arg);
    if direct.is_file() {
        let name = direct
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.to_string());
        return (name, direct);
    }
    (arg.to_string(), patterns_dir.join(format!("{}.ptn", arg)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(Some(cli.log_level.clone()));

    let cfg = cli.batch_config()?;
    let (name, path) = resolve_pattern(&cli.pattern, &cfg.patterns_dir);
    let pattern = Pattern::load(&path).with_context(|| format!("loading pattern '{}'", name))?;
    info!(
        "🧩 [Pattern] '{}' {}x{} with {} filled cells",
        name,
        pattern.width(),
        pattern.height(),
        pattern.filled_count()
    );

    let log_dir = cfg.log_dir.clone();
    let runner = BatchRunner::new(cfg, pattern).context("invalid batch configuration")?;
    let summary = runner.run()?;

    if !cli.no_log {
        let log = summary
            .write_log(&log_dir, &name)
            .context("writing run log")?;
        info!("💾 [Batch] Wrote {} records to {}", summary.records.len(), log.display());
    }

    if cli.show {
        let (record, world) = runner.replay(0, summary.base_seed)?;
        println!("pattern '{}':\n{}", name, world.pattern());
        println!("run 0 ({}) after {} ticks:\n{}", record, world.ticks(), world);
    }

    println!(
        "{}: formed {}/{} runs (seed {})",
        name,
        summary.formed(),
        summary.records.len(),
        summary.base_seed
    );
    Ok(())
}
