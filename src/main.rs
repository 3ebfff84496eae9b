// Dacapo command line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dacapo::config::{Config, StaffSelector};
use dacapo::report::{self, DedupReport};
use dacapo::{corpus, dedup};

/// Command-line arguments for dacapo
#[derive(Parser, Debug)]
#[command(name = "dacapo")]
#[command(about = "Near-duplicate removal for two-staff piano score corpora")]
#[command(version)]
struct Args {
    /// JSONL corpus file: one record per score with per-staff pitch sequences
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the JSON report (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (defaults apply if missing)
    #[arg(short, long, default_value = "dacapo.toml")]
    config: PathBuf,

    /// Override the configured confirmation threshold
    #[arg(long)]
    confirmation_threshold: Option<f64>,

    /// Override the configured LSH band threshold
    #[arg(long)]
    similarity_band: Option<f64>,

    /// Override which staff's pitch sequence is fingerprinted
    #[arg(long, value_enum)]
    staff: Option<StaffSelector>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    if let Some(threshold) = args.confirmation_threshold {
        config.confirmation_threshold = threshold;
    }
    if let Some(band) = args.similarity_band {
        config.similarity_band = band;
    }
    if let Some(staff) = args.staff {
        config.staff_selector = staff;
    }
    config.validate().context("invalid configuration")?;

    let items = corpus::load_corpus(&args.input, config.staff_selector)
        .with_context(|| format!("loading corpus from {}", args.input.display()))?;

    let outcome = dedup::run(&items, &config);

    let report = DedupReport::new(items.len(), &outcome, &config);
    report::write_report(&report, args.output.as_deref()).context("writing report")?;

    log::info!(
        "Done: {} of {} scores discarded as duplicates",
        outcome.discarded.len(),
        items.len()
    );

    Ok(())
}
