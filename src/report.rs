// Dedup run report written for downstream curation tooling

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::dedup::DedupOutcome;

/// Error type for report writing
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// JSON summary of one deduplication run.
#[derive(Debug, Serialize)]
pub struct DedupReport {
    /// Corpus size before deduplication
    pub total: usize,
    /// Configuration the run used, for reproducibility
    pub config: Config,
    /// Discarded paths, sorted
    pub discarded: Vec<String>,
    /// Retained paths, in original corpus order
    pub retained: Vec<String>,
}

impl DedupReport {
    pub fn new(total: usize, outcome: &DedupOutcome, config: &Config) -> Self {
        let mut discarded: Vec<String> = outcome.discarded.iter().cloned().collect();
        discarded.sort();

        Self {
            total,
            config: config.clone(),
            discarded,
            retained: outcome.retained.clone(),
        }
    }
}

/// Write the report as pretty JSON to `path`, or to stdout when no path is
/// given.
pub fn write_report(report: &DedupReport, path: Option<&Path>) -> Result<()> {
    let contents = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, contents)?;
        }
        None => println!("{contents}"),
    }
    Ok(())
}
