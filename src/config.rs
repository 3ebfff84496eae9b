// Configuration management for Dacapo

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which of the two staves' pitch sequence feeds the fingerprint.
///
/// The interchange files list the upper staff as part 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StaffSelector {
    Upper,
    Lower,
}

impl Default for StaffSelector {
    fn default() -> Self {
        Self::Upper
    }
}

/// Deduplication run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which staff's pitch sequence to fingerprint
    #[serde(default)]
    pub staff_selector: StaffSelector,

    /// MinHash signature width (number of hash permutations)
    #[serde(default = "default_num_permutations")]
    pub num_permutations: usize,

    /// Approximate-match threshold for the LSH index, in (0, 1]
    #[serde(default = "default_similarity_band")]
    pub similarity_band: f64,

    /// Minimum weighted alignment score to confirm duplication, in (0, 1]
    #[serde(default = "default_confirmation_threshold")]
    pub confirmation_threshold: f64,

    /// Worker pool width for fingerprinting and scoring (0 = available parallelism)
    #[serde(default)]
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staff_selector: StaffSelector::default(),
            num_permutations: default_num_permutations(),
            similarity_band: default_similarity_band(),
            confirmation_threshold: default_confirmation_threshold(),
            worker_threads: 0,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Reject values the pipeline cannot run with. Called before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.num_permutations < 8 {
            return Err(ConfigError::Invalid(format!(
                "num_permutations must be at least 8, got {}",
                self.num_permutations
            )));
        }
        if !(self.similarity_band > 0.0 && self.similarity_band <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "similarity_band must be in (0, 1], got {}",
                self.similarity_band
            )));
        }
        if !(self.confirmation_threshold > 0.0 && self.confirmation_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "confirmation_threshold must be in (0, 1], got {}",
                self.confirmation_threshold
            )));
        }
        Ok(())
    }

    /// Effective worker pool width
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Default MinHash signature width (for serde)
fn default_num_permutations() -> usize {
    128
}

/// Default LSH band threshold (for serde)
fn default_similarity_band() -> f64 {
    0.5
}

/// Default confirmation threshold (for serde)
fn default_confirmation_threshold() -> f64 {
    0.8
}
