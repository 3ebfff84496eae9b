// Corpus loading: JSONL records from the upstream pitch extraction tooling

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::StaffSelector;

/// Error type for corpus loading
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed corpus record on line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CorpusError>;

/// One score of the corpus: a file path and the pitch sequence of the
/// selected staff. The sequence is never empty.
#[derive(Debug, Clone)]
pub struct ScoreItem {
    pub path: String,
    pub pitches: Vec<i32>,
}

/// One JSONL record as produced by the extraction tooling.
///
/// Either staff may be missing when the extractor could not produce it
/// (wrong part count, unparsable file, empty staff).
#[derive(Debug, Deserialize)]
struct CorpusRecord {
    path: String,
    #[serde(default)]
    upper: Option<Vec<i32>>,
    #[serde(default)]
    lower: Option<Vec<i32>>,
}

/// Load a corpus from a JSON Lines file, keeping the selected staff's pitch
/// sequence per score.
///
/// Records whose selected staff is missing or empty are unusable: they are
/// logged and skipped, never passed into the dedup core. A record repeating
/// an earlier path replaces it (last one wins). A line that is not valid
/// JSON fails the whole load with its line number.
pub fn load_corpus(path: &Path, staff: StaffSelector) -> Result<Vec<ScoreItem>> {
    let contents = std::fs::read_to_string(path)?;
    parse_corpus(&contents, staff)
}

/// Parse JSONL corpus contents. Split out from [`load_corpus`] so tests can
/// feed strings directly.
pub fn parse_corpus(contents: &str, staff: StaffSelector) -> Result<Vec<ScoreItem>> {
    let mut items: Vec<ScoreItem> = Vec::new();
    // path -> position in `items`, for last-record-wins replacement
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: CorpusRecord =
            serde_json::from_str(line).map_err(|source| CorpusError::Malformed {
                line: idx + 1,
                source,
            })?;

        let pitches = match staff {
            StaffSelector::Upper => record.upper,
            StaffSelector::Lower => record.lower,
        };

        let pitches = match pitches {
            Some(p) if !p.is_empty() => p,
            _ => {
                log::warn!(
                    "Skipping {}: no usable {:?} staff",
                    record.path,
                    staff
                );
                skipped += 1;
                continue;
            }
        };

        let item = ScoreItem {
            path: record.path,
            pitches,
        };

        if let Some(&pos) = seen.get(&item.path) {
            log::warn!("Duplicate corpus record for {}, keeping the later one", item.path);
            items[pos] = item;
        } else {
            seen.insert(item.path.clone(), items.len());
            items.push(item);
        }
    }

    log::info!(
        "Loaded {} scores ({} unusable records skipped)",
        items.len(),
        skipped
    );

    Ok(items)
}
