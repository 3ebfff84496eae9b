// Deduplication pipeline: fingerprint, shortlist, confirm, resolve

pub mod alignment;
pub mod minhash;
pub mod resolver;
pub mod workers;

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::corpus::ScoreItem;

use minhash::MinHashIndex;
use resolver::Resolution;

/// Result of a full deduplication run.
#[derive(Debug)]
pub struct DedupOutcome {
    /// Paths decided to be duplicates
    pub discarded: HashSet<String>,
    /// Surviving paths, in original corpus order
    pub retained: Vec<String>,
}

/// Run the full pipeline over a loaded corpus.
///
/// Phases: order longest-first, build the MinHash index (signatures in
/// parallel), shortlist every item against the pre-discard index, then
/// resolve sequentially. Deterministic for a fixed corpus and configuration.
pub fn run(items: &[ScoreItem], config: &Config) -> DedupOutcome {
    let width = config.effective_workers();

    // Longer pieces are canonical anchors; stable sort keeps ties in
    // original corpus order
    let mut ordered: Vec<&ScoreItem> = items.iter().collect();
    ordered.sort_by(|a, b| b.pitches.len().cmp(&a.pitches.len()));

    let mut index = MinHashIndex::new(config.num_permutations, config.similarity_band);

    let signatures = workers::parallel_map(ordered.clone(), width, |item| {
        index.signature(&item.pitches)
    });
    for (item, signature) in ordered.iter().zip(signatures) {
        index.insert_signature(&item.path, signature);
    }
    log::info!("Indexed {} scores ({} workers)", index.len(), width);

    // Shortlists come from the fully built index for every item, regardless
    // of later discards
    let shortlists: HashMap<String, Vec<String>> = ordered
        .iter()
        .map(|item| (item.path.clone(), index.query(&item.path)))
        .collect();

    let Resolution { discarded, .. } =
        resolver::resolve(&ordered, &shortlists, config.confirmation_threshold, width);

    log::info!(
        "Resolved {} duplicates out of {} scores",
        discarded.len(),
        items.len()
    );

    let retained = items
        .iter()
        .filter(|item| !discarded.contains(&item.path))
        .map(|item| item.path.clone())
        .collect();

    DedupOutcome { discarded, retained }
}
