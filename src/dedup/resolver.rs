// Duplicate resolution: ordered fold over the length-sorted corpus

use std::collections::{HashMap, HashSet};

use crate::corpus::ScoreItem;

use super::alignment::weighted_similarity;
use super::workers::parallel_map;

/// Final state of a resolution pass.
///
/// Invariants: `discarded` is a subset of `processed`; both only grow during
/// the pass; a discarded item never serves as an anchor afterwards.
#[derive(Debug, Default)]
pub struct Resolution {
    pub discarded: HashSet<String>,
    pub processed: HashSet<String>,
}

/// Resolve duplicates over `ordered` (longest first, ties in original corpus
/// order) given each item's precomputed candidate shortlist.
///
/// The fold itself is sequential: whether an item is skipped depends on the
/// decisions taken for every earlier, longer item. Scoring an anchor's
/// surviving candidates is independent per pair and runs on the worker pool.
pub fn resolve(
    ordered: &[&ScoreItem],
    shortlists: &HashMap<String, Vec<String>>,
    confirmation_threshold: f64,
    width: usize,
) -> Resolution {
    let by_path: HashMap<&str, &ScoreItem> =
        ordered.iter().map(|item| (item.path.as_str(), *item)).collect();

    let mut state = Resolution::default();

    for anchor in ordered {
        if state.processed.contains(&anchor.path) {
            // Already confirmed as a duplicate of an earlier, longer anchor
            continue;
        }
        state.processed.insert(anchor.path.clone());

        let Some(shortlist) = shortlists.get(&anchor.path) else {
            log::warn!("No shortlist for {}, treating as unique", anchor.path);
            continue;
        };

        let candidates: Vec<&ScoreItem> = shortlist
            .iter()
            .filter(|path| path.as_str() != anchor.path && !state.processed.contains(path.as_str()))
            .filter_map(|path| by_path.get(path.as_str()).copied())
            .collect();

        if candidates.is_empty() {
            continue;
        }

        let scores = parallel_map(candidates, width, |candidate| {
            let score = weighted_similarity(&anchor.pitches, &candidate.pitches);
            (candidate, score)
        });

        for (candidate, score) in scores {
            if score >= confirmation_threshold {
                log::debug!(
                    "{} confirmed duplicate of {} (score {:.3})",
                    candidate.path,
                    anchor.path,
                    score
                );
                state.discarded.insert(candidate.path.clone());
                state.processed.insert(candidate.path.clone());
            }
        }
    }

    state
}
