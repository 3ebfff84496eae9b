// Exact confirmation scoring: length-weighted sequence alignment

use std::collections::HashMap;

/// Longest-matching-block ratio over two ordered pitch sequences
/// (Ratcliff/Obershelp): `2 * M / (len(a) + len(b))` where `M` is the total
/// length of matching contiguous blocks found longest-match-first.
///
/// Returns a value in [0, 1]; 1.0 for identical sequences.
pub fn alignment_ratio(a: &[i32], b: &[i32]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let matched = matching_total(a, b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Length-weighted alignment similarity in [0, 1]:
/// `alignment_ratio(a, b) * (1 - |len(a) - len(b)| / max(len(a), len(b)))`.
///
/// The weight penalizes comparing a short excerpt against a long piece even
/// when the overlapping region matches perfectly. Empty sequences never reach
/// the scorer (the corpus loader excludes them); an all-empty pair scores 0.
pub fn weighted_similarity(a: &[i32], b: &[i32]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }
    let weight = 1.0 - a.len().abs_diff(b.len()) as f64 / max_len as f64;
    alignment_ratio(a, b) * weight
}

/// Total length of matching blocks: take the longest common contiguous block,
/// then recurse into the unmatched regions on either side.
fn matching_total(a: &[i32], b: &[i32]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0usize, a.len(), 0usize, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, size) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if size == 0 {
            continue;
        }
        total += size;
        pending.push((alo, alo + i, blo, blo + j));
        pending.push((alo + i + size, ahi, blo + j + size, bhi));
    }

    total
}

/// Find the longest contiguous block common to `a` and `b`.
///
/// Returns `(start_a, start_b, length)`; ties resolve to the earliest start
/// in `a`, then the earliest in `b`, so the decomposition is deterministic.
fn longest_match(a: &[i32], b: &[i32]) -> (usize, usize, usize) {
    let mut positions_in_b: HashMap<i32, Vec<usize>> = HashMap::new();
    for (j, &value) in b.iter().enumerate() {
        positions_in_b.entry(value).or_default().push(j);
    }

    let mut best = (0usize, 0usize, 0usize);
    // run lengths of common blocks ending at each position of b
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, &value) in a.iter().enumerate() {
        let mut next_runs = HashMap::new();
        if let Some(js) = positions_in_b.get(&value) {
            for &j in js {
                let len = if j > 0 {
                    run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next_runs.insert(j, len);
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        run_lengths = next_runs;
    }

    best
}
