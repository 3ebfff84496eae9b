// MinHash signatures and LSH banding index for candidate shortlisting

use std::collections::{HashMap, HashSet};

/// Approximate set-similarity index over pitch sets.
///
/// Items whose estimated Jaccard similarity exceeds the configured band
/// threshold tend to share at least one LSH bucket; `query` returns the union
/// of an item's bucket members. False positives are expected and filtered by
/// the exact scorer downstream; false negatives are an accepted approximation
/// cost. Built once per run, then read-only.
pub struct MinHashIndex {
    num_permutations: usize,
    num_bands: usize,
    rows_per_band: usize,
    /// item path -> MinHash signature
    signatures: HashMap<String, Vec<u64>>,
    /// (band index, band hash) -> member paths
    buckets: HashMap<(usize, u64), Vec<String>>,
}

impl MinHashIndex {
    /// Create an index with `num_permutations` hash permutations, banded so
    /// that the LSH S-curve threshold lands closest to `similarity_band`.
    pub fn new(num_permutations: usize, similarity_band: f64) -> Self {
        assert!(num_permutations > 0, "num_permutations must be positive");
        let (num_bands, rows_per_band) = pick_bands(num_permutations, similarity_band);
        log::debug!(
            "MinHash index: {} permutations, {} bands x {} rows (threshold {:.3})",
            num_permutations,
            num_bands,
            rows_per_band,
            (1.0 / num_bands as f64).powf(1.0 / rows_per_band as f64)
        );
        Self {
            num_permutations,
            num_bands,
            rows_per_band,
            signatures: HashMap::new(),
            buckets: HashMap::new(),
        }
    }

    /// Compute the MinHash signature of a pitch sequence's value **set**.
    ///
    /// Order-independent and duplicate-insensitive; permutation coefficients
    /// are derived from fixed mixing constants, so the signature is a pure
    /// function of the pitch set and the permutation count.
    pub fn signature(&self, pitches: &[i32]) -> Vec<u64> {
        // Large Mersenne prime for universal hashing
        const PRIME: u64 = (1u64 << 61) - 1;

        let set: HashSet<i32> = pitches.iter().copied().collect();
        let mut signature = vec![u64::MAX; self.num_permutations];

        for pitch in set {
            let base_hash = xxhash_rust::xxh3::xxh3_64(&pitch.to_le_bytes());
            for (i, slot) in signature.iter_mut().enumerate() {
                let seed = i as u64;
                let a = seed.wrapping_mul(0x517cc1b727220a95).wrapping_add(0x6c62272e07bb0142) | 1;
                let b = seed.wrapping_mul(0x6c62272e07bb0142).wrapping_add(0x517cc1b727220a95);
                let perm_hash = a.wrapping_mul(base_hash).wrapping_add(b) % PRIME;
                *slot = (*slot).min(perm_hash);
            }
        }

        signature
    }

    /// Insert a precomputed signature under an item path.
    pub fn insert_signature(&mut self, path: &str, signature: Vec<u64>) {
        debug_assert_eq!(signature.len(), self.num_permutations);
        for band in 0..self.num_bands {
            let key = (band, self.band_hash(&signature, band));
            self.buckets.entry(key).or_default().push(path.to_string());
        }
        self.signatures.insert(path.to_string(), signature);
    }

    /// Compute and insert an item's signature.
    pub fn insert(&mut self, path: &str, pitches: &[i32]) {
        let signature = self.signature(pitches);
        self.insert_signature(path, signature);
    }

    /// Return the paths estimated to exceed the band threshold for an
    /// inserted item. The queried item is always among the results.
    ///
    /// Querying a path that was never inserted is a contract violation: the
    /// build-then-query ordering of the pipeline makes it impossible. Guarded
    /// in debug builds; release builds return an empty list and the caller
    /// treats the item as unique.
    pub fn query(&self, path: &str) -> Vec<String> {
        let Some(signature) = self.signatures.get(path) else {
            debug_assert!(false, "query for {path} before insert");
            log::error!("Similarity query for {} before insert, treating as unique", path);
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for band in 0..self.num_bands {
            let key = (band, self.band_hash(signature, band));
            if let Some(members) = self.buckets.get(&key) {
                for member in members {
                    if seen.insert(member.as_str()) {
                        results.push(member.clone());
                    }
                }
            }
        }
        results
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Hash one band (sub-signature) to a bucket key.
    fn band_hash(&self, signature: &[u64], band: usize) -> u64 {
        let start = band * self.rows_per_band;
        let mut hash = 0u64;
        for &val in &signature[start..start + self.rows_per_band] {
            hash = hash.wrapping_mul(31).wrapping_add(val);
        }
        hash
    }
}

/// Pick the band/row split `(b, r)` with `b * r == num_permutations` whose
/// S-curve threshold `(1/b)^(1/r)` is closest to the requested band.
fn pick_bands(num_permutations: usize, similarity_band: f64) -> (usize, usize) {
    let mut best = (1, num_permutations);
    let mut best_dist = f64::INFINITY;

    for bands in 1..=num_permutations {
        if num_permutations % bands != 0 {
            continue;
        }
        let rows = num_permutations / bands;
        let threshold = (1.0 / bands as f64).powf(1.0 / rows as f64);
        let dist = (threshold - similarity_band).abs();
        if dist < best_dist {
            best_dist = dist;
            best = (bands, rows);
        }
    }

    best
}
