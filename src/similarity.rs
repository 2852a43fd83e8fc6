//! Pluggable fuzzy-match index used by catalog merge (§4.5) to reconcile
//! renamed entries. Trigram (n=3), case-folded Jaccard similarity is a
//! sufficient stand-in for the source's external similarity provider.

use std::collections::{HashMap, HashSet};

fn trigrams(s: &str) -> HashSet<String> {
    let folded = s.to_lowercase();
    let chars: Vec<char> = folded.chars().collect();
    if chars.len() < 3 {
        let mut set = HashSet::new();
        if !chars.is_empty() {
            set.insert(chars.iter().collect());
        }
        return set;
    }
    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// An n-gram index over a set of identity strings, supporting an approximate
/// `search` for the best match of a query string and a pairwise `similarity`.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    ids: Vec<String>,
    grams: Vec<HashSet<String>>,
    postings: HashMap<String, Vec<usize>>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        SimilarityIndex::default()
    }

    /// Adds `id` to the index, returning its position.
    pub fn add(&mut self, id: impl Into<String>) -> usize {
        let id = id.into();
        let grams = trigrams(&id);
        let idx = self.ids.len();
        for g in &grams {
            self.postings.entry(g.clone()).or_default().push(idx);
        }
        self.ids.push(id);
        self.grams.push(grams);
        idx
    }

    /// Finds the index of the entry most similar to `query`, or `None` if
    /// the index is empty.
    pub fn search(&self, query: &str) -> Option<usize> {
        let query_grams = trigrams(query);
        let mut candidates: HashSet<usize> = HashSet::new();
        for g in &query_grams {
            if let Some(positions) = self.postings.get(g) {
                candidates.extend(positions.iter().copied());
            }
        }
        if candidates.is_empty() && !self.ids.is_empty() {
            candidates.extend(0..self.ids.len());
        }
        candidates
            .into_iter()
            .map(|i| (i, jaccard(&query_grams, &self.grams[i])))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Similarity in `[0, 1]` between two arbitrary strings (not necessarily
    /// members of the index).
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        jaccard(&trigrams(a), &trigrams(b))
    }
}
