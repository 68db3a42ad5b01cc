//! crates/docuchat_core/src/index.rs
//!
//! An in-memory vector index over document segments, searched by cosine
//! similarity. The index lives only for the lifetime of the process; it is
//! rebuilt from scratch on every train and discarded on logout or restart.

use crate::domain::Segment;

struct Entry {
    vector: Vec<f32>,
    segment: Segment,
}

/// A flat, in-memory nearest-neighbor index.
///
/// A linear scan is plenty for the session-scoped document sets this
/// application indexes; there is no persistence and no incremental update,
/// rebuilding replaces the prior index entirely.
#[derive(Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one embedded segment.
    pub fn insert(&mut self, vector: Vec<f32>, segment: Segment) {
        self.entries.push(Entry { vector, segment });
    }

    /// Returns the `k` segments most similar to `query`, best match first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&Segment> {
        let mut scored: Vec<(f32, &Segment)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query, &e.vector), &e.segment))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, s)| s).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
