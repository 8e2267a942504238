//! Ranking results

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A selected hit: its position in the backend response and its score
///
/// The score is the reranker's when reranking succeeded, otherwise the
/// backend's own relevance score copied through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// Index into the backend hit list
    pub index: usize,
    /// Relevance score
    pub score: f64,
}

impl RankedHit {
    /// Create a ranked hit
    pub fn new(index: usize, score: f64) -> Self {
        Self { index, score }
    }

    /// Descending score order; equal scores keep backend order
    pub fn by_score_desc(a: &RankedHit, b: &RankedHit) -> Ordering {
        b.score.total_cmp(&a.score).then(a.index.cmp(&b.index))
    }
}
