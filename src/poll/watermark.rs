//! # Watermark Store
//! Per-query timestamp bookkeeping bounding the already-seen region.
//!
//! Each query carries a triple: `freshest` (newest timestamp ever observed,
//! monotonically non-decreasing), `prev_freshest` (snapshot of `freshest`
//! taken when a cycle begins; lower exclusive bound of the fresh window),
//! and `prev_stalest` (oldest timestamp on the most recent page; upper bound
//! for the next continuation request).
//!
//! Deliberately not thread-safe: the single-in-flight-cycle-per-query
//! invariant in the scheduler makes locking unnecessary.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    pub freshest: i64,
    pub prev_freshest: i64,
    pub prev_stalest: i64,
}

impl Watermark {
    fn seeded(at: i64) -> Self {
        Self {
            freshest: at,
            prev_freshest: at,
            prev_stalest: at,
        }
    }
}

/// Watermarks keyed by query identifier. Entries are created lazily from the
/// configured seed (`now - lookback`) on first access.
#[derive(Debug)]
pub struct WatermarkStore {
    seed: i64,
    marks: HashMap<String, Watermark>,
}

impl WatermarkStore {
    pub fn new(seed: i64) -> Self {
        Self {
            seed,
            marks: HashMap::new(),
        }
    }

    pub fn get(&mut self, query: &str) -> Watermark {
        *self.entry(query)
    }

    /// Snapshot `freshest` into `prev_freshest` before filtering the first
    /// page of a new cycle.
    pub fn begin_cycle(&mut self, query: &str) {
        let mark = self.entry(query);
        mark.prev_freshest = mark.freshest;
    }

    /// Raise `freshest` to `candidate` if it is newer. Never decreases.
    pub fn advance_freshest(&mut self, query: &str, candidate: i64) {
        let mark = self.entry(query);
        mark.freshest = mark.freshest.max(candidate);
    }

    pub fn set_prev_stalest(&mut self, query: &str, ts: i64) {
        self.entry(query).prev_stalest = ts;
    }

    fn entry(&mut self, query: &str) -> &mut Watermark {
        self.marks
            .entry(query.to_string())
            .or_insert_with(|| Watermark::seeded(self.seed))
    }
}
