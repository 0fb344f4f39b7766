//! Process-wide spatial hash counters.
//!
//! Counting is compiled out unless the `metrics` feature is enabled; the
//! snapshot then always reads zero.

use std::sync::atomic::{AtomicU64, Ordering};

static INSERTS: AtomicU64 = AtomicU64::new(0);
static SEALS: AtomicU64 = AtomicU64::new(0);
static NEIGHBORHOOD_QUERIES: AtomicU64 = AtomicU64::new(0);
static CANDIDATES: AtomicU64 = AtomicU64::new(0);

/// Point-in-time copy of the spatial hash counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpatialHashMetricsSnapshot {
    pub inserts: u64,
    pub seals: u64,
    pub neighborhood_queries: u64,
    pub candidates: u64,
}

impl SpatialHashMetricsSnapshot {
    /// Average candidates returned per neighborhood query.
    pub fn candidates_per_query(&self) -> f64 {
        if self.neighborhood_queries == 0 {
            0.0
        } else {
            self.candidates as f64 / self.neighborhood_queries as f64
        }
    }
}

pub fn spatial_hash_metrics_snapshot() -> SpatialHashMetricsSnapshot {
    SpatialHashMetricsSnapshot {
        inserts: INSERTS.load(Ordering::Relaxed),
        seals: SEALS.load(Ordering::Relaxed),
        neighborhood_queries: NEIGHBORHOOD_QUERIES.load(Ordering::Relaxed),
        candidates: CANDIDATES.load(Ordering::Relaxed),
    }
}

pub fn reset_spatial_hash_metrics() {
    INSERTS.store(0, Ordering::Relaxed);
    SEALS.store(0, Ordering::Relaxed);
    NEIGHBORHOOD_QUERIES.store(0, Ordering::Relaxed);
    CANDIDATES.store(0, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_inserts(_count: usize) {
    weave_metrics::metrics! {
        INSERTS.fetch_add(_count as u64, Ordering::Relaxed);
    }
}

#[inline]
pub(crate) fn record_seal() {
    weave_metrics::metrics! {
        SEALS.fetch_add(1, Ordering::Relaxed);
    }
}

#[inline]
pub(crate) fn record_neighborhood_query(_candidates: usize) {
    weave_metrics::metrics! {
        NEIGHBORHOOD_QUERIES.fetch_add(1, Ordering::Relaxed);
        CANDIDATES.fetch_add(_candidates as u64, Ordering::Relaxed);
    }
}
