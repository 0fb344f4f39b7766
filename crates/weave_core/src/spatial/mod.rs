//! Uniform-grid spatial hashing for particle neighbor queries.
//!
//! Positions are floored onto a grid of cubic cells, each cell is hashed to
//! a slot of a fixed-size table, and a per-step [`SpatialHashTable`] groups
//! particle ids by slot. Neighbor candidates for a position come from the
//! 27 cells around it; candidates are a superset of the true neighbors and
//! must be distance-filtered by the caller.

mod cell;
mod config;
mod hash;
mod metrics;
mod stats;
mod table;

pub use cell::{cell_of, Cell, NEIGHBOR_OFFSETS};
pub use config::{ConfigError, HashConfig};
pub use hash::{hash_cell, hash_particle, mix_cell, HASH_PRIME_X, HASH_PRIME_Y, HASH_PRIME_Z};
pub use metrics::{
    reset_spatial_hash_metrics, spatial_hash_metrics_snapshot, SpatialHashMetricsSnapshot,
};
pub use stats::OccupancyStats;
pub use table::{ParticleId, SpatialHashTable, TableError, TablePhase, CROWDED_MEAN_LOAD};
