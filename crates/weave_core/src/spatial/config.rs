//! Validated spatial hash parameters.
//!
//! A `HashConfig` is checked once when it is built, whether in code or while
//! deserializing, so every later insert and query can trust it.

use super::cell::{cell_of, Cell};
use super::hash::hash_cell;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a spatial hash configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cell size must be positive and finite, got {cell_size}")]
    InvalidCellSize { cell_size: f32 },

    #[error("table size must be non-zero")]
    ZeroTableSize,

    #[error("table size {table_size} exceeds the supported maximum of {max}")]
    TableTooLarge { table_size: usize, max: usize },
}

/// Validated cell size and table size, fixed for one simulation configuration.
///
/// Binding both parameters once keeps insertion and query using the same
/// grid; a mismatch between the two would silently break neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHashConfig")]
pub struct HashConfig {
    cell_size: f32,
    table_size: usize,
}

/// Unchecked wire form of [`HashConfig`].
#[derive(Deserialize)]
struct RawHashConfig {
    cell_size: f32,
    table_size: usize,
}

impl TryFrom<RawHashConfig> for HashConfig {
    type Error = ConfigError;

    fn try_from(raw: RawHashConfig) -> Result<Self, Self::Error> {
        Self::new(raw.cell_size, raw.table_size)
    }
}

impl HashConfig {
    /// Bucket offsets are stored as `u32`.
    pub const MAX_TABLE_SIZE: usize = u32::MAX as usize;

    pub fn new(cell_size: f32, table_size: usize) -> Result<Self, ConfigError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize { cell_size });
        }
        if table_size == 0 {
            return Err(ConfigError::ZeroTableSize);
        }
        if table_size > Self::MAX_TABLE_SIZE {
            return Err(ConfigError::TableTooLarge {
                table_size,
                max: Self::MAX_TABLE_SIZE,
            });
        }
        Ok(Self {
            cell_size,
            table_size,
        })
    }

    /// Configuration with a table sized for `expected_particles`.
    pub fn for_particle_count(cell_size: f32, expected_particles: usize) -> Result<Self, ConfigError> {
        Self::new(cell_size, Self::suggested_table_size(expected_particles))
    }

    /// Smallest prime at least twice the expected particle count (minimum 2).
    pub fn suggested_table_size(expected_particles: usize) -> usize {
        let target = expected_particles.saturating_mul(2).clamp(2, Self::MAX_TABLE_SIZE);
        (target..=Self::MAX_TABLE_SIZE)
            .find(|&n| is_prime(n))
            .unwrap_or(Self::MAX_TABLE_SIZE)
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    #[inline]
    pub fn cell_of(&self, position: Vec3) -> Cell {
        cell_of(position, self.cell_size)
    }

    #[inline]
    pub fn slot_of_cell(&self, cell: Cell) -> usize {
        hash_cell(cell, self.table_size)
    }

    /// Slot of a particle position; same as `hash_particle` with these parameters.
    #[inline]
    pub fn slot_of(&self, position: Vec3) -> usize {
        self.slot_of_cell(self.cell_of(position))
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::hash::hash_particle;

    #[test]
    fn rejects_bad_cell_sizes() {
        for cell_size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                HashConfig::new(cell_size, 64),
                Err(ConfigError::InvalidCellSize { .. })
            ));
        }
    }

    #[test]
    fn rejects_zero_table() {
        assert_eq!(HashConfig::new(1.0, 0), Err(ConfigError::ZeroTableSize));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn rejects_oversized_table() {
        let err = HashConfig::new(1.0, HashConfig::MAX_TABLE_SIZE + 1).unwrap_err();
        assert!(matches!(err, ConfigError::TableTooLarge { .. }));
    }

    #[test]
    fn slot_of_matches_free_function() {
        let config = HashConfig::new(0.5, 1009).unwrap();
        for p in [
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(-7.25, 3.0, -0.01),
            Vec3::new(100.0, -100.0, 42.0),
        ] {
            assert_eq!(config.slot_of(p), hash_particle(p, 1009, 0.5));
        }
    }

    #[test]
    fn suggested_sizes_are_prime_and_large_enough() {
        assert_eq!(HashConfig::suggested_table_size(0), 2);
        assert_eq!(HashConfig::suggested_table_size(1), 2);
        assert_eq!(HashConfig::suggested_table_size(500), 1009);
        assert_eq!(HashConfig::suggested_table_size(10_000), 20_011);
        let config = HashConfig::for_particle_count(1.0, 4096).unwrap();
        assert!(config.table_size() >= 8192);
        assert!(is_prime(config.table_size()));
    }

    #[test]
    fn deserializing_validates() {
        let config: HashConfig =
            serde_json::from_str(r#"{ "cell_size": 0.5, "table_size": 1009 }"#).unwrap();
        assert_eq!(config, HashConfig::new(0.5, 1009).unwrap());
        assert_eq!(
            serde_json::from_str::<HashConfig>(&serde_json::to_string(&config).unwrap()).unwrap(),
            config
        );

        let err = serde_json::from_str::<HashConfig>(r#"{ "cell_size": 0.5, "table_size": 0 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("table size must be non-zero"), "{err}");
        assert!(
            serde_json::from_str::<HashConfig>(r#"{ "cell_size": -1.0, "table_size": 8 }"#)
                .is_err()
        );
    }

    #[test]
    fn error_messages_are_readable() {
        let err = HashConfig::new(-2.0, 8).unwrap_err();
        assert_eq!(err.to_string(), "cell size must be positive and finite, got -2");
    }
}
