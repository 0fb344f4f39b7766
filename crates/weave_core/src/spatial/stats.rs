//! Bucket occupancy statistics for a sealed table.

use super::table::{SpatialHashTable, TableError};
use serde::{Deserialize, Serialize};

/// Summary of how particles are spread across the buckets of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyStats {
    pub table_size: usize,
    pub particles: usize,
    pub non_empty_buckets: usize,
    pub max_bucket: usize,
    /// Standard deviation of bucket sizes over all buckets.
    pub std_dev: f64,
    /// `histogram[k]` is the number of buckets holding exactly `k` particles.
    pub histogram: Vec<usize>,
}

impl OccupancyStats {
    pub fn from_table(table: &SpatialHashTable) -> Result<Self, TableError> {
        Self::from_bucket_sizes(table.bucket_sizes()?)
            .ok_or(TableError::NotQueryable { phase: table.phase() })
    }

    /// Statistics over explicit bucket sizes. Returns `None` for zero buckets.
    pub fn from_bucket_sizes<I>(sizes: I) -> Option<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut histogram = Vec::new();
        let mut table_size = 0usize;
        let mut particles = 0usize;
        let mut sum_sq = 0f64;
        for size in sizes {
            if histogram.len() <= size {
                histogram.resize(size + 1, 0);
            }
            histogram[size] += 1;
            table_size += 1;
            particles += size;
            sum_sq += (size * size) as f64;
        }
        if table_size == 0 {
            return None;
        }

        let n = table_size as f64;
        let mean = particles as f64 / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        let empty = histogram.first().copied().unwrap_or(0);
        Some(Self {
            table_size,
            particles,
            non_empty_buckets: table_size - empty,
            max_bucket: histogram.len().saturating_sub(1),
            std_dev: variance.sqrt(),
            histogram,
        })
    }

    /// Average particles per bucket over the whole table.
    pub fn mean_load(&self) -> f64 {
        self.particles as f64 / self.table_size as f64
    }

    /// Average particles per non-empty bucket.
    pub fn mean_occupied_load(&self) -> f64 {
        if self.non_empty_buckets == 0 {
            0.0
        } else {
            self.particles as f64 / self.non_empty_buckets as f64
        }
    }

    /// Standard deviation expected if the same particles were assigned to
    /// buckets uniformly at random.
    pub fn random_std_dev(&self) -> f64 {
        let t = self.table_size as f64;
        (self.particles as f64 / t * (1.0 - 1.0 / t)).sqrt()
    }

    /// Ratio of observed to random-assignment standard deviation. Values far
    /// above 1 mean the hash clusters the input.
    pub fn uniformity_ratio(&self) -> f64 {
        let expected = self.random_std_dev();
        if expected == 0.0 {
            if self.std_dev == 0.0 {
                1.0
            } else {
                f64::INFINITY
            }
        } else {
            self.std_dev / expected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{HashConfig, ParticleId};
    use glam::Vec3;

    #[test]
    fn explicit_sizes() {
        let stats = OccupancyStats::from_bucket_sizes([0, 2, 0, 1, 1]).unwrap();
        assert_eq!(stats.table_size, 5);
        assert_eq!(stats.particles, 4);
        assert_eq!(stats.non_empty_buckets, 3);
        assert_eq!(stats.max_bucket, 2);
        assert_eq!(stats.histogram, vec![2, 2, 1]);
        assert!((stats.mean_load() - 0.8).abs() < 1e-12);
        assert!((stats.mean_occupied_load() - 4.0 / 3.0).abs() < 1e-12);
        // sizes 0,2,0,1,1: mean 0.8, E[x^2] 1.2, variance 0.56
        assert!((stats.std_dev - 0.56f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn json_keeps_every_field() {
        let stats = OccupancyStats::from_bucket_sizes([0, 2, 0, 2]).unwrap();
        assert_eq!(stats.std_dev, 1.0);
        let text = serde_json::to_string(&stats).unwrap();
        assert!(text.contains(r#""histogram":[2,0,2]"#), "{text}");
        let back: OccupancyStats = serde_json::from_str(&text).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn no_buckets_gives_none() {
        assert!(OccupancyStats::from_bucket_sizes(std::iter::empty()).is_none());
    }

    #[test]
    fn unsealed_table_has_no_stats() {
        let table = SpatialHashTable::new(HashConfig::new(1.0, 8).unwrap());
        assert!(OccupancyStats::from_table(&table).is_err());
    }

    #[test]
    fn dense_block_of_particles_is_near_random() {
        let mut table = SpatialHashTable::new(HashConfig::new(1.0, 1024).unwrap());
        let mut particles = Vec::new();
        for z in 0..10 {
            for y in 0..10 {
                for x in 0..10 {
                    let id = ParticleId(particles.len() as u32);
                    particles.push((id, Vec3::new(x as f32, y as f32, z as f32) + 0.5));
                }
            }
        }
        table.build(particles).unwrap();
        let stats = OccupancyStats::from_table(&table).unwrap();
        assert_eq!(stats.particles, 1000);
        assert_eq!(stats.table_size, 1024);
        assert!(stats.uniformity_ratio() < 2.0, "{stats:?}");
    }
}
