//! Occupancy dumps
//!
//! Bucket statistics collected on report steps, written out as JSON so runs
//! can be compared offline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use weave_core::spatial::{HashConfig, OccupancyStats};

#[derive(Debug, Error)]
pub enum OccupancyLogError {
    #[error("failed to access occupancy dump at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode occupancy dump")]
    Json(#[from] serde_json::Error),
}

/// Table statistics after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySample {
    pub step: u64,
    pub contacts: usize,
    pub stats: OccupancyStats,
}

/// Every sample of one run, tagged with the hash parameters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyLog {
    pub config: HashConfig,
    pub samples: Vec<OccupancySample>,
}

impl OccupancyLog {
    pub fn new(config: HashConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, step: u64, contacts: usize, stats: OccupancyStats) {
        self.samples.push(OccupancySample {
            step,
            contacts,
            stats,
        });
    }

    /// Worst uniformity ratio seen over the run.
    pub fn worst_uniformity(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|sample| sample.stats.uniformity_ratio())
            .reduce(f64::max)
    }

    pub fn to_json_pretty(&self) -> Result<String, OccupancyLogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, OccupancyLogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), OccupancyLogError> {
        let path = path.as_ref();
        let text = self.to_json_pretty()?;
        std::fs::write(path, text).map_err(|source| OccupancyLogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            samples = self.samples.len(),
            "wrote occupancy dump"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OccupancyLogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| OccupancyLogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
