//! Simulation settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use weave_core::glam::Vec3;
use weave_core::spatial::{ConfigError, HashConfig};

/// Errors produced while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings")]
    Parse(#[from] serde_json::Error),

    #[error("invalid spatial hash settings")]
    Hash(#[from] ConfigError),

    #[error("time step must be positive and finite, got {dt}")]
    InvalidTimeStep { dt: f32 },

    #[error("simulation bounds are empty: min {min:?}, max {max:?}")]
    EmptyBounds { min: [f32; 3], max: [f32; 3] },

    #[error("particle radius must be positive and finite, got {radius}")]
    InvalidRadius { radius: f32 },

    #[error("cell size {cell_size} is smaller than the contact distance {contact_distance}; neighbors would be missed")]
    CellTooSmall { cell_size: f32, contact_distance: f32 },
}

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hash: HashSettings,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashSettings {
    pub cell_size: f32,
    /// Bucket count; sized from the particle count when absent.
    pub table_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub particle_count: usize,
    pub steps: u64,
    pub seed: u64,
    /// Fixed step length in seconds.
    pub dt: f32,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub particle_radius: f32,
    pub gravity: f32,
    /// Fraction of speed kept when bouncing off a wall.
    pub restitution: f32,
    /// Steps between progress reports.
    pub report_interval: u64,
    /// Where to write per-report occupancy statistics, if anywhere.
    pub occupancy_dump: Option<PathBuf>,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            cell_size: 0.1,
            table_size: None,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            steps: 600,
            seed: 0x5EED,
            dt: 1.0 / 60.0,
            bounds_min: [-2.0, 0.0, -2.0],
            bounds_max: [2.0, 4.0, 2.0],
            particle_radius: 0.05,
            gravity: -9.81,
            restitution: 0.5,
            report_interval: 60,
            occupancy_dump: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field and build the spatial hash configuration.
    pub fn validate(&self) -> Result<HashConfig, SettingsError> {
        let sim = &self.simulation;
        if !(sim.dt.is_finite() && sim.dt > 0.0) {
            return Err(SettingsError::InvalidTimeStep { dt: sim.dt });
        }
        let (min, max) = (sim.bounds_min(), sim.bounds_max());
        if !min.cmplt(max).all() {
            return Err(SettingsError::EmptyBounds {
                min: sim.bounds_min,
                max: sim.bounds_max,
            });
        }
        if !(sim.particle_radius.is_finite() && sim.particle_radius > 0.0) {
            return Err(SettingsError::InvalidRadius {
                radius: sim.particle_radius,
            });
        }

        let config = self.hash_config()?;
        let contact_distance = sim.contact_distance();
        if config.cell_size() < contact_distance {
            return Err(SettingsError::CellTooSmall {
                cell_size: config.cell_size(),
                contact_distance,
            });
        }
        Ok(config)
    }

    /// Spatial hash configuration, without the simulation cross-checks.
    pub fn hash_config(&self) -> Result<HashConfig, SettingsError> {
        let config = match self.hash.table_size {
            Some(table_size) => HashConfig::new(self.hash.cell_size, table_size)?,
            None => HashConfig::for_particle_count(
                self.hash.cell_size,
                self.simulation.particle_count,
            )?,
        };
        Ok(config)
    }
}

impl SimulationSettings {
    pub fn bounds_min(&self) -> Vec3 {
        Vec3::from_array(self.bounds_min)
    }

    pub fn bounds_max(&self) -> Vec3 {
        Vec3::from_array(self.bounds_max)
    }

    /// Centers closer than this are in contact.
    pub fn contact_distance(&self) -> f32 {
        self.particle_radius * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Settings::default().validate().unwrap();
        assert_eq!(config.cell_size(), 0.1);
        assert_eq!(config.table_size(), HashConfig::suggested_table_size(10_000));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings =
            Settings::from_json_str(r#"{ "hash": { "cell_size": 0.5, "table_size": 4096 } }"#)
                .unwrap();
        assert_eq!(settings.hash.cell_size, 0.5);
        assert_eq!(settings.hash.table_size, Some(4096));
        assert_eq!(settings.simulation, SimulationSettings::default());
        assert_eq!(settings.validate().unwrap().table_size(), 4096);
    }

    #[test]
    fn json_round_trips() {
        let settings = Settings::default();
        let text = settings.to_json_pretty().unwrap();
        assert_eq!(Settings::from_json_str(&text).unwrap(), settings);
    }

    #[test]
    fn occupancy_dump_path_is_optional() {
        let settings =
            Settings::from_json_str(r#"{ "simulation": { "occupancy_dump": "out/occupancy.json" } }"#)
                .unwrap();
        assert_eq!(
            settings.simulation.occupancy_dump,
            Some(PathBuf::from("out/occupancy.json"))
        );
        assert_eq!(Settings::default().simulation.occupancy_dump, None);
    }

    #[test]
    fn zero_table_size_is_a_hash_error() {
        let mut settings = Settings::default();
        settings.hash.table_size = Some(0);
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Hash(ConfigError::ZeroTableSize))
        ));
    }

    #[test]
    fn negative_cell_size_is_a_hash_error() {
        let mut settings = Settings::default();
        settings.hash.cell_size = -0.1;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Hash(ConfigError::InvalidCellSize { .. }))
        ));
    }

    #[test]
    fn cells_must_cover_the_contact_distance() {
        let mut settings = Settings::default();
        settings.simulation.particle_radius = 0.2;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::CellTooSmall { .. })
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut settings = Settings::default();
        settings.simulation.bounds_max = [1.0, -1.0, 1.0];
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::EmptyBounds { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Settings::from_json_str("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn shipped_config_validates() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/cloth_drop.json");
        let settings = Settings::load(path).unwrap();
        let config = settings.validate().unwrap();
        assert_eq!(config.table_size(), 40_009);
        assert_eq!(settings.simulation.particle_count, 20_000);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Settings::load("/nonexistent/weave-settings.json").unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
