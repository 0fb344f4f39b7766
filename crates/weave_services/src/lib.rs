//! Weave Services Layer
//!
//! Application-facing services: settings files and their validation, plus
//! occupancy dumps.

pub mod occupancy;
pub mod settings;

pub use occupancy::{OccupancyLog, OccupancyLogError, OccupancySample};
pub use settings::{HashSettings, Settings, SettingsError, SimulationSettings};

/// Load settings from `path`, or fall back to defaults when no path is given.
pub fn load_settings(path: Option<&std::path::Path>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::load(path),
        None => {
            tracing::info!("no settings file given, using defaults");
            Ok(Settings::default())
        }
    }
}
