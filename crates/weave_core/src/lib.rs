//! Weave Core
//!
//! Contains the simulation-side building blocks:
//! - Uniform-grid spatial hashing (cell mapping, cell hashing, bucket table)
//! - Fixed-step simulation time
//! - Deterministic math utilities

pub mod math;
pub mod spatial;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
