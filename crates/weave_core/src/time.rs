//! Fixed-step simulation time
//!
//! The integrator advances in constant steps; wall-clock time never feeds
//! back into the simulation.

use std::time::Duration;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationTime {
    step_count: u64,
    step_duration: Duration,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn with_step(step_duration: Duration) -> Self {
        Self {
            step_count: 0,
            step_duration,
            accumulated_time: Duration::ZERO,
        }
    }

    /// Build from a step length in seconds, as stored in settings files.
    pub fn from_secs_f32(dt: f32) -> Self {
        Self::with_step(Duration::from_secs_f32(dt))
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Step length in seconds, for use by integrators.
    pub fn dt(&self) -> f32 {
        self.step_duration.as_secs_f32()
    }

    pub fn advance_step(&mut self) {
        self.step_count += 1;
        self.accumulated_time += self.step_duration;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }
}
