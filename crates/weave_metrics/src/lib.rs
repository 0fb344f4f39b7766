//! Weave Metrics - Common utilities for simulation performance tracking
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use weave_metrics::{PhaseProfiler, StepTimer};
//!
//! let mut timer = StepTimer::new(120); // Track last 120 steps
//! let mut profiler = PhaseProfiler::new();
//! timer.begin();
//! profiler.time_phase("build", || { /* rebuild spatial hash */ });
//! timer.end();
//! println!("steps/s: {:.1}", timer.steps_per_second());
//! ```
//!
//! In production builds (without `metrics` feature), all instrumentation
//! is compiled out to zero overhead.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod phase_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod step_timer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;
#[cfg(feature = "metrics")]
pub use step_timer::StepTimer;

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled in the calling crate
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

/// Time a step phase (zero-cost when metrics disabled)
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $name:expr, $body:block) => {{
        #[cfg(feature = "metrics")]
        let result = $profiler.time_phase($name, || $body);
        #[cfg(not(feature = "metrics"))]
        let result = {
            let _ = &$profiler;
            $body
        };
        result
    }};
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct StepTimer;

#[cfg(not(feature = "metrics"))]
impl StepTimer {
    pub fn new(_window: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn steps_per_second(&self) -> f64 { 0.0 }
    pub fn step_time_ms(&self) -> f64 { 0.0 }
    pub fn step_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: u64) {}
    pub fn record_max(&mut self, _name: &'static str, _value: u64) {}
    pub fn iter(&self) -> std::iter::Empty<(&'static str, u64)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self { Self }
    pub fn time_phase<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn iter(&self) -> std::iter::Empty<(&'static str, std::time::Duration)> { std::iter::empty() }
}
