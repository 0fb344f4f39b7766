//! Accumulated timings for the named phases of a simulation step

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub struct PhaseProfiler {
    timings: BTreeMap<&'static str, Duration>,
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
        }
    }

    pub fn time_phase<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        *self.timings.entry(name).or_insert(Duration::ZERO) += start.elapsed();
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.timings.iter().map(|(&name, &time)| (name, time))
    }
}

impl Default for PhaseProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_accumulate_and_pass_results_through() {
        let mut profiler = PhaseProfiler::new();
        let a = profiler.time_phase("build", || 2);
        let b = profiler.time_phase("build", || 3);
        assert_eq!(a + b, 5);
        profiler.time_phase("query", || std::thread::sleep(Duration::from_millis(2)));

        let timings: Vec<_> = profiler.iter().collect();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].0, "build");
        assert_eq!(timings[1].0, "query");
        assert!(timings[1].1 >= Duration::from_millis(2));
    }
}
