//! Wall-clock timing of simulation steps

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

pub struct StepTimer {
    step_start: Instant,
    step_times: RingBuffer<Duration>,
}

impl StepTimer {
    pub fn new(window: usize) -> Self {
        Self {
            step_start: Instant::now(),
            step_times: RingBuffer::new(window),
        }
    }

    pub fn begin(&mut self) {
        self.step_start = Instant::now();
    }

    pub fn end(&mut self) {
        self.step_times.push(self.step_start.elapsed());
    }

    pub fn steps_per_second(&self) -> f64 {
        let avg = self.step_times.average().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn step_time_ms(&self) -> f64 {
        self.step_times.average().as_secs_f64() * 1000.0
    }

    pub fn step_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.step_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}
