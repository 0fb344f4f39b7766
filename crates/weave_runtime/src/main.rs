//! Weave Runtime
//!
//! Headless particle simulation that exercises the spatial hash every step.
//! Usage: `weave [settings.json]`

mod simulation;

use anyhow::{Context, Result};
use simulation::Simulation;
use std::path::PathBuf;
use weave_core::spatial::{reset_spatial_hash_metrics, spatial_hash_metrics_snapshot};
use weave_metrics::{Counter, PhaseProfiler, StepTimer};
use weave_services::OccupancyLog;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Weave v{}", weave_core::VERSION);

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = weave_services::load_settings(settings_path.as_deref())
        .context("loading settings")?;
    let config = settings.validate().context("validating settings")?;

    let mut sim = Simulation::new(settings.simulation.clone(), config);
    let mut profiler = PhaseProfiler::new();
    let mut timer = StepTimer::new(120);
    let mut counters = Counter::new();
    let mut occupancy_log = settings
        .simulation
        .occupancy_dump
        .as_ref()
        .map(|_| OccupancyLog::new(config));
    reset_spatial_hash_metrics();

    for _ in 0..settings.simulation.steps {
        timer.begin();
        let report = sim.step(&mut profiler).context("simulation step failed")?;
        timer.end();

        counters.increment("contacts", report.contacts as u64);
        counters.record_max("peak_contacts", report.contacts as u64);

        if let Some(occupancy) = report.occupancy {
            counters.record_max("peak_bucket", occupancy.max_bucket as u64);
            let (min_ms, max_ms) = timer.step_time_range_ms();
            tracing::info!(
                step = report.step,
                contacts = report.contacts,
                non_empty = occupancy.non_empty_buckets,
                max_bucket = occupancy.max_bucket,
                uniformity = occupancy.uniformity_ratio(),
                step_ms = timer.step_time_ms(),
                min_ms,
                max_ms,
                "step report"
            );
            if let Some(log) = occupancy_log.as_mut() {
                log.record(report.step, report.contacts, occupancy);
            }
        }
    }

    let metrics = spatial_hash_metrics_snapshot();
    tracing::info!(
        steps = sim.time().step_count(),
        simulated_secs = sim.time().total_time().as_secs_f64(),
        particles = sim.particles().len(),
        table_size = sim.table().config().table_size(),
        steps_per_sec = timer.steps_per_second(),
        candidates_per_query = metrics.candidates_per_query(),
        "simulation finished"
    );
    for (phase, time) in profiler.iter() {
        tracing::info!(phase, total_ms = time.as_secs_f64() * 1000.0, "phase timing");
    }
    for (name, value) in counters.iter() {
        tracing::info!(counter = name, value, "counter");
    }

    if let (Some(log), Some(path)) = (occupancy_log, settings.simulation.occupancy_dump.as_ref()) {
        if let Some(worst) = log.worst_uniformity() {
            tracing::info!(worst_uniformity = worst, "occupancy summary");
        }
        log.write(path).context("writing occupancy dump")?;
    }

    Ok(())
}
