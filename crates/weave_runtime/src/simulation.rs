//! Particle step loop driving the spatial hash.
//!
//! Each step integrates gravity with wall bounces, rebuilds the table, then
//! turns neighborhood candidates into contact pairs by distance.

use rayon::prelude::*;
use weave_core::glam::Vec3;
use weave_core::math::DeterministicRng;
use weave_core::spatial::{HashConfig, OccupancyStats, SpatialHashTable, TableError};
use weave_core::time::SimulationTime;
use weave_metrics::PhaseProfiler;
use weave_services::SimulationSettings;

// ============================================================================
// Particles
// ============================================================================

pub struct Particles {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

impl Particles {
    /// Scatter `count` particles uniformly inside the bounds, at rest.
    pub fn scatter(count: usize, min: Vec3, max: Vec3, rng: &mut DeterministicRng) -> Self {
        let positions = (0..count).map(|_| rng.point_in_box(min, max)).collect();
        Self {
            positions,
            velocities: vec![Vec3::ZERO; count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Semi-implicit Euler under gravity, reflecting off the bounding box.
fn integrate_system(particles: &mut Particles, settings: &SimulationSettings, dt: f32) {
    let gravity = Vec3::new(0.0, settings.gravity, 0.0);
    let min = settings.bounds_min();
    let max = settings.bounds_max();
    let restitution = settings.restitution;

    particles
        .positions
        .par_iter_mut()
        .zip(particles.velocities.par_iter_mut())
        .for_each(|(pos, vel)| {
            *vel += gravity * dt;
            let mut next = *pos + *vel * dt;

            for axis in 0..3 {
                if next[axis] < min[axis] || next[axis] > max[axis] {
                    next[axis] = next[axis].clamp(min[axis], max[axis]);
                    vel[axis] = -vel[axis] * restitution;
                }
            }
            *pos = next;
        });
}

/// Number of unordered pairs closer than `contact_distance`.
///
/// Each pair is counted once, from its lower id.
fn contact_system(
    table: &SpatialHashTable,
    positions: &[Vec3],
    contact_distance: f32,
) -> Result<usize, TableError> {
    let limit_sq = contact_distance * contact_distance;
    positions
        .par_iter()
        .enumerate()
        .map_init(Vec::new, |candidates, (i, &p)| -> Result<usize, TableError> {
            table.query_neighborhood_into(p, candidates)?;
            Ok(candidates
                .iter()
                .filter(|id| id.index() > i)
                .filter(|id| positions[id.index()].distance_squared(p) < limit_sq)
                .count())
        })
        .sum()
}

// ============================================================================
// Simulation
// ============================================================================

/// Per-step summary.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: u64,
    pub contacts: usize,
    /// Filled in on report steps only; computing it scans the whole table.
    pub occupancy: Option<OccupancyStats>,
}

pub struct Simulation {
    settings: SimulationSettings,
    particles: Particles,
    table: SpatialHashTable,
    time: SimulationTime,
}

impl Simulation {
    pub fn new(settings: SimulationSettings, config: HashConfig) -> Self {
        let mut rng = DeterministicRng::new(settings.seed);
        let particles = Particles::scatter(
            settings.particle_count,
            settings.bounds_min(),
            settings.bounds_max(),
            &mut rng,
        );
        let table = SpatialHashTable::with_capacity(config, particles.len());
        let time = SimulationTime::from_secs_f32(settings.dt);
        tracing::info!(
            particles = particles.len(),
            cell_size = config.cell_size(),
            table_size = config.table_size(),
            seed = settings.seed,
            "simulation created"
        );
        Self {
            settings,
            particles,
            table,
            time,
        }
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn table(&self) -> &SpatialHashTable {
        &self.table
    }

    pub fn step(&mut self, profiler: &mut PhaseProfiler) -> Result<StepReport, TableError> {
        let dt = self.time.dt();

        weave_metrics::time_scope!(profiler, "integrate", {
            integrate_system(&mut self.particles, &self.settings, dt);
        });

        weave_metrics::time_scope!(profiler, "hash_build", {
            self.table.build_parallel(&self.particles.positions)
        })?;

        let contacts = weave_metrics::time_scope!(profiler, "contacts", {
            contact_system(
                &self.table,
                &self.particles.positions,
                self.settings.contact_distance(),
            )
        })?;

        self.time.advance_step();
        let step = self.time.step_count();

        let report_due =
            self.settings.report_interval > 0 && step % self.settings.report_interval == 0;
        let occupancy = if report_due {
            Some(OccupancyStats::from_table(&self.table)?)
        } else {
            None
        };

        Ok(StepReport {
            step,
            contacts,
            occupancy,
        })
    }
}
