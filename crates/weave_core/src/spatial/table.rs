//! Per-step bucket table keyed by slot index.
//!
//! Buckets live in one flat array. Insertions are logged with their slot and
//! counted per slot; `seal` turns the counts into offsets (prefix sum) and
//! scatters the ids so each bucket is a contiguous slice. All storage is
//! reused between steps, so a steady-state rebuild does not allocate.

use super::cell::Cell;
use super::config::HashConfig;
use super::metrics;
use glam::Vec3;
use rayon::prelude::*;
use thiserror::Error;

/// Mean load of non-empty buckets above which a sealed table is reported as
/// overcrowded.
pub const CROWDED_MEAN_LOAD: f32 = 8.0;

/// Caller-supplied particle identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl ParticleId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ParticleId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Lifecycle of a table within one simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TablePhase {
    /// Cleared; nothing inserted yet.
    Empty,
    /// Accepting insertions for the current step.
    Building,
    /// Sealed; buckets can be queried until the next clear.
    Queryable,
}

/// Errors returned when the table is used out of phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("cannot insert into a sealed table; clear it first")]
    NotBuilding,

    #[error("table is {phase:?}; seal it before querying")]
    NotQueryable { phase: TablePhase },

    #[error("{count} particles exceed the table's u32 index range")]
    TooManyParticles { count: usize },

    #[error("slot {slot} is outside a table of {table_size} buckets")]
    SlotOutOfRange { slot: usize, table_size: usize },
}

/// Uniform-grid spatial hash table holding particle ids for one step.
#[derive(Debug, Clone)]
pub struct SpatialHashTable {
    config: HashConfig,
    phase: TablePhase,
    /// Insertion log for the current step: (slot, id).
    pending: Vec<(u32, ParticleId)>,
    /// Per-slot counts while building; scatter cursors while sealing.
    counts: Vec<u32>,
    /// `table_size + 1` offsets; bucket `s` is `entries[offsets[s]..offsets[s + 1]]`.
    offsets: Vec<u32>,
    entries: Vec<ParticleId>,
}

impl SpatialHashTable {
    pub fn new(config: HashConfig) -> Self {
        let table_size = config.table_size();
        Self {
            config,
            phase: TablePhase::Empty,
            pending: Vec::new(),
            counts: vec![0; table_size],
            offsets: vec![0; table_size + 1],
            entries: Vec::new(),
        }
    }

    /// Create a table with room for `particles` insertions per step.
    pub fn with_capacity(config: HashConfig, particles: usize) -> Self {
        let mut table = Self::new(config);
        table.pending.reserve(particles);
        table.entries.reserve(particles);
        table
    }

    #[inline]
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    /// Number of particles inserted this step.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discard all bucket contents and return to [`TablePhase::Empty`].
    pub fn clear(&mut self) {
        self.pending.clear();
        self.entries.clear();
        self.counts.fill(0);
        self.offsets.fill(0);
        self.phase = TablePhase::Empty;
    }

    /// Record `id` in the bucket of the cell containing `position`.
    ///
    /// Starts the build phase if the table is empty.
    pub fn insert(&mut self, id: ParticleId, position: Vec3) -> Result<(), TableError> {
        if self.phase == TablePhase::Queryable {
            return Err(TableError::NotBuilding);
        }
        if self.pending.len() >= u32::MAX as usize {
            return Err(TableError::TooManyParticles {
                count: self.pending.len() + 1,
            });
        }
        let slot = self.config.slot_of(position);
        self.pending.push((slot as u32, id));
        self.counts[slot] += 1;
        self.phase = TablePhase::Building;
        metrics::record_inserts(1);
        Ok(())
    }

    /// End the build phase and lay the buckets out for querying.
    ///
    /// Sealing an already sealed table is a no-op.
    pub fn seal(&mut self) {
        if self.phase == TablePhase::Queryable {
            return;
        }

        let mut running = 0u32;
        let mut non_empty = 0usize;
        let mut max_bucket = 0u32;
        for (slot, count) in self.counts.iter_mut().enumerate() {
            self.offsets[slot] = running;
            if *count > 0 {
                non_empty += 1;
                max_bucket = max_bucket.max(*count);
            }
            running += *count;
            // reuse the count as this bucket's write cursor
            *count = self.offsets[slot];
        }
        let table_size = self.counts.len();
        self.offsets[table_size] = running;

        self.entries.clear();
        self.entries.resize(self.pending.len(), ParticleId::default());
        for &(slot, id) in &self.pending {
            let cursor = &mut self.counts[slot as usize];
            self.entries[*cursor as usize] = id;
            *cursor += 1;
        }

        self.phase = TablePhase::Queryable;
        metrics::record_seal();

        let particles = self.pending.len();
        tracing::debug!(
            particles,
            non_empty,
            max_bucket,
            table_size,
            "spatial hash sealed"
        );
        if non_empty > 0 {
            let mean_load = particles as f32 / non_empty as f32;
            if mean_load > CROWDED_MEAN_LOAD {
                tracing::warn!(
                    particles,
                    table_size,
                    mean_load,
                    "spatial hash buckets are overcrowded; consider a larger table or smaller cells"
                );
            }
        }
    }

    /// Clear, insert every `(id, position)` pair, and seal.
    pub fn build<I>(&mut self, particles: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (ParticleId, Vec3)>,
    {
        self.clear();
        for (id, position) in particles {
            self.insert(id, position)?;
        }
        self.seal();
        Ok(())
    }

    /// Clear and rebuild from a position slice, using each index as the id.
    ///
    /// Slots are computed in parallel; the scatter into buckets runs on the
    /// calling thread, so no bucket is ever appended to concurrently.
    pub fn build_parallel(&mut self, positions: &[Vec3]) -> Result<(), TableError> {
        if positions.len() > u32::MAX as usize {
            return Err(TableError::TooManyParticles {
                count: positions.len(),
            });
        }
        self.clear();

        let config = self.config;
        positions
            .par_iter()
            .enumerate()
            .map(|(i, &position)| (config.slot_of(position) as u32, ParticleId(i as u32)))
            .collect_into_vec(&mut self.pending);

        for &(slot, _) in &self.pending {
            self.counts[slot as usize] += 1;
        }
        metrics::record_inserts(self.pending.len());

        self.phase = TablePhase::Building;
        self.seal();
        Ok(())
    }

    /// Particle ids stored in `slot`.
    pub fn query_slot(&self, slot: usize) -> Result<&[ParticleId], TableError> {
        self.ensure_queryable()?;
        let table_size = self.counts.len();
        if slot >= table_size {
            return Err(TableError::SlotOutOfRange { slot, table_size });
        }
        Ok(self.bucket(slot))
    }

    /// Bucket of `cell`. May include particles of other cells sharing its slot.
    pub fn query_cell(&self, cell: Cell) -> Result<&[ParticleId], TableError> {
        self.ensure_queryable()?;
        Ok(self.bucket(self.config.slot_of_cell(cell)))
    }

    /// Candidate ids from the 27 cells around `position`.
    ///
    /// The result is a superset of the particles within one cell size of
    /// `position`; callers must distance-filter. Each bucket is visited once
    /// even when several of the 27 cells share a slot.
    pub fn query_neighborhood(&self, position: Vec3) -> Result<Vec<ParticleId>, TableError> {
        let mut out = Vec::new();
        self.query_neighborhood_into(position, &mut out)?;
        Ok(out)
    }

    /// Like [`query_neighborhood`](Self::query_neighborhood), appending into a
    /// reusable buffer (cleared first).
    pub fn query_neighborhood_into(
        &self,
        position: Vec3,
        out: &mut Vec<ParticleId>,
    ) -> Result<(), TableError> {
        out.clear();
        self.for_each_candidate(position, |id| out.push(id))
    }

    /// Calls `visit` for each candidate id around `position`.
    pub fn for_each_candidate<F>(&self, position: Vec3, mut visit: F) -> Result<(), TableError>
    where
        F: FnMut(ParticleId),
    {
        self.ensure_queryable()?;
        let slots = self.neighborhood_slots(self.config.cell_of(position));

        let mut found = 0;
        let mut prev = None;
        for slot in slots {
            if prev == Some(slot) {
                continue;
            }
            prev = Some(slot);
            let bucket = self.bucket(slot);
            found += bucket.len();
            bucket.iter().copied().for_each(&mut visit);
        }
        metrics::record_neighborhood_query(found);
        Ok(())
    }

    /// Non-empty buckets in slot order.
    pub fn buckets(&self) -> Result<impl Iterator<Item = (usize, &[ParticleId])> + '_, TableError> {
        self.ensure_queryable()?;
        Ok((0..self.counts.len())
            .map(move |slot| (slot, self.bucket(slot)))
            .filter(|(_, bucket)| !bucket.is_empty()))
    }

    /// Size of every bucket, indexed by slot.
    pub fn bucket_sizes(&self) -> Result<impl Iterator<Item = usize> + '_, TableError> {
        self.ensure_queryable()?;
        Ok(self
            .offsets
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as usize))
    }

    /// Slots of the 27-cell block around `center`, sorted so repeats are adjacent.
    fn neighborhood_slots(&self, center: Cell) -> [usize; 27] {
        let mut slots = center
            .neighborhood()
            .map(|cell| self.config.slot_of_cell(cell));
        slots.sort_unstable();
        slots
    }

    #[inline]
    fn bucket(&self, slot: usize) -> &[ParticleId] {
        let start = self.offsets[slot] as usize;
        let end = self.offsets[slot + 1] as usize;
        &self.entries[start..end]
    }

    #[inline]
    fn ensure_queryable(&self) -> Result<(), TableError> {
        match self.phase {
            TablePhase::Queryable => Ok(()),
            phase => Err(TableError::NotQueryable { phase }),
        }
    }
}
