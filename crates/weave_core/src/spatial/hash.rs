//! Cell and particle hashing into a fixed-size slot table.

use super::cell::{cell_of, Cell};
use glam::Vec3;

/// Per-axis multipliers. Large, odd and pairwise distinct, so that cells
/// one step apart along any axis land far apart in the table.
pub const HASH_PRIME_X: u32 = 73_856_093;
pub const HASH_PRIME_Y: u32 = 19_349_663;
pub const HASH_PRIME_Z: u32 = 83_492_791;

/// Mixes a cell into an unreduced 32-bit hash.
///
/// Components are reinterpreted as `u32` before mixing, so negative cells
/// never produce a negative value.
#[inline]
pub fn mix_cell(cell: Cell) -> u32 {
    (cell.x as u32).wrapping_mul(HASH_PRIME_X)
        ^ (cell.y as u32).wrapping_mul(HASH_PRIME_Y)
        ^ (cell.z as u32).wrapping_mul(HASH_PRIME_Z)
}

/// Hashes `cell` into a slot index in `[0, table_size)`.
///
/// Distinct cells may share a slot; callers filter candidates by distance.
///
/// # Panics
///
/// Panics if `table_size` is zero.
#[inline]
pub fn hash_cell(cell: Cell, table_size: usize) -> usize {
    assert!(table_size > 0, "table size must be non-zero");
    mix_cell(cell) as usize % table_size
}

/// Hashes a particle position straight to its slot index.
///
/// Equivalent to `hash_cell(cell_of(position, cell_size), table_size)`.
///
/// # Panics
///
/// Panics if `table_size` is zero or `cell_size` is not positive and finite.
#[inline]
pub fn hash_particle(position: Vec3, table_size: usize, cell_size: f32) -> usize {
    hash_cell(cell_of(position, cell_size), table_size)
}
