//! Mapping continuous positions onto the integer cell grid.

use glam::{IVec3, Vec3};

/// Offsets of the 3x3x3 block around a cell, the cell itself included.
pub const NEIGHBOR_OFFSETS: [IVec3; 27] = {
    let mut offsets = [IVec3::ZERO; 27];
    let mut i = 0;
    while i < 27 {
        offsets[i] = IVec3::new(
            (i % 3) as i32 - 1,
            ((i / 3) % 3) as i32 - 1,
            (i / 9) as i32 - 1,
        );
        i += 1;
    }
    offsets
};

/// Integer coordinate of one cubic grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell shifted by the given number of cells along each axis.
    #[inline]
    pub fn offset(self, delta: IVec3) -> Self {
        Self::new(
            self.x.wrapping_add(delta.x),
            self.y.wrapping_add(delta.y),
            self.z.wrapping_add(delta.z),
        )
    }

    /// The 27 cells of the 3x3x3 block centered on this one (self included).
    pub fn neighborhood(self) -> [Cell; 27] {
        NEIGHBOR_OFFSETS.map(|delta| self.offset(delta))
    }
}

impl From<IVec3> for Cell {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Cell> for IVec3 {
    fn from(c: Cell) -> Self {
        IVec3::new(c.x, c.y, c.z)
    }
}

/// Returns the cell containing `position` for a grid of edge `cell_size`.
///
/// Each axis is floored (rounded toward negative infinity), so cells stay
/// contiguous across the origin: `-0.5` lands in cell `-1`, not `0`.
/// Coordinates beyond the `i32` range saturate.
///
/// # Panics
///
/// Panics if `cell_size` is not a positive finite number.
#[inline]
pub fn cell_of(position: Vec3, cell_size: f32) -> Cell {
    assert!(
        cell_size.is_finite() && cell_size > 0.0,
        "cell size must be positive and finite, got {cell_size}"
    );
    Cell::from((position / cell_size).floor().as_ivec3())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fraction_floors_down() {
        assert_eq!(cell_of(Vec3::new(-0.5, 0.0, 0.0), 1.0), Cell::new(-1, 0, 0));
    }

    #[test]
    fn no_doubled_cell_at_origin() {
        let s = 1.0;
        assert_eq!(cell_of(Vec3::splat(-0.999), s), Cell::new(-1, -1, -1));
        assert_eq!(cell_of(Vec3::splat(0.0), s), Cell::new(0, 0, 0));
        assert_eq!(cell_of(Vec3::splat(0.999), s), Cell::new(0, 0, 0));
        assert_eq!(cell_of(Vec3::splat(-1.0), s), Cell::new(-1, -1, -1));
        assert_eq!(cell_of(Vec3::splat(-1.001), s), Cell::new(-2, -2, -2));
    }

    #[test]
    fn cell_size_two_example() {
        assert_eq!(cell_of(Vec3::new(3.0, 1.0, -1.5), 2.0), Cell::new(1, 0, -1));
    }

    #[test]
    fn cells_are_monotonic_along_an_axis() {
        let mut prev = cell_of(Vec3::new(-400.0 * 0.0137, 0.0, 0.0), 0.25).x;
        for i in -400..400 {
            let x = i as f32 * 0.0137;
            let cell = cell_of(Vec3::new(x, 0.0, 0.0), 0.25);
            // steps are smaller than a cell, so cells never skip
            assert!(cell.x == prev || cell.x == prev + 1, "x={x} cell={cell:?}");
            prev = cell.x;
        }
    }

    #[test]
    fn neighborhood_is_the_full_block() {
        let center = Cell::new(5, -3, 0);
        let cells = center.neighborhood();
        assert!(cells.contains(&center));
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    assert!(cells.contains(&Cell::new(5 + dx, -3 + dy, dz)));
                }
            }
        }
        let mut sorted = cells.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 27);
    }

    #[test]
    #[should_panic(expected = "cell size must be positive")]
    fn zero_cell_size_panics() {
        cell_of(Vec3::ONE, 0.0);
    }

    #[test]
    #[should_panic(expected = "cell size must be positive")]
    fn negative_cell_size_panics() {
        cell_of(Vec3::ONE, -1.0);
    }
}
