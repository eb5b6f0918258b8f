//! Fixed stencils: planet layouts, asteroid shapes and vision kernels.
//!
//! Stencils are indexed `[row][column]`. Every value here is part of the
//! reproducible board layout and must not change between builds.

use crate::config::{PLANETS_DIAMETER, PLANET_VISION_RANGE, VISION_RANGE};
use crate::tile::{ResourceKind, Tile};

/// Side of a planet stencil as an index.
pub const PLANET_SIDE: usize = PLANETS_DIAMETER as usize;

/// A 9x9 planet layout.
pub type PlanetStencil = [[Tile; PLANET_SIDE]; PLANET_SIDE];

const O: Tile = Tile::SPACE;
const L: Tile = Tile::LAND;
const R: Tile = Tile::ROUGH_LAND;

/// Land/rough-land outline shared by every planet. Resource slots are plain land.
pub const EMPTY_PLANET: PlanetStencil = [
    [O, O, O, R, L, R, O, O, O],
    [O, R, L, L, L, L, L, R, O],
    [O, L, L, L, L, L, L, L, O],
    [R, L, L, L, L, L, L, L, R],
    [L, L, L, L, L, L, L, L, L],
    [R, L, L, L, L, L, L, L, R],
    [O, L, L, L, L, L, L, L, O],
    [O, R, L, L, L, L, L, R, O],
    [O, O, O, R, L, R, O, O, O],
];

/// Resource field slots `(row, column)`, in assignment order.
///
/// Four groups of four: north, west, east, south.
pub const RESOURCE_FIELD_SLOTS: [(usize, usize); 16] = [
    (1, 4),
    (2, 3),
    (2, 4),
    (2, 5),
    (3, 2),
    (4, 1),
    (4, 2),
    (5, 2),
    (3, 6),
    (4, 7),
    (4, 6),
    (5, 6),
    (6, 3),
    (6, 4),
    (6, 5),
    (7, 4),
];

/// Number of resource field slots on a planet.
pub const RESOURCE_FIELDS_PER_PLANET: usize = RESOURCE_FIELD_SLOTS.len();

/// Empty planet with the slots filled by `counts[k]` fields of kind `k`, in slot order.
///
/// `counts` must sum to [`RESOURCE_FIELDS_PER_PLANET`]; surplus slots stay plain land.
#[must_use]
pub fn planet_with_fields(counts: [usize; 4]) -> PlanetStencil {
    let mut stencil = EMPTY_PLANET;
    let kinds = ResourceKind::ALL
        .iter()
        .zip(counts)
        .flat_map(|(&kind, count)| std::iter::repeat(kind).take(count));
    for (&(row, col), kind) in RESOURCE_FIELD_SLOTS.iter().zip(kinds) {
        stencil[row][col] = Tile::resource_field(kind);
    }
    stencil
}

/// Home planet: four fields of each kind, one kind per slot group.
#[must_use]
pub fn starting_planet() -> PlanetStencil {
    planet_with_fields([4, 4, 4, 4])
}

/// An asteroid field shape. `#` marks an asteroid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsteroidShape {
    rows: &'static [&'static str],
}

impl AsteroidShape {
    /// Shape height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Shape width in cells.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32
    }

    /// Offsets `(dx, dy)` of asteroid cells from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.bytes()
                .enumerate()
                .filter(|&(_, c)| c == b'#')
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }

    /// Number of asteroid cells.
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells().count()
    }
}

/// Catalog of asteroid field shapes.
pub const ASTEROID_SHAPES: [AsteroidShape; 6] = [
    AsteroidShape { rows: &["##", "##"] },
    AsteroidShape {
        rows: &[".##.", "####", ".##."],
    },
    AsteroidShape {
        rows: &["###", "###", ".#."],
    },
    AsteroidShape {
        rows: &["#..", "##.", ".##"],
    },
    AsteroidShape {
        rows: &[".#.", "###", ".#."],
    },
    AsteroidShape {
        rows: &["##..", "####", "..##"],
    },
];

/// Largest area in [`ASTEROID_SHAPES`].
#[must_use]
pub fn max_asteroid_area() -> usize {
    ASTEROID_SHAPES.iter().map(AsteroidShape::area).max().unwrap_or(0)
}

/// A roughly circular vision stencil of side `2 * radius + 1`.
///
/// Stored as one inclusive column span per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionKernel {
    radius: i32,
    spans: &'static [(i32, i32)],
}

impl VisionKernel {
    /// Distance from the centre to the stencil edge.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// Side of the stencil.
    #[must_use]
    pub const fn side(&self) -> i32 {
        2 * self.radius + 1
    }

    /// Whether the offset `(dx, dy)` from the centre is visible.
    #[must_use]
    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        let row = dy + self.radius;
        let col = dx + self.radius;
        if row < 0 || row >= self.side() {
            return false;
        }
        let (first, last) = self.spans[row as usize];
        (first..=last).contains(&col)
    }

    /// Every visible offset `(dx, dy)`, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let radius = self.radius;
        self.spans.iter().enumerate().flat_map(move |(row, &(first, last))| {
            (first..=last).map(move |col| (col - radius, row as i32 - radius))
        })
    }
}

/// 11x11 kernel stamped around every ship.
pub const SHIP_VISION: VisionKernel = VisionKernel {
    radius: VISION_RANGE,
    spans: &[
        (4, 6),
        (3, 7),
        (2, 8),
        (1, 9),
        (0, 10),
        (0, 10),
        (0, 10),
        (1, 9),
        (2, 8),
        (3, 7),
        (4, 6),
    ],
};

/// 19x19 kernel stamped around home and captured planets.
pub const PLANET_VISION: VisionKernel = VisionKernel {
    radius: PLANET_VISION_RANGE,
    spans: &[
        (7, 11),
        (5, 13),
        (4, 14),
        (3, 15),
        (2, 16),
        (1, 17),
        (1, 17),
        (0, 18),
        (0, 18),
        (0, 18),
        (0, 18),
        (0, 18),
        (1, 17),
        (1, 17),
        (2, 16),
        (3, 15),
        (4, 14),
        (5, 13),
        (7, 11),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_plain_land() {
        for &(row, col) in &RESOURCE_FIELD_SLOTS {
            assert_eq!(EMPTY_PLANET[row][col], Tile::LAND, "slot ({row}, {col})");
        }
        assert_eq!(EMPTY_PLANET[4][4], Tile::LAND);
    }

    #[test]
    fn test_slots_are_distinct() {
        let mut slots = RESOURCE_FIELD_SLOTS.to_vec();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), RESOURCE_FIELDS_PER_PLANET);
    }

    #[test]
    fn test_starting_planet_groups() {
        let planet = starting_planet();
        for (i, &(row, col)) in RESOURCE_FIELD_SLOTS.iter().enumerate() {
            assert_eq!(planet[row][col].resource(), ResourceKind::from_index(i / 4));
        }
    }

    #[test]
    fn test_planet_with_fields_counts() {
        let planet = planet_with_fields([1, 2, 3, 10]);
        let mut counts = [0; 4];
        for row in &planet {
            for tile in row {
                if let Some(kind) = tile.resource() {
                    counts[kind.index()] += 1;
                }
            }
        }
        assert_eq!(counts, [1, 2, 3, 10]);
    }

    #[test]
    fn test_asteroid_catalog() {
        assert_eq!(max_asteroid_area(), 8);
        let square = ASTEROID_SHAPES[0];
        assert_eq!((square.width(), square.height()), (2, 2));
        assert_eq!(square.cells().collect::<Vec<_>>(), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_kernel_sizes() {
        assert_eq!(SHIP_VISION.side(), 11);
        assert_eq!(PLANET_VISION.side(), 19);
        assert_eq!(SHIP_VISION.offsets().count(), 3 + 5 + 7 + 9 + 11 * 3 + 9 + 7 + 5 + 3);
        assert!(SHIP_VISION.contains(0, 0));
        assert!(SHIP_VISION.contains(5, 0));
        assert!(!SHIP_VISION.contains(5, 5));
        assert!(!SHIP_VISION.contains(0, 6));
        assert!(PLANET_VISION.contains(0, -9));
        assert!(!PLANET_VISION.contains(3, -9));
    }

    #[test]
    fn test_kernels_are_symmetric() {
        for kernel in [SHIP_VISION, PLANET_VISION] {
            for (dx, dy) in kernel.offsets() {
                assert!(kernel.contains(-dx, dy));
                assert!(kernel.contains(dx, -dy));
                assert!(kernel.contains(dy, dx));
            }
        }
    }
}
