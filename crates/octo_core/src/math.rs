//! Grid geometry and fixed-point helpers.
//!
//! Board positions are integer cells. The only non-integer quantity in the
//! rules is the 15 degree firing cone, which is evaluated with fixed-point
//! arithmetic so results never depend on platform float behaviour.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for the few fractional rule quantities.
pub type Fixed = I32F32;

/// `cos^2(15 deg)`, i.e. `(2 + sqrt(3)) / 4`.
///
/// Stored as raw bits so the value is identical on every platform.
pub const COS_SQ_15_DEG: Fixed = Fixed::from_bits(4_007_259_041);

/// A cell on the board. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance (avoids sqrt for comparisons).
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Component-wise offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Clamp both coordinates into `[0, size - 1]`.
    #[must_use]
    pub fn clamped(self, size: i32) -> Self {
        Self {
            x: self.x.clamp(0, size - 1),
            y: self.y.clamp(0, size - 1),
        }
    }

    /// Check whether the position lies on a board of the given side.
    #[must_use]
    pub const fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }
}

/// Facing / movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// +x
    #[default]
    Right = 0,
    /// +y
    Down = 1,
    /// -x
    Left = 2,
    /// -y
    Up = 3,
}

impl Direction {
    /// All directions in wire order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Parse the wire value `0..=3`.
    #[must_use]
    pub const fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Direction::Right),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Up),
            _ => None,
        }
    }

    /// Wire value of this direction.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Unit vector `(dx, dy)`.
    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }
}

/// Check whether `offset` lies within 15 degrees of `reference`.
///
/// A zero offset counts as inside the cone. The comparison is
/// `dot > 0 && dot^2 >= cos^2(15) * |offset|^2 * |reference|^2`.
#[must_use]
pub fn within_firing_cone(offset: (i32, i32), reference: (i32, i32)) -> bool {
    if offset == (0, 0) {
        return true;
    }
    let dot = i64::from(offset.0) * i64::from(reference.0)
        + i64::from(offset.1) * i64::from(reference.1);
    if dot <= 0 {
        return false;
    }
    let offset_len_sq = i64::from(offset.0).pow(2) + i64::from(offset.1).pow(2);
    let reference_len_sq = i64::from(reference.0).pow(2) + i64::from(reference.1).pow(2);

    // Normalise by |reference|^2 first to keep the fixed-point values small.
    let lhs = Fixed::from_num(dot) / Fixed::from_num(reference_len_sq) * Fixed::from_num(dot);
    let rhs = COS_SQ_15_DEG * Fixed::from_num(offset_len_sq);
    lhs >= rhs
}
