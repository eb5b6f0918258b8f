//! Per-player fog of war.
//!
//! A [`VisibilityMask`] only ever grows within a round: cells are revealed by
//! stamping a [`VisionKernel`] around ships and captured planets and are never
//! hidden again.

use serde::{Deserialize, Serialize};

use crate::math::GridPos;
use crate::schemes::VisionKernel;

/// Boolean board-sized mask of revealed cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityMask {
    size: i32,
    cells: Vec<bool>,
}

impl VisibilityMask {
    /// Fully hidden mask.
    #[must_use]
    pub fn new(size: i32) -> Self {
        Self {
            size,
            cells: vec![false; (size.max(0) * size.max(0)) as usize],
        }
    }

    /// Side of the board this mask covers.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Whether `pos` has been revealed. Out-of-board positions are hidden.
    #[must_use]
    pub fn is_visible(&self, pos: GridPos) -> bool {
        pos.in_bounds(self.size) && self.cells[self.index(pos)]
    }

    /// Reveal a single cell. Out-of-board positions are ignored.
    pub fn reveal(&mut self, pos: GridPos) {
        if pos.in_bounds(self.size) {
            let index = self.index(pos);
            self.cells[index] = true;
        }
    }

    /// OR `kernel` centred on `center` into the mask, clipped at the edges.
    pub fn reveal_around(&mut self, center: GridPos, kernel: &VisionKernel) {
        for (dx, dy) in kernel.offsets() {
            self.reveal(center.offset(dx, dy));
        }
    }

    /// Number of revealed cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&seen| seen).count()
    }

    /// Whether every cell revealed in `self` is also revealed in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.size == other.size && self.cells.iter().zip(&other.cells).all(|(&a, &b)| !a || b)
    }

    fn index(&self, pos: GridPos) -> usize {
        (pos.y * self.size + pos.x) as usize
    }
}
