//! Planets and their occupation state.

use serde::{Deserialize, Serialize};

use crate::math::GridPos;
use crate::player::PlayerId;

/// Occupation progress of a planet nobody has claimed.
pub const UNCLAIMED: i32 = -1;

/// Lower bound of contested progress (held by player 1).
pub const MIN_PROGRESS: i32 = 0;

/// Upper bound of contested progress (held by player 2).
pub const MAX_PROGRESS: i32 = 100;

/// A planet on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    /// Centre cell of the 9x9 footprint.
    pub center: GridPos,
    /// `-1` unclaimed, `0` player 1, `100` player 2, anything between is contested.
    pub occupation_progress: i32,
    /// Signed pressure on the progress; negative favours player 1.
    pub ongoing_occupation: i32,
}

impl Planet {
    /// Unclaimed planet at `center`.
    #[must_use]
    pub const fn unclaimed(center: GridPos) -> Self {
        Self {
            center,
            occupation_progress: UNCLAIMED,
            ongoing_occupation: 0,
        }
    }

    /// Planet already held by `owner`.
    #[must_use]
    pub const fn owned_by(center: GridPos, owner: PlayerId) -> Self {
        Self {
            center,
            occupation_progress: owner.held_progress(),
            ongoing_occupation: 0,
        }
    }

    /// Player whose progress value the planet currently sits at.
    #[must_use]
    pub const fn holder(&self) -> Option<PlayerId> {
        match self.occupation_progress {
            MIN_PROGRESS => Some(PlayerId::One),
            MAX_PROGRESS => Some(PlayerId::Two),
            _ => None,
        }
    }

    /// Whether nobody has touched this planet yet.
    #[must_use]
    pub const fn is_unclaimed(&self) -> bool {
        self.occupation_progress == UNCLAIMED
    }

    /// Whether a fight over the planet is running.
    #[must_use]
    pub const fn is_contested(&self) -> bool {
        self.ongoing_occupation != 0
            || (self.occupation_progress != UNCLAIMED && self.holder().is_none())
    }
}
