//! Player identity and per-player state.

use serde::{Deserialize, Serialize};

use crate::config::{GameRules, RESOURCE_KINDS};
use crate::ships::ShipStore;
use crate::visibility::VisibilityMask;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    /// First mover; owns the top-left home planet.
    One,
    /// Second mover; owns the bottom-right home planet.
    Two,
}

impl PlayerId {
    /// Both players in processing order.
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Index into per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// This player's ownership bit within the two owner bits of a tile.
    #[must_use]
    pub const fn owner_bit(self) -> u8 {
        match self {
            PlayerId::One => 0b01,
            PlayerId::Two => 0b10,
        }
    }

    /// Occupation progress value meaning "held by this player".
    #[must_use]
    pub const fn held_progress(self) -> i32 {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 100,
        }
    }

    /// Sign of `ongoing_occupation` that favours this player.
    #[must_use]
    pub const fn occupation_sign(self) -> i32 {
        match self {
            PlayerId::One => -1,
            PlayerId::Two => 1,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::One => write!(f, "player 1"),
            PlayerId::Two => write!(f, "player 2"),
        }
    }
}

/// Everything one side owns during a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Resource stock per kind, in `[0, max_resources]`.
    pub resources: [i32; RESOURCE_KINDS],
    /// Resource fields under planets this player holds, per kind.
    pub occupied_resource_fields: [i32; RESOURCE_KINDS],
    /// Cells this player has ever seen this round.
    pub visibility: VisibilityMask,
    /// Live ships.
    pub ships: ShipStore,
}

impl PlayerState {
    /// Fresh state with starting resources and no ships.
    #[must_use]
    pub fn new(rules: &GameRules, board_size: i32) -> Self {
        Self {
            resources: rules.starting_resources,
            occupied_resource_fields: [0; RESOURCE_KINDS],
            visibility: VisibilityMask::new(board_size),
            ships: ShipStore::new(),
        }
    }

    /// Whether every resource covers the matching cost.
    #[must_use]
    pub fn can_afford(&self, cost: &[i32; RESOURCE_KINDS]) -> bool {
        self.resources.iter().zip(cost).all(|(have, need)| have >= need)
    }

    /// Debit `cost`. Callers check [`can_afford`](Self::can_afford) first.
    pub fn pay(&mut self, cost: &[i32; RESOURCE_KINDS]) {
        for (have, need) in self.resources.iter_mut().zip(cost) {
            *have -= need;
        }
    }
}
