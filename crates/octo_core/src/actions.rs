//! Player commands for one tick.
//!
//! External agents send ship actions as integer tuples
//! `(ship_id, kind, direction[, speed])` with kind `0` = move and `1` = fire.
//! [`ShipAction::from_wire`] turns them into typed actions; tuples that do not
//! parse are dropped rather than rejected.

use serde::{Deserialize, Serialize};

use crate::math::Direction;
use crate::player::PlayerId;
use crate::ships::ShipId;

/// Wire value of a move action.
pub const MOVE_KIND: i64 = 0;

/// Wire value of a fire action.
pub const FIRE_KIND: i64 = 1;

/// What a ship should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipActionKind {
    /// Move up to `speed` cells.
    Move {
        /// Heading.
        direction: Direction,
        /// Requested cells; clipped to what the ship can do.
        speed: i32,
    },
    /// Fire along `direction`.
    Fire {
        /// Heading.
        direction: Direction,
    },
}

/// One command for one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipAction {
    /// Target ship in the acting player's fleet.
    pub ship_id: ShipId,
    /// The command.
    pub kind: ShipActionKind,
}

impl ShipAction {
    /// Move command.
    #[must_use]
    pub const fn move_ship(ship_id: ShipId, direction: Direction, speed: i32) -> Self {
        Self {
            ship_id,
            kind: ShipActionKind::Move { direction, speed },
        }
    }

    /// Fire command.
    #[must_use]
    pub const fn fire(ship_id: ShipId, direction: Direction) -> Self {
        Self {
            ship_id,
            kind: ShipActionKind::Fire { direction },
        }
    }

    /// Parse a wire tuple.
    ///
    /// Returns `None` for a negative id, an unknown kind or direction, or a
    /// move without a speed. Extra trailing values are ignored.
    #[must_use]
    pub fn from_wire(values: &[i64]) -> Option<Self> {
        let (&raw_id, rest) = values.split_first()?;
        let ship_id = ShipId(u32::try_from(raw_id).ok()?);
        let (&kind, rest) = rest.split_first()?;
        let (&raw_direction, rest) = rest.split_first()?;
        let direction = Direction::from_index(raw_direction)?;

        match kind {
            MOVE_KIND => {
                let &speed = rest.first()?;
                let speed = speed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                Some(Self::move_ship(ship_id, direction, speed))
            }
            FIRE_KIND => Some(Self::fire(ship_id, direction)),
            _ => None,
        }
    }

    /// Wire tuple for this action.
    #[must_use]
    pub fn to_wire(&self) -> Vec<i64> {
        let id = i64::from(self.ship_id.0);
        match self.kind {
            ShipActionKind::Move { direction, speed } => {
                vec![id, MOVE_KIND, i64::from(direction.index()), i64::from(speed)]
            }
            ShipActionKind::Fire { direction } => {
                vec![id, FIRE_KIND, i64::from(direction.index())]
            }
        }
    }
}

/// Everything one player asks for in a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Ship commands, processed in order.
    pub ships_actions: Vec<ShipAction>,
    /// Ships to build at the home planet.
    pub construction: u32,
}

impl PlayerAction {
    /// Do nothing.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Build from wire tuples, dropping any that fail to parse.
    #[must_use]
    pub fn from_wire<T: AsRef<[i64]>>(ships_actions: &[T], construction: i64) -> Self {
        Self {
            ships_actions: ships_actions
                .iter()
                .filter_map(|values| ShipAction::from_wire(values.as_ref()))
                .collect(),
            construction: u32::try_from(construction).unwrap_or(0),
        }
    }
}

/// Both players' commands for a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actions {
    /// Commands of player 1.
    pub player_1: PlayerAction,
    /// Commands of player 2.
    pub player_2: PlayerAction,
}

impl Actions {
    /// Pair two players' commands.
    #[must_use]
    pub const fn new(player_1: PlayerAction, player_2: PlayerAction) -> Self {
        Self { player_1, player_2 }
    }

    /// Commands of `player`.
    #[must_use]
    pub const fn get(&self, player: PlayerId) -> &PlayerAction {
        match player {
            PlayerId::One => &self.player_1,
            PlayerId::Two => &self.player_2,
        }
    }
}
