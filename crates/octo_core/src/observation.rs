//! Fog-filtered views of the simulation for agents.
//!
//! An agent only sees what its visibility mask has revealed:
//!
//! - **Board:** cells outside the mask read as [`UNKNOWN_TILE`]
//! - **Enemy ships:** listed only while standing on a revealed cell
//! - **Planets:** listed only when their centre is revealed
//!
//! Own ships and resources are always fully visible. Observations serialize
//! with serde, so external agents can receive them as JSON.

use serde::{Deserialize, Serialize};

use crate::config::RESOURCE_KINDS;
use crate::error::{GameError, Result};
use crate::math::GridPos;
use crate::player::PlayerId;
use crate::ships::{Ship, ShipId};
use crate::simulation::Simulation;
use crate::tile::Tile;
use crate::visibility::VisibilityMask;

/// Board value of a cell the player has never seen.
pub const UNKNOWN_TILE: i16 = -1;

/// What an observer knows about a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipView {
    /// Ship id within its owner's fleet.
    pub id: ShipId,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Hit points.
    pub hp: i32,
    /// Ticks until the ship may fire.
    pub firing_cooldown: i32,
    /// Ticks until the ship may move.
    pub move_cooldown: i32,
}

impl ShipView {
    /// Position as a grid cell.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

impl From<&Ship> for ShipView {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id,
            x: ship.position.x,
            y: ship.position.y,
            hp: ship.hp,
            firing_cooldown: ship.firing_cooldown,
            move_cooldown: ship.move_cooldown,
        }
    }
}

/// What an observer knows about a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanetView {
    /// Centre column.
    pub x: i32,
    /// Centre row.
    pub y: i32,
    /// Occupation progress (`-1` unclaimed, `0` player 1, `100` player 2).
    pub occupation_progress: i32,
}

/// One player's view of the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Whose view this is.
    pub player: PlayerId,
    /// Turn the observation was taken on.
    pub turn: u32,
    /// Side of the board.
    pub board_size: i32,
    /// Row-major tile bytes, [`UNKNOWN_TILE`] where hidden.
    pub map: Vec<i16>,
    /// Own ships in id order.
    pub allied_ships: Vec<ShipView>,
    /// Visible enemy ships in id order.
    pub enemy_ships: Vec<ShipView>,
    /// Planets whose centre is visible, homes first.
    pub planets_occupation: Vec<PlanetView>,
    /// Own resource stock.
    pub resources: [i32; RESOURCE_KINDS],
}

impl Observation {
    /// Build the view of `player`.
    #[must_use]
    pub fn observe(sim: &Simulation, player: PlayerId) -> Self {
        let own = sim.player(player);
        let mask = &own.visibility;
        let board = sim.board();

        let map = board
            .cells()
            .map(|(pos, tile)| {
                if mask.is_visible(pos) {
                    i16::from(tile.encode())
                } else {
                    UNKNOWN_TILE
                }
            })
            .collect();

        let enemy_ships = sim
            .player(player.opponent())
            .ships
            .iter()
            .filter(|ship| mask.is_visible(ship.position))
            .map(ShipView::from)
            .collect();

        let planets_occupation = sim
            .planets()
            .iter()
            .filter(|planet| mask.is_visible(planet.center))
            .map(|planet| PlanetView {
                x: planet.center.x,
                y: planet.center.y,
                occupation_progress: planet.occupation_progress,
            })
            .collect();

        Self {
            player,
            turn: sim.turn(),
            board_size: board.size(),
            map,
            allied_ships: own.ships.iter().map(ShipView::from).collect(),
            enemy_ships,
            planets_occupation,
            resources: own.resources,
        }
    }

    /// Raw board value at `pos`; `None` off the board.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<i16> {
        pos.in_bounds(self.board_size)
            .then(|| self.map[(pos.y * self.board_size + pos.x) as usize])
    }

    /// Decoded tile at `pos`; `None` when hidden or off the board.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Option<Tile> {
        let value = self.cell(pos)?;
        let byte = u8::try_from(value).ok()?;
        Tile::decode(byte).ok()
    }

    /// Whether `pos` is revealed.
    #[must_use]
    pub fn is_visible(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(|value| value != UNKNOWN_TILE)
    }

    /// Rebuild the revealed-cell mask from the board.
    #[must_use]
    pub fn visibility(&self) -> VisibilityMask {
        let mut mask = VisibilityMask::new(self.board_size);
        for (i, &value) in self.map.iter().enumerate() {
            if value != UNKNOWN_TILE {
                let i = i as i32;
                mask.reveal(GridPos::new(i % self.board_size, i / self.board_size));
            }
        }
        mask
    }

    /// Own ship by id.
    #[must_use]
    pub fn allied_ship(&self, id: ShipId) -> Option<&ShipView> {
        self.allied_ships.iter().find(|ship| ship.id == id)
    }

    /// JSON form for out-of-process agents.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| GameError::Serialization(format!("Failed to encode observation: {e}")))
    }

    /// Parse an observation produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid observation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GameError::Serialization(format!("Failed to decode observation: {e}")))
    }
}

/// Both players' views after a reset or step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observations {
    /// View of player 1.
    pub player_1: Observation,
    /// View of player 2.
    pub player_2: Observation,
}

impl Observations {
    /// Observe both players.
    #[must_use]
    pub fn observe(sim: &Simulation) -> Self {
        Self {
            player_1: Observation::observe(sim, PlayerId::One),
            player_2: Observation::observe(sim, PlayerId::Two),
        }
    }

    /// View of `player`.
    #[must_use]
    pub const fn get(&self, player: PlayerId) -> &Observation {
        match player {
            PlayerId::One => &self.player_1,
            PlayerId::Two => &self.player_2,
        }
    }
}
