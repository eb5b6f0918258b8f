//! Board geometry constants and tunable rule sets.
//!
//! Geometry (board side, home planet placement, stencils) is fixed and
//! bit-exact across builds. Gameplay numbers live in [`GameRules`], whose
//! defaults are the canonical values; alternative rule sets can be loaded
//! from RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::map_generation::MapConfig;
use crate::math::GridPos;

/// Side of the square board in cells.
pub const BOARD_SIZE: i32 = 100;

/// Side of a planet stencil.
pub const PLANETS_DIAMETER: i32 = 9;

/// Distance from the board corner to a home planet stencil.
pub const PLANETS_OFFSET: i32 = 5;

/// Home planet centre coordinate of player 1 (both axes).
pub const PLAYER_1_LOCATION: i32 = PLANETS_OFFSET + PLANETS_DIAMETER / 2;

/// Home planet centre coordinate of player 2 (both axes).
pub const PLAYER_2_LOCATION: i32 = BOARD_SIZE - (PLANETS_OFFSET + PLANETS_DIAMETER / 2 + 1);

/// Home planet centre of player 1; new ships spawn here.
pub const PLAYER_1_ORIGIN: GridPos = GridPos::new(PLAYER_1_LOCATION, PLAYER_1_LOCATION);

/// Home planet centre of player 2; new ships spawn here.
pub const PLAYER_2_ORIGIN: GridPos = GridPos::new(PLAYER_2_LOCATION, PLAYER_2_LOCATION);

/// Ship vision radius (11x11 stencil).
pub const VISION_RANGE: i32 = 5;

/// Planet vision radius (19x19 stencil).
pub const PLANET_VISION_RANGE: i32 = 9;

/// Number of resource types.
pub const RESOURCE_KINDS: usize = 4;

/// Gameplay constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Cap for every resource counter.
    pub max_resources: i32,
    /// Owned resource fields per unit of income per tick.
    pub resource_production_divisor: i32,
    /// Maximum live ships per player.
    pub max_ships: usize,
    /// Cells per move without modifiers.
    pub base_ship_speed: i32,
    /// Ionized field speed multiplier (result truncated).
    pub ionized_field_speed_factor: i32,
    /// Resources debited per constructed ship.
    pub ship_cost: [i32; RESOURCE_KINDS],
    /// Hit points of a fresh ship.
    pub ship_max_hp: i32,
    /// Damage per successful shot.
    pub ship_damage: i32,
    /// Hit points restored per tick on own territory.
    pub ship_healing_speed: i32,
    /// Length of the firing reference vector.
    pub max_ship_fire_range: i32,
    /// Landing radius around a planet centre.
    pub ship_occupation_range: i32,
    /// Ticks between shots.
    pub firing_cooldown: i32,
    /// Ticks a ship is stuck after hitting an asteroid.
    pub move_cooldown: i32,
    /// Damage taken when ending a move on an asteroid.
    pub asteroid_damage: i32,
    /// Occupation progress per landed ship per tick.
    pub occupation_speed: i32,
    /// Resources each player starts with.
    pub starting_resources: [i32; RESOURCE_KINDS],
    /// Turn at which a round ends in a draw.
    pub max_steps: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_resources: 1000,
            resource_production_divisor: 4,
            max_ships: 1000,
            base_ship_speed: 1,
            ionized_field_speed_factor: 3,
            ship_cost: [100; RESOURCE_KINDS],
            ship_max_hp: 100,
            ship_damage: 30,
            ship_healing_speed: 2,
            max_ship_fire_range: 8,
            ship_occupation_range: 2,
            firing_cooldown: 10,
            move_cooldown: 3,
            asteroid_damage: 3,
            occupation_speed: 2,
            starting_resources: [100; RESOURCE_KINDS],
            max_steps: 1000,
        }
    }
}

/// Everything needed to set up a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Gameplay constants.
    pub rules: GameRules,
    /// Map generation parameters.
    pub map: MapConfig,
}

impl MatchConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Ok(ron::from_str(ron)?)
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Set the map seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.map.seed = seed;
        self
    }

    /// Set the step limit.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.rules.max_steps = max_steps;
        self
    }
}
