//! # OctoSpace Core
//!
//! Deterministic simulation core for OctoSpace, a two-player space strategy
//! game played on a 100x100 tile board under fog of war.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond config, snapshot and replay files
//! - Randomness only in seeded map generation
//! - Integer rules; the firing cone uses fixed-point math
//!
//! This separation enables:
//! - Headless training and tournament runs
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`tile`] - Packed tile byte codec
//! - [`map_generation`] - Seeded board generation
//! - [`systems`] - Per-tick stages
//! - [`simulation`] - Core simulation loop
//! - [`game_match`] - Rounds, rewards and the agent seam
//! - [`observation`] - Fog-filtered player views
//! - [`replay`] - Recording and verifying rounds
//! - [`math`] - Grid and fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod board;
pub mod combat;
pub mod config;
pub mod effects;
pub mod error;
pub mod game_match;
pub mod map_generation;
pub mod math;
pub mod observation;
pub mod planets;
pub mod player;
pub mod replay;
pub mod schemes;
pub mod ships;
pub mod simulation;
pub mod systems;
pub mod tile;
pub mod visibility;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{Actions, PlayerAction, ShipAction, ShipActionKind};
    pub use crate::board::Board;
    pub use crate::config::{GameRules, MatchConfig, BOARD_SIZE};
    pub use crate::effects::{Effect, EffectKind, EffectsLedger};
    pub use crate::error::{GameError, Result, TileError};
    pub use crate::game_match::{Agent, Match, MatchInfo, RenderView, Reward, StepOutcome};
    pub use crate::map_generation::{generate_map, GeneratedMap, MapConfig};
    pub use crate::math::{Direction, Fixed, GridPos};
    pub use crate::observation::{Observation, Observations, ShipView};
    pub use crate::planets::Planet;
    pub use crate::player::{PlayerId, PlayerState};
    pub use crate::replay::{Replay, ReplayPlayer};
    pub use crate::ships::{Ship, ShipId};
    pub use crate::simulation::{Simulation, TickEvents};
    pub use crate::systems::Victory;
    pub use crate::tile::{ResourceKind, Tile};
}
