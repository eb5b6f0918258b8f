//! Core simulation loop.
//!
//! A [`Simulation`] owns one round: the board, the planets, both players'
//! fleets and economies, and the effects ledger. [`Simulation::tick`] runs
//! one turn through a fixed pipeline of stages.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - Integer rules; the firing cone uses fixed-point math
//! - No randomness after map generation
//! - Ships are always visited in ascending id order, player 1 first
//! - Same map and actions always produce the same state
//!
//! # Example
//!
//! ```
//! use octo_core::actions::Actions;
//! use octo_core::config::GameRules;
//! use octo_core::map_generation::{generate_map, MapConfig};
//! use octo_core::simulation::Simulation;
//!
//! let map = generate_map(&MapConfig::default().with_seed(7)).unwrap();
//! let mut sim = Simulation::new(GameRules::default(), &map);
//! assert_eq!(sim.turn(), 1);
//!
//! let events = sim.tick(&Actions::default());
//! assert_eq!(sim.turn(), 2);
//! assert!(!events.victory.any());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::actions::Actions;
use crate::board::Board;
use crate::combat::{firing_stage, Shot};
use crate::config::{GameRules, PLAYER_1_ORIGIN, PLAYER_2_ORIGIN};
use crate::effects::EffectsLedger;
use crate::error::{GameError, Result};
use crate::map_generation::GeneratedMap;
use crate::math::{Direction, GridPos};
use crate::planets::Planet;
use crate::player::{PlayerId, PlayerState};
use crate::schemes::PLANET_VISION;
use crate::ships::{Ship, ShipId};
use crate::systems::{
    construction_stage, cooldown_stage, death_stage, home_origin, land_interaction_stage,
    movement_stage, occupation_stage, ownership_stage, production_stage, victory_check,
    visibility_stage, Capture, Landing, Movement, Victory,
};

/// Where player 1's first ship starts: just right of the home planet.
pub const PLAYER_1_FIRST_SHIP: GridPos = PLAYER_1_ORIGIN.offset(7, 0);

/// Where player 2's first ship starts: just left of the home planet.
pub const PLAYER_2_FIRST_SHIP: GridPos = PLAYER_2_ORIGIN.offset(-8, 0);

/// Events generated during a simulation tick.
///
/// These are informational; the simulation state is already updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Fire actions that went off.
    pub shots: Vec<Shot>,
    /// Moves that were carried out.
    pub moves: Vec<Movement>,
    /// Ships built this tick.
    pub constructed: Vec<(PlayerId, ShipId)>,
    /// Planets that changed hands.
    pub captures: Vec<Capture>,
    /// Ships consumed by landing.
    pub landings: Vec<Landing>,
    /// Ships destroyed.
    pub deaths: Vec<(PlayerId, ShipId)>,
    /// Victory flags after the tick.
    pub victory: Victory,
}

/// The core game simulation.
///
/// # Stage Order
///
/// Each tick, stages run in this order:
/// 0. **Effects** - age the effects ledger
/// 1. **Cooldowns** - decrement firing and move cooldowns
/// 2. **Firing** - player 1, then player 2
/// 3. **Movement** - player 1, then player 2
/// 4. **Construction** - new ships at the home planets
/// 5. **Ownership** - flip planets whose progress reached 0 or 100
/// 6. **Production** - income from held resource fields
/// 7. **Occupation** - advance contested planets
/// 8. **Land interaction** - healing and landings
/// 9. **Death** - remove ships at 0 hp
/// 10. **Visibility** - reveal around every ship
/// 11. **Victory** - check both home planets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// Current turn, starting at 1.
    turn: u32,
    rules: GameRules,
    board: Board,
    /// Planets; the two homes come first.
    planets: Vec<Planet>,
    players: [PlayerState; 2],
    effects: EffectsLedger,
}

impl Simulation {
    /// Set up the first turn of a round on `map`.
    ///
    /// Each player holds its home planet, sees the area around it, and has
    /// one ship next to it.
    #[must_use]
    pub fn new(rules: GameRules, map: &GeneratedMap) -> Self {
        let board = map.board.clone();
        let planets = map
            .planet_centers
            .iter()
            .enumerate()
            .map(|(i, &center)| match i {
                0 => Planet::owned_by(center, PlayerId::One),
                1 => Planet::owned_by(center, PlayerId::Two),
                _ => Planet::unclaimed(center),
            })
            .collect();

        let players = PlayerId::ALL.map(|player| {
            let mut state = PlayerState::new(&rules, board.size());
            let home = home_origin(player);
            state.occupied_resource_fields = board.count_resource_fields(home);
            state.visibility.reveal_around(home, &PLANET_VISION);
            let (start, facing) = match player {
                PlayerId::One => (PLAYER_1_FIRST_SHIP, Direction::Down),
                PlayerId::Two => (PLAYER_2_FIRST_SHIP, Direction::Up),
            };
            state.ships.spawn(start, rules.ship_max_hp, facing);
            state
        });

        Self {
            turn: 1,
            rules,
            board,
            planets,
            players,
            effects: EffectsLedger::new(),
        }
    }

    /// Current turn number.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Rules this round is played with.
    #[must_use]
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All planets, homes first.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// State of one player.
    #[must_use]
    pub const fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player.index()]
    }

    /// Live effects for renderers.
    #[must_use]
    pub const fn effects(&self) -> &EffectsLedger {
        &self.effects
    }

    /// Look up a ship.
    #[must_use]
    pub fn ship(&self, player: PlayerId, id: ShipId) -> Option<&Ship> {
        self.player(player).ships.get(id)
    }

    /// Current victory flags.
    #[must_use]
    pub fn victory(&self) -> Victory {
        victory_check(&self.board)
    }

    /// Advance the simulation by one turn.
    pub fn tick(&mut self, actions: &Actions) -> TickEvents {
        self.turn += 1;
        let mut events = TickEvents::default();

        self.effects.advance();
        cooldown_stage(&mut self.players);
        events.shots = firing_stage(&mut self.players, actions, &self.rules, &mut self.effects);
        events.moves = movement_stage(
            &mut self.players,
            actions,
            &self.board,
            &self.rules,
            &mut self.effects,
        );
        events.constructed = construction_stage(&mut self.players, actions, &self.rules);
        events.captures = ownership_stage(
            &mut self.board,
            &self.planets,
            &mut self.players,
            &mut self.effects,
        );
        production_stage(&mut self.players, &self.rules);
        occupation_stage(&mut self.planets, &self.rules);
        events.landings = land_interaction_stage(
            &self.board,
            &mut self.planets,
            &mut self.players,
            &self.rules,
            &mut self.effects,
        );
        events.deaths = death_stage(&mut self.players, &mut self.effects);
        visibility_stage(&mut self.players);
        events.victory = victory_check(&self.board);

        #[cfg(feature = "debug-validation")]
        self.validate();

        tracing::trace!(turn = self.turn, state_hash = self.state_hash(), "Simulation state hash");

        events
    }

    /// Spawn a ship directly, bypassing construction.
    ///
    /// Meant for scenario setup; the position is clamped to the board.
    pub fn spawn_ship(&mut self, player: PlayerId, position: GridPos, facing: Direction) -> ShipId {
        let position = position.clamped(self.board.size());
        let hp = self.rules.ship_max_hp;
        self.players[player.index()].ships.spawn(position, hp, facing)
    }

    /// Mutable ship access for scenario setup.
    pub fn ship_mut(&mut self, player: PlayerId, id: ShipId) -> Option<&mut Ship> {
        self.players[player.index()].ships.get_mut(id)
    }

    /// Mutable player access for scenario setup.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player.index()]
    }

    /// Mutable planet access for scenario setup.
    pub fn planet_mut(&mut self, index: usize) -> Option<&mut Planet> {
        self.planets.get_mut(index)
    }

    /// Mutable board access for scenario setup.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two simulations with identical state produce identical hashes. The
    /// effects ledger is presentation-only and not included.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);
        self.board.hash(&mut hasher);
        self.planets.hash(&mut hasher);

        for state in &self.players {
            state.resources.hash(&mut hasher);
            state.occupied_resource_fields.hash(&mut hasher);
            state.visibility.hash(&mut hasher);
            state.ships.next_id().hash(&mut hasher);
            state.ships.len().hash(&mut hasher);
            for ship in state.ships.iter() {
                ship.hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the simulation state for snapshots or replays.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            GameError::Serialization(format!("Failed to deserialize simulation: {e}"))
        })
    }

    #[cfg(feature = "debug-validation")]
    fn validate(&self) {
        let size = self.board.size();
        for state in &self.players {
            debug_assert!(state
                .resources
                .iter()
                .all(|&r| (0..=self.rules.max_resources).contains(&r)));
            for ship in state.ships.iter() {
                debug_assert!(ship.position.in_bounds(size));
                debug_assert!(ship.hp > 0 && ship.hp <= self.rules.ship_max_hp);
            }
        }
        for planet in &self.planets {
            debug_assert!((-1..=100).contains(&planet.occupation_progress));
        }
        debug_assert!(self.board.tiles().iter().all(|t| t.owner().raw() != 0b11));
    }
}
