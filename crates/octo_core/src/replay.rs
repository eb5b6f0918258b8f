//! Replay system for recording and playing back rounds.
//!
//! Replays store the initial simulation state and the actions of both
//! players for every turn. Because stepping is deterministic, that is enough
//! to recreate the whole round and check it against the recorded final hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::Actions;
use crate::error::{GameError, Result};
use crate::simulation::Simulation;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Map seed of the round.
    pub seed: u64,
    /// Serialized initial simulation state.
    pub initial_state: Vec<u8>,
    /// Actions of both players, one entry per turn.
    pub turns: Vec<Actions>,
    /// Turn on which the recording ended.
    pub final_turn: u32,
    /// State hash at the end of the recording.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from a simulation's initial state.
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn new(seed: u64, initial_state: &Simulation) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            seed,
            initial_state: initial_state.serialize()?,
            turns: Vec::new(),
            final_turn: initial_state.turn(),
            final_hash: initial_state.state_hash(),
        })
    }

    /// Record the actions applied on the next turn.
    pub fn record_turn(&mut self, actions: Actions) {
        self.turns.push(actions);
    }

    /// Store the end state to verify against.
    pub fn finalize(&mut self, simulation: &Simulation) {
        self.final_turn = simulation.turn();
        self.final_hash = simulation.state_hash();
    }

    /// Encode to bytes.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize replay: {e}")))
    }

    /// Decode from bytes, checking the format version.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a replay of this version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {}, got {}",
                REPLAY_VERSION, replay.version
            )));
        }

        Ok(replay)
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to write replay file: {e}")))
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::Serialization(format!("Failed to read replay file: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Get the initial simulation state for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<Simulation> {
        Simulation::deserialize(&self.initial_state)
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn duration(&self) -> usize {
        self.turns.len()
    }

    /// Re-simulate every turn and compare with the recorded end state.
    ///
    /// # Errors
    /// [`GameError::ReplayDesync`] if the replayed hash differs.
    pub fn verify(&self) -> Result<()> {
        let mut player = ReplayPlayer::new(self.clone())?;
        player.run_to_end();
        let replayed = player.simulation().state_hash();
        if replayed != self.final_hash {
            return Err(GameError::ReplayDesync {
                tick: self.final_turn,
                recorded: self.final_hash,
                replayed,
            });
        }
        Ok(())
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    simulation: Simulation,
    next_turn: usize,
}

impl ReplayPlayer {
    /// Create a new replay player from a replay.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let simulation = replay.restore_initial_state()?;
        Ok(Self {
            replay,
            simulation,
            next_turn: 0,
        })
    }

    /// Apply the next recorded turn.
    ///
    /// Returns true if there are more turns to play.
    pub fn advance(&mut self) -> bool {
        if let Some(actions) = self.replay.turns.get(self.next_turn) {
            self.simulation.tick(actions);
            self.next_turn += 1;
        }
        !self.is_finished()
    }

    /// Play every remaining turn.
    pub fn run_to_end(&mut self) {
        while self.advance() {}
    }

    /// Whether every recorded turn has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next_turn >= self.replay.turns.len()
    }

    /// The simulation at the current playback position.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{PlayerAction, ShipAction};
    use crate::config::GameRules;
    use crate::map_generation::{generate_map, MapConfig};
    use crate::math::Direction;
    use crate::ships::ShipId;

    fn recorded(turns: usize) -> (Replay, Simulation) {
        let map = generate_map(&MapConfig::default().with_seed(77)).unwrap();
        let mut sim = Simulation::new(GameRules::default(), &map);
        let mut replay = Replay::new(77, &sim).unwrap();
        for i in 0..turns {
            let direction = if i % 2 == 0 { Direction::Down } else { Direction::Right };
            let actions = Actions::new(
                PlayerAction {
                    ships_actions: vec![ShipAction::move_ship(ShipId(0), direction, 1)],
                    construction: 1,
                },
                PlayerAction {
                    ships_actions: vec![ShipAction::fire(ShipId(0), Direction::Up)],
                    construction: 0,
                },
            );
            sim.tick(&actions);
            replay.record_turn(actions);
        }
        replay.finalize(&sim);
        (replay, sim)
    }

    #[test]
    fn test_verify_matches() {
        let (replay, sim) = recorded(20);
        assert_eq!(replay.duration(), 20);
        assert_eq!(replay.final_turn, sim.turn());
        replay.verify().unwrap();
    }

    #[test]
    fn test_verify_detects_tampering() {
        let (mut replay, _) = recorded(10);
        replay.turns[0].player_1.construction = 0;
        assert!(matches!(replay.verify(), Err(GameError::ReplayDesync { .. })));
    }

    #[test]
    fn test_player_steps_through() {
        let (replay, sim) = recorded(5);
        let mut player = ReplayPlayer::new(replay).unwrap();
        let mut steps = 0;
        while player.advance() {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert!(player.is_finished());
        assert_eq!(player.simulation().state_hash(), sim.state_hash());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let (replay, _) = recorded(3);
        let bytes = replay.to_bytes().unwrap();
        assert_eq!(Replay::from_bytes(&bytes).unwrap(), replay);
    }

    #[test]
    fn test_version_mismatch() {
        let (mut replay, _) = recorded(1);
        replay.version = 99;
        let bytes = replay.to_bytes().unwrap();
        assert!(matches!(Replay::from_bytes(&bytes), Err(GameError::InvalidState(_))));
    }

    #[test]
    fn test_save_and_load() {
        let (replay, _) = recorded(2);
        let path = std::env::temp_dir().join(format!("octo_replay_{}.bin", std::process::id()));
        replay.save(&path).unwrap();
        let loaded = Replay::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, replay);
    }
}
