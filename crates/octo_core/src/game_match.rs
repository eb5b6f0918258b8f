//! Match facade: rounds, rewards and scores around a [`Simulation`].
//!
//! A [`Match`] is what agents and renderers talk to. `reset` starts a round,
//! `step` advances it by one turn and reports rewards, and `render` hands out
//! a read-only view for drawing.
//!
//! Rounds come in pairs. Even rounds generate a fresh map; the following odd
//! round replays the same layout with the two teams swapped, so both teams
//! get to play both sides. Scores are kept per team across rounds.

use serde::{Deserialize, Serialize};

use crate::actions::{Actions, PlayerAction};
use crate::board::Board;
use crate::config::MatchConfig;
use crate::effects::EffectsLedger;
use crate::error::{GameError, Result};
use crate::map_generation::{generate_map, GeneratedMap};
use crate::observation::{Observation, Observations};
use crate::planets::Planet;
use crate::player::{PlayerId, PlayerState};
use crate::replay::Replay;
use crate::simulation::{Simulation, TickEvents};
use crate::systems::Victory;

/// Per-player reward of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    /// Reward of player 1.
    pub player_1: f64,
    /// Reward of player 2.
    pub player_2: f64,
}

impl Reward {
    /// Reward after a turn.
    ///
    /// A double victory and the step limit are both draws.
    #[must_use]
    pub fn from_outcome(victory: Victory, truncated: bool) -> Self {
        if truncated || victory.is_draw() {
            return Self {
                player_1: 0.5,
                player_2: 0.5,
            };
        }
        Self {
            player_1: if victory.player_1 { 1.0 } else { 0.0 },
            player_2: if victory.player_2 { 1.0 } else { 0.0 },
        }
    }

    /// Reward of `player`.
    #[must_use]
    pub const fn get(&self, player: PlayerId) -> f64 {
        match player {
            PlayerId::One => self.player_1,
            PlayerId::Two => self.player_2,
        }
    }
}

/// Bookkeeping returned alongside observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Zero-based index of the current round.
    pub round: u32,
    /// Current turn.
    pub turn: u32,
    /// Seed of the map in play.
    pub seed: u64,
    /// Team playing each side, indexed by [`PlayerId::index`].
    pub teams: [usize; 2],
    /// Cumulative score of each team.
    pub scores: [f64; 2],
    /// Victory flags after the last turn.
    pub victory: Victory,
}

/// Result of [`Match::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Both players' views after the turn.
    pub observations: Observations,
    /// Reward of the turn.
    pub reward: Reward,
    /// Someone took the opponent's home planet.
    pub terminated: bool,
    /// The step limit was reached.
    pub truncated: bool,
    /// Round bookkeeping.
    pub info: MatchInfo,
    /// What happened during the turn.
    pub events: TickEvents,
}

impl StepOutcome {
    /// Whether the round is over.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Read-only view of a running round for renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    /// Current turn.
    pub turn: u32,
    /// Zero-based round index.
    pub round: u32,
    /// Full board, unfiltered by fog.
    pub board: &'a Board,
    /// Planets, homes first.
    pub planets: &'a [Planet],
    /// Player 1 state.
    pub player_1: &'a PlayerState,
    /// Player 2 state.
    pub player_2: &'a PlayerState,
    /// Animations to draw.
    pub effects: &'a EffectsLedger,
    /// Team on each side.
    pub teams: [usize; 2],
    /// Scores indexed by team.
    pub scores: [f64; 2],
}

/// Something that picks a player's actions from its observation.
pub trait Agent {
    /// Choose the actions for this turn.
    fn act(&mut self, observation: &Observation) -> PlayerAction;
}

impl<F> Agent for F
where
    F: FnMut(&Observation) -> PlayerAction,
{
    fn act(&mut self, observation: &Observation) -> PlayerAction {
        self(observation)
    }
}

/// A series of rounds between two teams.
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    /// Rounds started so far.
    rounds_started: u32,
    map: Option<GeneratedMap>,
    sim: Option<Simulation>,
    finished: bool,
    /// Team on each side, indexed by player.
    teams: [usize; 2],
    /// Scores indexed by team.
    scores: [f64; 2],
    seed: u64,
    replay: Option<Replay>,
}

impl Match {
    /// Create a match; no round is running until [`reset`](Self::reset).
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            rounds_started: 0,
            map: None,
            sim: None,
            finished: false,
            teams: [0, 1],
            scores: [0.0; 2],
            seed: 0,
            replay: None,
        }
    }

    /// Start the next round.
    ///
    /// Even rounds generate a new map from `seed` (random when `None`). Odd
    /// rounds reuse the previous map, reset its ownership, swap the teams and
    /// ignore `seed`.
    ///
    /// # Errors
    ///
    /// Propagates [`GameError::NoSpaceOnMap`] from map generation. The match
    /// is left as it was before the call.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observations, MatchInfo)> {
        let reused = match (&self.map, self.rounds_started % 2) {
            (Some(previous), 1) => {
                let mut map = previous.clone();
                map.reset_ownership();
                Some(map)
            }
            _ => None,
        };
        let map = match reused {
            Some(map) => map,
            None => {
                let seed = seed.unwrap_or_else(rand::random);
                let config = self.config.map.clone().with_seed(seed);
                generate_map(&config)?
            }
        };

        let sim = Simulation::new(self.config.rules.clone(), &map);
        let replay = Replay::new(map.config.seed, &sim)?;

        if self.rounds_started != 0 {
            self.teams.swap(0, 1);
        }
        self.rounds_started += 1;
        self.seed = map.config.seed;
        self.finished = false;
        self.map = Some(map);
        self.sim = Some(sim);
        self.replay = Some(replay);

        let info = self.info();
        tracing::info!(
            round = info.round,
            seed = info.seed,
            teams = ?info.teams,
            "Round started"
        );
        let observations = Observations::observe(self.simulation()?);
        Ok((observations, info))
    }

    /// Advance the round by one turn.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] before the first reset or once the round
    /// has ended.
    pub fn step(&mut self, actions: &Actions) -> Result<StepOutcome> {
        if self.finished {
            return Err(GameError::InvalidState(
                "Round is over; call reset to start the next one".into(),
            ));
        }
        let sim = self
            .sim
            .as_mut()
            .ok_or_else(|| GameError::InvalidState("Match has not been reset".into()))?;

        let events = sim.tick(actions);
        let victory = events.victory;
        let truncated = sim.turn() >= sim.rules().max_steps;
        let terminated = victory.any();

        if let Some(replay) = self.replay.as_mut() {
            replay.record_turn(actions.clone());
        }

        if truncated || terminated {
            self.finished = true;
            self.award_scores(victory, truncated);
            if let (Some(replay), Some(sim)) = (self.replay.as_mut(), self.sim.as_ref()) {
                replay.finalize(sim);
            }
            tracing::info!(
                round = self.current_round(),
                turn = self.turn(),
                player_1_won = victory.player_1,
                player_2_won = victory.player_2,
                truncated,
                scores = ?self.scores,
                "Round ended"
            );
        }

        let sim = self.simulation()?;
        Ok(StepOutcome {
            observations: Observations::observe(sim),
            reward: Reward::from_outcome(victory, truncated),
            terminated,
            truncated,
            info: self.info(),
            events,
        })
    }

    /// Read-only view of the running round.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] before the first reset.
    pub fn render(&self) -> Result<RenderView<'_>> {
        let sim = self.simulation()?;
        Ok(RenderView {
            turn: sim.turn(),
            round: self.current_round(),
            board: sim.board(),
            planets: sim.planets(),
            player_1: sim.player(PlayerId::One),
            player_2: sim.player(PlayerId::Two),
            effects: sim.effects(),
            teams: self.teams,
            scores: self.scores,
        })
    }

    /// Reset and play a whole round between two team agents.
    ///
    /// `team_0` and `team_1` are bound to sides according to the current
    /// team mapping, so calling this repeatedly plays both sides of each map.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`reset`](Self::reset).
    pub fn play_round(
        &mut self,
        seed: Option<u64>,
        team_0: &mut dyn Agent,
        team_1: &mut dyn Agent,
    ) -> Result<StepOutcome> {
        let (mut observations, _) = self.reset(seed)?;
        loop {
            let player_1 = if self.teams[PlayerId::One.index()] == 0 {
                team_0.act(&observations.player_1)
            } else {
                team_1.act(&observations.player_1)
            };
            let player_2 = if self.teams[PlayerId::Two.index()] == 0 {
                team_0.act(&observations.player_2)
            } else {
                team_1.act(&observations.player_2)
            };

            let outcome = self.step(&Actions::new(player_1, player_2))?;
            if outcome.is_done() {
                return Ok(outcome);
            }
            observations = outcome.observations;
        }
    }

    fn award_scores(&mut self, victory: Victory, truncated: bool) {
        if truncated {
            for score in &mut self.scores {
                *score += 0.5;
            }
        }
        let winners = PlayerId::ALL
            .iter()
            .filter(|&&player| victory.has_won(player))
            .count();
        if winners > 0 {
            for player in PlayerId::ALL {
                if victory.has_won(player) {
                    self.scores[self.teams[player.index()]] += 1.0 / winners as f64;
                }
            }
        }
    }

    fn info(&self) -> MatchInfo {
        MatchInfo {
            round: self.current_round(),
            turn: self.turn(),
            seed: self.seed,
            teams: self.teams,
            scores: self.scores,
            victory: self.sim.as_ref().map(Simulation::victory).unwrap_or_default(),
        }
    }

    fn current_round(&self) -> u32 {
        self.rounds_started.saturating_sub(1)
    }

    /// The running simulation.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] before the first reset.
    pub fn simulation(&self) -> Result<&Simulation> {
        self.sim
            .as_ref()
            .ok_or_else(|| GameError::InvalidState("Match has not been reset".into()))
    }

    /// Mutable simulation access for scenario setup.
    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.sim.as_mut()
    }

    /// Current turn, 0 before the first reset.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.sim.as_ref().map_or(0, Simulation::turn)
    }

    /// Configuration of the match.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Map of the current round.
    #[must_use]
    pub const fn map(&self) -> Option<&GeneratedMap> {
        self.map.as_ref()
    }

    /// Rounds started so far.
    #[must_use]
    pub const fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    /// Whether the current round has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Team on `player`'s side.
    #[must_use]
    pub const fn team_of(&self, player: PlayerId) -> usize {
        self.teams[player.index()]
    }

    /// Cumulative scores indexed by team.
    #[must_use]
    pub const fn scores(&self) -> [f64; 2] {
        self.scores
    }

    /// Replay of the current round.
    #[must_use]
    pub const fn replay(&self) -> Option<&Replay> {
        self.replay.as_ref()
    }
}
