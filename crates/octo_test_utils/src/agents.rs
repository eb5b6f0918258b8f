//! Scripted agents for automated rounds.
//!
//! - [`IdleAgent`] never does anything
//! - [`RandomAgent`] picks seeded random actions
//! - [`RushAgent`] flies at the nearest planet it does not hold and shoots
//!   anything lined up with its ships

use octo_core::actions::{PlayerAction, ShipAction};
use octo_core::config::GameRules;
use octo_core::game_match::Agent;
use octo_core::math::{Direction, GridPos};
use octo_core::observation::{Observation, ShipView};
use octo_core::ships::ShipId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::fixtures::home_of;

/// Does nothing every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAgent;

impl Agent for IdleAgent {
    fn act(&mut self, _observation: &Observation) -> PlayerAction {
        PlayerAction::idle()
    }
}

/// Random moves, shots and construction from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
    max_speed: i32,
}

impl RandomAgent {
    /// Create an agent whose choices depend only on `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_speed: GameRules::default().base_ship_speed + 1,
        }
    }

    fn direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, observation: &Observation) -> PlayerAction {
        let mut ships_actions = Vec::new();
        for ship in &observation.allied_ships {
            if self.rng.gen_bool(0.3) {
                let direction = self.direction();
                ships_actions.push(ShipAction::fire(ship.id, direction));
            }
            if self.rng.gen_bool(0.8) {
                let direction = self.direction();
                let speed = self.rng.gen_range(0..=self.max_speed);
                ships_actions.push(ShipAction::move_ship(ship.id, direction, speed));
            }
        }
        PlayerAction {
            ships_actions,
            construction: self.rng.gen_range(0..3),
        }
    }
}

/// Greedy expansion: every ship heads for the nearest visible planet its
/// side does not hold, or the enemy home when none is in sight.
#[derive(Debug, Clone)]
pub struct RushAgent {
    fire_range: i32,
}

impl Default for RushAgent {
    fn default() -> Self {
        Self {
            fire_range: GameRules::default().max_ship_fire_range,
        }
    }
}

impl RushAgent {
    /// Create a rush agent with the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn target(observation: &Observation, from: GridPos) -> GridPos {
        let held = observation.player.held_progress();
        observation
            .planets_occupation
            .iter()
            .filter(|planet| planet.occupation_progress != held)
            .map(|planet| GridPos::new(planet.x, planet.y))
            .min_by_key(|center| from.distance_squared(*center))
            .unwrap_or_else(|| home_of(observation.player.opponent()))
    }

    /// Direction of a visible enemy straight along a row or column.
    fn lined_up(&self, ship: &ShipView, enemies: &[ShipView]) -> Option<Direction> {
        let range_sq = i64::from(self.fire_range).pow(2);
        enemies
            .iter()
            .filter(|enemy| ship.position().distance_squared(enemy.position()) <= range_sq)
            .find_map(|enemy| step_toward(ship.position(), enemy.position()))
    }
}

impl Agent for RushAgent {
    fn act(&mut self, observation: &Observation) -> PlayerAction {
        let mut ships_actions = Vec::new();
        for ship in &observation.allied_ships {
            if ship.firing_cooldown == 0 {
                if let Some(direction) = self.lined_up(ship, &observation.enemy_ships) {
                    ships_actions.push(ShipAction::fire(ship.id, direction));
                }
            }
            let target = Self::target(observation, ship.position());
            if let Some(direction) = step_toward(ship.position(), target) {
                ships_actions.push(ShipAction::move_ship(ship.id, direction, 1));
            }
        }
        PlayerAction {
            ships_actions,
            construction: 1,
        }
    }
}

/// Direction along the larger axis of the gap; `None` when already there.
#[must_use]
pub fn step_toward(from: GridPos, to: GridPos) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    Some(if dx.abs() >= dy.abs() {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

/// A turn that only moves `ship`; shorthand for scenarios.
#[must_use]
pub fn single_move(ship: ShipId, direction: Direction, speed: i32) -> PlayerAction {
    PlayerAction {
        ships_actions: vec![ShipAction::move_ship(ship, direction, speed)],
        construction: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octo_core::config::MatchConfig;
    use octo_core::game_match::Match;

    #[test]
    fn test_step_toward() {
        let origin = GridPos::new(10, 10);
        assert_eq!(step_toward(origin, GridPos::new(15, 12)), Some(Direction::Right));
        assert_eq!(step_toward(origin, GridPos::new(9, 2)), Some(Direction::Up));
        assert_eq!(step_toward(origin, GridPos::new(10, 30)), Some(Direction::Down));
        assert_eq!(step_toward(origin, origin), None);
    }

    #[test]
    fn test_random_agent_is_seeded() {
        let mut game = Match::new(MatchConfig::default().with_max_steps(10));
        let (obs, _) = game.reset(Some(1)).unwrap();
        let mut a = RandomAgent::new(7);
        let mut b = RandomAgent::new(7);
        for _ in 0..20 {
            assert_eq!(a.act(&obs.player_1), b.act(&obs.player_1));
        }
    }

    #[test]
    fn test_rush_agent_leaves_home() {
        let mut game = Match::new(MatchConfig::default().with_max_steps(10));
        let (obs, _) = game.reset(Some(2)).unwrap();
        let action = RushAgent::new().act(&obs.player_1);
        assert_eq!(action.construction, 1);
        assert!(action
            .ships_actions
            .iter()
            .any(|a| a.ship_id == obs.player_1.allied_ships[0].id));
    }

    #[test]
    fn test_idle_agent() {
        let mut game = Match::new(MatchConfig::default().with_max_steps(5));
        let outcome = game
            .play_round(Some(3), &mut IdleAgent, &mut IdleAgent)
            .unwrap();
        assert!(outcome.truncated);
    }
}
