//! Test fixtures and helpers.
//!
//! Pre-built maps, simulations and matches for consistent testing.

use octo_core::config::{GameRules, MatchConfig, PLAYER_1_ORIGIN, PLAYER_2_ORIGIN};
use octo_core::game_match::Match;
use octo_core::map_generation::{generate_map, GeneratedMap, MapConfig};
use octo_core::math::GridPos;
use octo_core::player::PlayerId;
use octo_core::simulation::Simulation;

/// Seed used when a test does not care about the layout.
pub const DEFAULT_SEED: u64 = 42;

/// Generate the standard map for `seed`.
///
/// # Panics
///
/// Panics if generation runs out of space, which the default
/// configuration never does.
#[must_use]
pub fn standard_map(seed: u64) -> GeneratedMap {
    generate_map(&MapConfig::default().with_seed(seed)).expect("default map config must generate")
}

/// A map with only the two home planets and no obstacles.
///
/// Handy for movement and combat scenarios where asteroids would get in
/// the way.
///
/// # Panics
///
/// Panics if generation fails.
#[must_use]
pub fn open_map(seed: u64) -> GeneratedMap {
    let config = MapConfig::default()
        .with_seed(seed)
        .with_planets(0)
        .with_asteroid_fraction(0.0)
        .with_ionized_fraction(0.0);
    generate_map(&config).expect("empty map config must generate")
}

/// Fresh simulation on the standard map.
#[must_use]
pub fn standard_simulation(seed: u64) -> Simulation {
    Simulation::new(GameRules::default(), &standard_map(seed))
}

/// Fresh simulation on an open map.
#[must_use]
pub fn open_simulation(seed: u64) -> Simulation {
    Simulation::new(GameRules::default(), &open_map(seed))
}

/// A match with a short step limit.
#[must_use]
pub fn short_match(max_steps: u32) -> Match {
    Match::new(MatchConfig::default().with_max_steps(max_steps))
}

/// Centre of `player`'s home planet.
#[must_use]
pub const fn home_of(player: PlayerId) -> GridPos {
    match player {
        PlayerId::One => PLAYER_1_ORIGIN,
        PlayerId::Two => PLAYER_2_ORIGIN,
    }
}

/// Hand `player` the home planet of `home` outright: board ownership and
/// occupation progress both move over.
///
/// # Panics
///
/// Panics if the home planet is missing, which cannot happen on a
/// generated map.
pub fn hand_over_home(sim: &mut Simulation, home: PlayerId, player: PlayerId) {
    sim.board_mut().set_footprint_owner(home_of(home), player);
    sim.planet_mut(home.index())
        .expect("home planets are always present")
        .occupation_progress = player.held_progress();
}
