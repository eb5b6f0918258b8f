//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical maps and actions.
//!
//! # Testing Strategy
//!
//! Tournament results and replays rely on stepping being 100% deterministic.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: the firing cone uses fixed-point arithmetic via
//!   [`octo_core::math::Fixed`]; everything else is integer.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Ships are always visited in ascending id order.
//!
//! - **System randomness**: map generation uses a seeded ChaCha generator
//!   and nothing after it draws random numbers.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual stages (movement, firing, occupation)
//! 2. **Property tests**: random action scripts still replay identically
//! 3. **Integration tests**: full rounds are reproducible
//! 4. **Parallel tests**: N simulations on separate threads all match

use std::thread;

use octo_core::actions::Actions;
use octo_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of ticks per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one tick; gets the tick index
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use octo_core::actions::Actions;
/// use octo_test_utils::determinism::verify_determinism;
/// use octo_test_utils::fixtures::standard_simulation;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 ticks each
///     || standard_simulation(3),
///     |sim, _| { sim.tick(&Actions::default()); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`Simulation`] twice with the same setup and action script and
/// compare the final state hashes.
///
/// `script` maps a tick index to that tick's actions; ticks past the end of
/// a finite script should return [`Actions::default`].
pub fn verify_simulation_determinism<F, A>(setup_fn: F, script: A, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
    A: Fn(u64) -> Actions,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim, tick| {
            sim.tick(&script(tick));
        },
        Simulation::state_hash,
    );
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F, A>(
    setup_fn: F,
    script: A,
    num_sims: usize,
    num_ticks: u64,
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
    A: Fn(u64) -> Actions + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for tick in 0..num_ticks {
                        sim.tick(&script(tick));
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// simulations start to differ.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F, A>(setup_fn: F, script: A, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
    A: Fn(u64) -> Actions,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let actions = script(tick - 1);
        sim1.tick(&actions);
        sim2.tick(&actions);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot taken mid-round resumes to the same end state as
/// the uninterrupted run.
pub fn verify_serialization_determinism<F, A>(setup_fn: F, script: A, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
    A: Fn(u64) -> Actions,
{
    let mut sim = setup_fn();
    let half = num_ticks / 2;

    for tick in 0..half {
        sim.tick(&script(tick));
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for tick in half..num_ticks {
        let actions = script(tick);
        sim.tick(&actions);
        restored.tick(&actions);
    }

    sim.state_hash() == restored.state_hash()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible action scripts and
/// map configurations.
pub mod strategies {
    use proptest::prelude::*;

    use octo_core::actions::{Actions, PlayerAction, ShipAction};
    use octo_core::map_generation::MapConfig;
    use octo_core::math::Direction;
    use octo_core::ships::ShipId;

    /// Any of the four facings.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    /// Ship ids that exist early in a round, plus a few that do not.
    pub fn arb_ship_id() -> impl Strategy<Value = ShipId> {
        (0u32..6).prop_map(ShipId)
    }

    /// A single move or fire order, speeds including out-of-range ones.
    pub fn arb_ship_action() -> impl Strategy<Value = ShipAction> {
        prop_oneof![
            (arb_ship_id(), arb_direction(), -1i32..4)
                .prop_map(|(id, direction, speed)| ShipAction::move_ship(id, direction, speed)),
            (arb_ship_id(), arb_direction()).prop_map(|(id, direction)| ShipAction::fire(id, direction)),
        ]
    }

    /// One player's orders for a turn.
    pub fn arb_player_action() -> impl Strategy<Value = PlayerAction> {
        (proptest::collection::vec(arb_ship_action(), 0..6), 0u32..3).prop_map(
            |(ships_actions, construction)| PlayerAction {
                ships_actions,
                construction,
            },
        )
    }

    /// Both players' orders for a turn.
    pub fn arb_actions() -> impl Strategy<Value = Actions> {
        (arb_player_action(), arb_player_action()).prop_map(|(p1, p2)| Actions::new(p1, p2))
    }

    /// A script of up to `max_len` turns.
    pub fn arb_action_script(max_len: usize) -> impl Strategy<Value = Vec<Actions>> {
        proptest::collection::vec(arb_actions(), 0..max_len)
    }

    /// A default map config with a random seed.
    pub fn arb_map_config() -> impl Strategy<Value = MapConfig> {
        any::<u64>().prop_map(|seed| MapConfig::default().with_seed(seed))
    }

    /// Raw wire tuples, most of them malformed.
    pub fn arb_wire_action() -> impl Strategy<Value = Vec<i64>> {
        proptest::collection::vec(-2i64..6, 0..6)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::agents::{single_move, RandomAgent};
    use crate::fixtures::{open_simulation, standard_simulation};
    use octo_core::actions::{PlayerAction, ShipAction};
    use octo_core::game_match::Agent;
    use octo_core::math::Direction;
    use octo_core::observation::Observations;
    use octo_core::player::PlayerId;
    use octo_core::ships::ShipId;
    use proptest::prelude::*;

    fn idle(_: u64) -> Actions {
        Actions::default()
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 50, || 0u64, |n, tick| *n += tick * 3, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_idle_round_determinism() {
        assert!(verify_simulation_determinism(|| standard_simulation(1), idle, 200));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        assert_eq!(find_first_divergence(|| standard_simulation(2), idle, 100), None);
    }

    #[test]
    fn test_snapshot_resumes_identically() {
        let script = |tick: u64| {
            let direction = Direction::ALL[(tick / 5 % 4) as usize];
            Actions::new(
                PlayerAction {
                    ships_actions: vec![
                        ShipAction::move_ship(ShipId(0), direction, 1),
                        ShipAction::fire(ShipId(1), direction),
                    ],
                    construction: 1,
                },
                single_move(ShipId(0), direction, 2),
            )
        };
        assert!(verify_serialization_determinism(|| open_simulation(4), script, 120));
    }

    #[test]
    fn test_agents_driven_determinism() {
        let run = || {
            let mut sim = standard_simulation(5);
            let mut agents = [RandomAgent::new(10), RandomAgent::new(20)];
            for _ in 0..150 {
                let obs = Observations::observe(&sim);
                let actions = Actions::new(
                    agents[0].act(obs.get(PlayerId::One)),
                    agents[1].act(obs.get(PlayerId::Two)),
                );
                sim.tick(&actions);
            }
            sim.state_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_parallel_simulations() {
        let result = run_parallel_simulations(|| standard_simulation(6), idle, 4, 100);
        assert_eq!(result.num_sims, 4);
        result.assert_deterministic();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_action_scripts_are_deterministic(script in arb_action_script(40)) {
            let len = script.len() as u64;
            let at = |tick: u64| script.get(tick as usize).cloned().unwrap_or_default();
            prop_assert_eq!(find_first_divergence(|| open_simulation(7), at, len), None);
        }

        #[test]
        fn prop_wire_actions_decode_to_their_prefix(wire in arb_wire_action()) {
            let decoded = ShipAction::from_wire(&wire);
            let parsed = PlayerAction::from_wire(&[wire.clone()], 0);
            prop_assert_eq!(parsed.ships_actions.len(), usize::from(decoded.is_some()));

            if let Some(action) = decoded {
                let encoded = action.to_wire();
                prop_assert!(wire.starts_with(&encoded));
                prop_assert_eq!(ShipAction::from_wire(&encoded), Some(action));
            }
        }
    }
}
