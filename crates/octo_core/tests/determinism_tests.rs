//! Whole-round determinism checks.

use octo_core::actions::{Actions, PlayerAction, ShipAction};
use octo_core::config::MatchConfig;
use octo_core::game_match::{Agent, Match};
use octo_core::map_generation::{generate_map, MapConfig};
use octo_core::math::Direction;
use octo_core::observation::Observations;
use octo_core::ships::ShipId;
use octo_core::simulation::Simulation;
use octo_test_utils::agents::{RandomAgent, RushAgent};
use octo_test_utils::determinism::{
    find_first_divergence, run_parallel_simulations, verify_determinism,
    verify_serialization_determinism,
};
use octo_test_utils::fixtures::standard_simulation;

/// Ships 0..4 of both players sweep around and fire; both sides build.
fn patrol_script(tick: u64) -> Actions {
    let phase = (tick / 7 % 4) as usize;
    let orders = |facing: Direction| PlayerAction {
        ships_actions: (0..4)
            .flat_map(|id| {
                [
                    ShipAction::move_ship(ShipId(id), facing, 1 + (tick % 2) as i32),
                    ShipAction::fire(ShipId(id), facing),
                ]
            })
            .collect(),
        construction: 1,
    };
    Actions::new(
        orders(Direction::ALL[phase]),
        orders(Direction::ALL[(phase + 2) % 4]),
    )
}

#[test]
fn same_seed_same_map() {
    let config = MapConfig::default().with_seed(0xDEAD_BEEF);
    let a = generate_map(&config).unwrap();
    let b = generate_map(&config).unwrap();
    assert_eq!(a, b);

    let other = generate_map(&config.clone().with_seed(1)).unwrap();
    assert_ne!(a.board, other.board);
}

#[test]
fn full_match_rounds_are_reproducible() {
    let play = || {
        let mut game = Match::new(MatchConfig::default().with_max_steps(300));
        let mut hashes = Vec::new();
        for _ in 0..2 {
            game.play_round(Some(21), &mut RushAgent::new(), &mut RandomAgent::new(5))
                .unwrap();
            hashes.push(game.simulation().unwrap().state_hash());
        }
        (hashes, game.scores())
    };
    assert_eq!(play(), play());
}

#[test]
fn agent_driven_simulation_is_deterministic() {
    let result = verify_determinism(
        3,
        200,
        || (standard_simulation(9), RushAgent::new(), RandomAgent::new(3)),
        |state: &mut (Simulation, RushAgent, RandomAgent), _| {
            let (sim, p1, p2) = state;
            let obs = Observations::observe(sim);
            let actions = Actions::new(p1.act(&obs.player_1), p2.act(&obs.player_2));
            sim.tick(&actions);
        },
        |state: &(Simulation, RushAgent, RandomAgent)| state.0.state_hash(),
    );
    result.assert_deterministic();
}

#[test]
fn snapshots_resume_identically() {
    assert!(verify_serialization_determinism(
        || standard_simulation(10),
        patrol_script,
        80
    ));
}

#[test]
fn no_divergence_between_runs() {
    assert_eq!(find_first_divergence(|| standard_simulation(11), patrol_script, 60), None);
}

#[test]
fn parallel_runs_agree() {
    run_parallel_simulations(|| standard_simulation(12), patrol_script, 4, 60).assert_deterministic();
}

#[test]
fn snapshot_bytes_are_stable() {
    let sim = standard_simulation(13);
    let bytes = sim.serialize().unwrap();
    let restored = Simulation::deserialize(&bytes).unwrap();
    assert_eq!(restored, sim);
    assert_eq!(restored.serialize().unwrap(), bytes);
}
