//! Tick stages.
//!
//! Each stage is a free function over the pieces of state it touches. The
//! [`Simulation`](crate::simulation::Simulation) calls them in a fixed order;
//! firing lives in [`combat`](crate::combat).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::actions::{Actions, ShipActionKind};
use crate::board::Board;
use crate::config::{GameRules, PLAYER_1_ORIGIN, PLAYER_2_ORIGIN};
use crate::effects::{EffectKind, EffectsLedger};
use crate::math::{Direction, GridPos};
use crate::planets::{Planet, MAX_PROGRESS, MIN_PROGRESS};
use crate::player::{PlayerId, PlayerState};
use crate::schemes::{PLANET_VISION, SHIP_VISION};
use crate::ships::ShipId;

/// Home planet centre of `player`; constructed ships appear here.
#[must_use]
pub const fn home_origin(player: PlayerId) -> GridPos {
    match player {
        PlayerId::One => PLAYER_1_ORIGIN,
        PlayerId::Two => PLAYER_2_ORIGIN,
    }
}

// ============================================================================
// Cooldowns
// ============================================================================

/// Decrement both cooldowns of every ship, never below 0.
pub fn cooldown_stage(players: &mut [PlayerState; 2]) {
    for state in players.iter_mut() {
        for ship in state.ships.iter_mut() {
            ship.firing_cooldown = (ship.firing_cooldown - 1).max(0);
            ship.move_cooldown = (ship.move_cooldown - 1).max(0);
        }
    }
}

// ============================================================================
// Movement
// ============================================================================

/// A completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    /// Owner of the ship.
    pub player: PlayerId,
    /// The ship.
    pub ship: ShipId,
    /// Position before the move.
    pub from: GridPos,
    /// Position after the move.
    pub to: GridPos,
    /// Whether the ship ended on an asteroid field.
    pub hit_asteroid: bool,
}

/// Resolve every move action, player 1 first.
///
/// A ship standing on an ionized field may move `ionized_field_speed_factor`
/// times farther. The requested speed is clipped to `[0, max]` and the
/// destination clamped to the board. Ending on an asteroid costs hit points
/// and grounds the ship for `move_cooldown` ticks.
pub fn movement_stage(
    players: &mut [PlayerState; 2],
    actions: &Actions,
    board: &Board,
    rules: &GameRules,
    effects: &mut EffectsLedger,
) -> Vec<Movement> {
    let mut moves = Vec::new();

    for player in PlayerId::ALL {
        let state = &mut players[player.index()];
        let mut moved = HashSet::new();

        for action in &actions.get(player).ships_actions {
            let ShipActionKind::Move { direction, speed } = action.kind else {
                continue;
            };
            if !moved.insert(action.ship_id) {
                continue;
            }
            let Some(ship) = state.ships.get_mut(action.ship_id) else {
                continue;
            };
            if ship.move_cooldown > 0 {
                continue;
            }

            let from = ship.position;
            let max_speed = if board.tile(from).is_ionized() {
                rules.base_ship_speed * rules.ionized_field_speed_factor
            } else {
                rules.base_ship_speed
            };
            let speed = speed.clamp(0, max_speed.max(0));
            if speed > rules.base_ship_speed {
                effects.push(EffectKind::SpaceJump {
                    origin: from,
                    direction,
                });
            }

            let (dx, dy) = direction.vector();
            let to = from.offset(dx * speed, dy * speed).clamped(board.size());
            ship.position = to;
            ship.facing = direction;

            let hit_asteroid = board.tile(to).is_asteroid();
            if hit_asteroid {
                ship.hp -= rules.asteroid_damage;
                ship.move_cooldown = rules.move_cooldown;
            }

            if board.tile(to).is_owned_by(player) {
                effects.start_heal(player, ship.id);
            } else {
                effects.stop_heal(player, ship.id);
            }

            moves.push(Movement {
                player,
                ship: ship.id,
                from,
                to,
                hit_asteroid,
            });
        }
    }

    moves
}

// ============================================================================
// Construction
// ============================================================================

/// Build up to `construction` ships per player at their home origin.
///
/// Each ship is paid for separately, so a request larger than the stock
/// builds as many as affordable. The fleet never exceeds `max_ships`.
pub fn construction_stage(
    players: &mut [PlayerState; 2],
    actions: &Actions,
    rules: &GameRules,
) -> Vec<(PlayerId, ShipId)> {
    let mut built = Vec::new();

    for player in PlayerId::ALL {
        let state = &mut players[player.index()];
        for _ in 0..actions.get(player).construction {
            if state.ships.len() >= rules.max_ships || !state.can_afford(&rules.ship_cost) {
                break;
            }
            state.pay(&rules.ship_cost);
            let id = state
                .ships
                .spawn(home_origin(player), rules.ship_max_hp, Direction::Right);
            built.push((player, id));
        }
    }

    if !built.is_empty() {
        tracing::debug!(ships = built.len(), "Ships constructed");
    }
    built
}

// ============================================================================
// Ownership
// ============================================================================

/// A planet that changed hands this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    /// Index into the planet list.
    pub planet: usize,
    /// New owner.
    pub player: PlayerId,
    /// Previous owner, if the planet was held.
    pub previous: Option<PlayerId>,
}

/// Flip the footprint of every planet whose progress sits at a player's
/// value but whose centre tile lacks that player's bit.
///
/// The footprint's resource fields move from the previous owner's tally to
/// the new owner's, and the new owner sees the area around the planet.
pub fn ownership_stage(
    board: &mut Board,
    planets: &[Planet],
    players: &mut [PlayerState; 2],
    effects: &mut EffectsLedger,
) -> Vec<Capture> {
    let mut captures = Vec::new();

    for (index, planet) in planets.iter().enumerate() {
        let Some(new_owner) = planet.holder() else {
            continue;
        };
        let center_tile = board.tile(planet.center);
        if center_tile.is_owned_by(new_owner) {
            continue;
        }

        let previous = center_tile.owner().sole_owner();
        let fields = board.count_resource_fields(planet.center);
        if let Some(previous) = previous {
            let tally = &mut players[previous.index()].occupied_resource_fields;
            for (count, lost) in tally.iter_mut().zip(fields) {
                *count -= lost;
            }
        }

        board.set_footprint_owner(planet.center, new_owner);
        let state = &mut players[new_owner.index()];
        for (count, gained) in state.occupied_resource_fields.iter_mut().zip(fields) {
            *count += gained;
        }
        state.visibility.reveal_around(planet.center, &PLANET_VISION);

        effects.push(EffectKind::Capture {
            center: planet.center,
            player: new_owner,
        });
        tracing::debug!(
            planet = index,
            x = planet.center.x,
            y = planet.center.y,
            %new_owner,
            "Planet captured"
        );
        captures.push(Capture {
            planet: index,
            player: new_owner,
            previous,
        });
    }

    captures
}

// ============================================================================
// Economy
// ============================================================================

/// Add income from held resource fields, clamped to `[0, max_resources]`.
pub fn production_stage(players: &mut [PlayerState; 2], rules: &GameRules) {
    let divisor = rules.resource_production_divisor.max(1);
    for state in players.iter_mut() {
        for (stock, fields) in state
            .resources
            .iter_mut()
            .zip(state.occupied_resource_fields)
        {
            *stock = (*stock + fields / divisor).clamp(0, rules.max_resources);
        }
    }
}

// ============================================================================
// Occupation
// ============================================================================

/// Push contested planets along their ongoing occupation.
pub fn occupation_stage(planets: &mut [Planet], rules: &GameRules) {
    for planet in planets.iter_mut().filter(|p| p.ongoing_occupation != 0) {
        planet.occupation_progress = (planet.occupation_progress
            + planet.ongoing_occupation * rules.occupation_speed)
            .clamp(MIN_PROGRESS, MAX_PROGRESS);
        if planet.holder().is_some() {
            planet.ongoing_occupation = 0;
        }
    }
}

/// A ship that landed on a planet and was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    /// Owner of the ship.
    pub player: PlayerId,
    /// The consumed ship.
    pub ship: ShipId,
    /// Index into the planet list.
    pub planet: usize,
}

/// Heal ships on own territory, then land ships near planet centres.
///
/// Only the first planet in range counts. Landing on a planet the player
/// already holds does nothing; every other landing consumes the ship.
pub fn land_interaction_stage(
    board: &Board,
    planets: &mut [Planet],
    players: &mut [PlayerState; 2],
    rules: &GameRules,
    effects: &mut EffectsLedger,
) -> Vec<Landing> {
    let mut landings = Vec::new();
    let range_sq = i64::from(rules.ship_occupation_range).pow(2);

    for player in PlayerId::ALL {
        let state = &mut players[player.index()];

        for id in state.ships.ids() {
            let Some(ship) = state.ships.get_mut(id) else {
                continue;
            };
            if board.tile(ship.position).is_owned_by(player)
                && ship.is_alive()
                && ship.hp < rules.ship_max_hp
            {
                ship.hp = (ship.hp + rules.ship_healing_speed).min(rules.ship_max_hp);
            }

            let position = ship.position;
            let Some((index, planet)) = planets
                .iter_mut()
                .enumerate()
                .find(|(_, planet)| planet.center.distance_squared(position) <= range_sq)
            else {
                continue;
            };
            if !land(planet, player, rules) {
                continue;
            }

            state.ships.remove(id);
            effects.stop_heal(player, id);
            tracing::debug!(%player, ship = %id, planet = index, "Ship landed");
            landings.push(Landing {
                player,
                ship: id,
                planet: index,
            });
        }
    }

    landings
}

/// Apply one landing to `planet`. Returns whether the ship is consumed.
fn land(planet: &mut Planet, player: PlayerId, rules: &GameRules) -> bool {
    let sign = player.occupation_sign();

    if planet.is_contested() {
        planet.ongoing_occupation += sign;
    } else if planet.is_unclaimed() {
        planet.occupation_progress = player.held_progress();
    } else if planet.holder() == Some(player.opponent()) {
        planet.occupation_progress =
            player.opponent().held_progress() + sign * rules.occupation_speed;
        planet.ongoing_occupation += sign;
    } else {
        return false;
    }
    true
}

// ============================================================================
// Death
// ============================================================================

/// Remove every ship at 0 hp or below.
pub fn death_stage(
    players: &mut [PlayerState; 2],
    effects: &mut EffectsLedger,
) -> Vec<(PlayerId, ShipId)> {
    let mut deaths = Vec::new();

    for player in PlayerId::ALL {
        let state = &mut players[player.index()];
        let dead: Vec<_> = state
            .ships
            .iter()
            .filter(|ship| !ship.is_alive())
            .map(|ship| (ship.id, ship.position))
            .collect();

        for (id, position) in dead {
            state.ships.remove(id);
            effects.stop_heal(player, id);
            effects.push(EffectKind::Death { position });
            tracing::debug!(%player, ship = %id, "Ship destroyed");
            deaths.push((player, id));
        }
    }

    deaths
}

// ============================================================================
// Visibility and victory
// ============================================================================

/// Reveal the ship vision stencil around every ship.
pub fn visibility_stage(players: &mut [PlayerState; 2]) {
    for state in players.iter_mut() {
        let PlayerState {
            ships, visibility, ..
        } = state;
        for ship in ships.iter() {
            visibility.reveal_around(ship.position, &SHIP_VISION);
        }
    }
}

/// Which players have taken the opponent's home planet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Victory {
    /// Player 1 took player 2's home.
    pub player_1: bool,
    /// Player 2 took player 1's home.
    pub player_2: bool,
}

impl Victory {
    /// Whether `player` has won.
    #[must_use]
    pub const fn has_won(&self, player: PlayerId) -> bool {
        match player {
            PlayerId::One => self.player_1,
            PlayerId::Two => self.player_2,
        }
    }

    /// Whether anyone has won.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.player_1 || self.player_2
    }

    /// Whether both sides won in the same tick.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.player_1 && self.player_2
    }
}

/// A player wins once the opponent's home centre lost the opponent's bit.
#[must_use]
pub fn victory_check(board: &Board) -> Victory {
    Victory {
        player_1: !board
            .tile(home_origin(PlayerId::Two))
            .is_owned_by(PlayerId::Two),
        player_2: !board
            .tile(home_origin(PlayerId::One))
            .is_owned_by(PlayerId::One),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{PlayerAction, ShipAction};
    use crate::map_generation::planet_corner;
    use crate::planets::UNCLAIMED;
    use crate::schemes::{planet_with_fields, starting_planet};
    use crate::tile::Tile;

    fn setup() -> (Board, [PlayerState; 2], GameRules) {
        let rules = GameRules::default();
        let mut board = Board::new(100);
        for player in PlayerId::ALL {
            let origin = home_origin(player);
            board.stamp_planet(planet_corner(origin), &starting_planet());
            board.set_footprint_owner(origin, player);
        }
        let mut players = [PlayerState::new(&rules, 100), PlayerState::new(&rules, 100)];
        for state in &mut players {
            state.occupied_resource_fields = [4; 4];
        }
        (board, players, rules)
    }

    fn moves(player: PlayerId, list: Vec<ShipAction>) -> Actions {
        let action = PlayerAction {
            ships_actions: list,
            construction: 0,
        };
        match player {
            PlayerId::One => Actions::new(action, PlayerAction::idle()),
            PlayerId::Two => Actions::new(PlayerAction::idle(), action),
        }
    }

    #[test]
    fn test_cooldowns_floor_at_zero() {
        let (_, mut players, _) = setup();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        players[0].ships.get_mut(id).unwrap().firing_cooldown = 1;
        cooldown_stage(&mut players);
        cooldown_stage(&mut players);
        let ship = players[0].ships.get(id).unwrap();
        assert_eq!((ship.firing_cooldown, ship.move_cooldown), (0, 0));
    }

    #[test]
    fn test_move_one_cell() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Up, 5)]);
        let done = movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        assert_eq!(done[0].to, GridPos::new(40, 39));
        assert_eq!(players[0].ships.get(id).unwrap().facing, Direction::Up);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_negative_speed_turns_in_place() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[1].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        let actions = moves(PlayerId::Two, vec![ShipAction::move_ship(id, Direction::Left, -3)]);
        movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        let ship = players[1].ships.get(id).unwrap();
        assert_eq!(ship.position, GridPos::new(40, 40));
        assert_eq!(ship.facing, Direction::Left);
    }

    #[test]
    fn test_ionized_field_jump() {
        let (mut board, mut players, rules) = setup();
        board.set(GridPos::new(40, 40), Tile::IONIZED);
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Right, 10)]);
        movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        assert_eq!(players[0].ships.get(id).unwrap().position, GridPos::new(43, 40));
        assert!(matches!(
            effects.iter().next().unwrap().kind,
            EffectKind::SpaceJump { .. }
        ));
    }

    #[test]
    fn test_move_clamps_to_board() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(0, 50), 100, Direction::Right);
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Left, 1)]);
        movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        assert_eq!(players[0].ships.get(id).unwrap().position, GridPos::new(0, 50));
    }

    #[test]
    fn test_asteroid_hit() {
        let (mut board, mut players, rules) = setup();
        board.set(GridPos::new(41, 40), Tile::ASTEROID);
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Right, 1)]);
        let done = movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        assert!(done[0].hit_asteroid);
        let ship = players[0].ships.get(id).unwrap();
        assert_eq!((ship.hp, ship.move_cooldown), (97, 3));
    }

    #[test]
    fn test_fatal_asteroid_hit_still_moves() {
        let (mut board, mut players, rules) = setup();
        board.set(GridPos::new(41, 40), Tile::ASTEROID);
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 0, Direction::Right);
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Right, 1)]);
        let done = movement_stage(&mut players, &actions, &board, &rules, &mut effects);
        assert_eq!(done.len(), 1);
        let ship = players[0].ships.get(id).unwrap();
        assert_eq!((ship.position, ship.hp), (GridPos::new(41, 40), -3));
    }

    #[test]
    fn test_cooled_down_ship_stays() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(40, 40), 100, Direction::Right);
        players[0].ships.get_mut(id).unwrap().move_cooldown = 2;
        let actions = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Right, 1)]);
        assert!(movement_stage(&mut players, &actions, &board, &rules, &mut effects).is_empty());
        assert_eq!(players[0].ships.get(id).unwrap().position, GridPos::new(40, 40));
    }

    #[test]
    fn test_heal_effect_follows_territory() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[0].ships.spawn(GridPos::new(14, 9), 100, Direction::Right);
        let enter = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Left, 1)]);
        movement_stage(&mut players, &enter, &board, &rules, &mut effects);
        assert!(effects.is_healing(PlayerId::One, id));
        let leave = moves(PlayerId::One, vec![ShipAction::move_ship(id, Direction::Right, 1)]);
        movement_stage(&mut players, &leave, &board, &rules, &mut effects);
        assert!(!effects.is_healing(PlayerId::One, id));
    }

    #[test]
    fn test_construction_is_partial() {
        let (_, mut players, rules) = setup();
        players[0].resources = [250, 300, 200, 1000];
        let actions = Actions::new(
            PlayerAction {
                ships_actions: Vec::new(),
                construction: 5,
            },
            PlayerAction::idle(),
        );
        let built = construction_stage(&mut players, &actions, &rules);
        assert_eq!(built.len(), 2);
        assert_eq!(players[0].resources, [50, 100, 0, 800]);
        let ship = players[0].ships.get(built[0].1).unwrap();
        assert_eq!(ship.position, PLAYER_1_ORIGIN);
        assert_eq!(ship.hp, 100);
    }

    #[test]
    fn test_construction_respects_fleet_cap() {
        let (_, mut players, mut rules) = setup();
        rules.max_ships = 1;
        players[1].resources = [1000; 4];
        let actions = Actions::new(
            PlayerAction::idle(),
            PlayerAction {
                ships_actions: Vec::new(),
                construction: 3,
            },
        );
        assert_eq!(construction_stage(&mut players, &actions, &rules).len(), 1);
        assert_eq!(players[1].ships.next_id(), ShipId(1));
    }

    #[test]
    fn test_capture_neutral_planet() {
        let (mut board, mut players, _) = setup();
        let center = GridPos::new(50, 50);
        board.stamp_planet(planet_corner(center), &planet_with_fields([1, 2, 3, 10]));
        let planets = [Planet {
            center,
            occupation_progress: 100,
            ongoing_occupation: 0,
        }];
        let mut effects = EffectsLedger::new();
        let captures = ownership_stage(&mut board, &planets, &mut players, &mut effects);
        assert_eq!(
            captures,
            vec![Capture {
                planet: 0,
                player: PlayerId::Two,
                previous: None
            }]
        );
        assert_eq!(players[1].occupied_resource_fields, [5, 6, 7, 14]);
        assert!(players[1].visibility.is_visible(GridPos::new(50, 41)));
        assert!(board.tile(center).is_owned_by(PlayerId::Two));

        // already flipped: nothing happens the second time
        assert!(ownership_stage(&mut board, &planets, &mut players, &mut effects).is_empty());
    }

    #[test]
    fn test_capture_moves_tally_between_players() {
        let (mut board, mut players, _) = setup();
        let planets = [Planet::owned_by(PLAYER_2_ORIGIN, PlayerId::One)];
        let mut effects = EffectsLedger::new();
        ownership_stage(&mut board, &planets, &mut players, &mut effects);
        assert_eq!(players[0].occupied_resource_fields, [8; 4]);
        assert_eq!(players[1].occupied_resource_fields, [0; 4]);
        assert!(victory_check(&board).player_1);
        assert!(!victory_check(&board).player_2);
    }

    #[test]
    fn test_production() {
        let (_, mut players, rules) = setup();
        players[0].resources = [0, 998, 500, 1000];
        players[0].occupied_resource_fields = [4, 12, 3, 4];
        production_stage(&mut players, &rules);
        assert_eq!(players[0].resources, [1, 1000, 500, 1000]);
    }

    #[test]
    fn test_occupation_progress() {
        let rules = GameRules::default();
        let mut planets = [
            Planet {
                center: GridPos::new(0, 0),
                occupation_progress: 98,
                ongoing_occupation: -1,
            },
            Planet {
                center: GridPos::new(0, 0),
                occupation_progress: 97,
                ongoing_occupation: 2,
            },
            Planet::unclaimed(GridPos::new(0, 0)),
        ];
        occupation_stage(&mut planets, &rules);
        assert_eq!((planets[0].occupation_progress, planets[0].ongoing_occupation), (96, -1));
        assert_eq!((planets[1].occupation_progress, planets[1].ongoing_occupation), (100, 0));
        assert_eq!(planets[2].occupation_progress, UNCLAIMED);
    }

    #[test]
    fn test_landing_rules() {
        let rules = GameRules::default();
        let center = GridPos::new(0, 0);

        let mut neutral = Planet::unclaimed(center);
        assert!(land(&mut neutral, PlayerId::Two, &rules));
        assert_eq!(neutral.occupation_progress, 100);

        let mut enemy = Planet::owned_by(center, PlayerId::Two);
        assert!(land(&mut enemy, PlayerId::One, &rules));
        assert_eq!((enemy.occupation_progress, enemy.ongoing_occupation), (98, -1));

        assert!(land(&mut enemy, PlayerId::Two, &rules));
        assert_eq!(enemy.ongoing_occupation, 0);

        let mut own = Planet::owned_by(center, PlayerId::One);
        assert!(!land(&mut own, PlayerId::One, &rules));
        assert_eq!(own, Planet::owned_by(center, PlayerId::One));
    }

    #[test]
    fn test_land_interaction_consumes_ship() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let mut planets = vec![
            Planet::owned_by(PLAYER_1_ORIGIN, PlayerId::One),
            Planet::owned_by(PLAYER_2_ORIGIN, PlayerId::Two),
            Planet::unclaimed(GridPos::new(50, 50)),
        ];
        let lander = players[1].ships.spawn(GridPos::new(51, 51), 100, Direction::Right);
        let home = players[0].ships.spawn(PLAYER_1_ORIGIN, 50, Direction::Right);

        let landings =
            land_interaction_stage(&board, &mut planets, &mut players, &rules, &mut effects);
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].ship, lander);
        assert!(players[1].ships.is_empty());
        assert_eq!(planets[2].occupation_progress, 100);

        // the ship on its own home stays and heals
        assert_eq!(players[0].ships.get(home).unwrap().hp, 52);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_healing_caps_and_skips_dead() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let mut planets: Vec<Planet> = Vec::new();
        let nearly = players[0].ships.spawn(GridPos::new(9, 12), 99, Direction::Right);
        let dead = players[0].ships.spawn(GridPos::new(9, 12), 0, Direction::Right);
        land_interaction_stage(&board, &mut planets, &mut players, &rules, &mut effects);
        assert_eq!(players[0].ships.get(nearly).unwrap().hp, 100);
        assert_eq!(players[0].ships.get(dead).unwrap().hp, 0);
    }

    #[test]
    fn test_ship_at_zero_hp_still_lands() {
        let (board, mut players, rules) = setup();
        let mut effects = EffectsLedger::new();
        let mut planets = vec![Planet::unclaimed(GridPos::new(50, 50))];
        let lander = players[0].ships.spawn(GridPos::new(50, 51), -2, Direction::Right);
        let landings =
            land_interaction_stage(&board, &mut planets, &mut players, &rules, &mut effects);
        assert_eq!(landings[0].ship, lander);
        assert!(players[0].ships.is_empty());
        assert_eq!(planets[0].occupation_progress, 0);
    }

    #[test]
    fn test_death_stage() {
        let (_, mut players, _) = setup();
        let mut effects = EffectsLedger::new();
        let id = players[1].ships.spawn(GridPos::new(3, 3), -5, Direction::Right);
        players[1].ships.spawn(GridPos::new(4, 4), 1, Direction::Right);
        effects.start_heal(PlayerId::Two, id);
        let deaths = death_stage(&mut players, &mut effects);
        assert_eq!(deaths, vec![(PlayerId::Two, id)]);
        assert_eq!(players[1].ships.len(), 1);
        assert!(!effects.is_healing(PlayerId::Two, id));
        assert!(matches!(
            effects.iter().next().unwrap().kind,
            EffectKind::Death { .. }
        ));
    }

    #[test]
    fn test_visibility_stage() {
        let (_, mut players, _) = setup();
        players[0].ships.spawn(GridPos::new(50, 50), 100, Direction::Right);
        visibility_stage(&mut players);
        assert_eq!(players[0].visibility.count(), SHIP_VISION.offsets().count());
        assert_eq!(players[1].visibility.count(), 0);
    }

    #[test]
    fn test_victory_both_sides() {
        let (mut board, _, _) = setup();
        assert!(!victory_check(&board).any());
        board.clear_ownership();
        let victory = victory_check(&board);
        assert!(victory.is_draw());
        assert!(victory.has_won(PlayerId::One));
    }
}
