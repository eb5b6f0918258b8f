//! Ship targeting and the firing stage.
//!
//! A ship fires straight ahead: the target is the nearest living enemy inside
//! a 15 degree cone around the fire direction and within
//! `max_ship_fire_range` cells. Shots never miss an eligible target, and a
//! shot with no eligible target still costs the full cooldown.

use std::collections::HashSet;

use crate::actions::{Actions, ShipActionKind};
use crate::config::GameRules;
use crate::effects::{EffectKind, EffectsLedger};
use crate::math::{within_firing_cone, Direction, GridPos};
use crate::player::{PlayerId, PlayerState};
use crate::ships::{Ship, ShipId};

/// Outcome of a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shot {
    /// Side that fired.
    pub player: PlayerId,
    /// Ship that fired.
    pub shooter: ShipId,
    /// Enemy ship that was hit, if any.
    pub target: Option<ShipId>,
    /// Hit points the target has left.
    pub target_hp: Option<i32>,
}

/// Pick the enemy a ship at `shooter` facing `direction` would hit.
///
/// Enemies are scanned in the given order; on equal distance the first one
/// wins. An enemy on the shooter's own cell is always eligible.
#[must_use]
pub fn select_target<'a, I>(shooter: GridPos, direction: Direction, range: i32, enemies: I) -> Option<ShipId>
where
    I: IntoIterator<Item = &'a Ship>,
{
    let (ux, uy) = direction.vector();
    let reference = (ux * range, uy * range);
    let max_distance_sq = i64::from(range + 1).pow(2);

    let mut best: Option<(i64, ShipId)> = None;
    for enemy in enemies.into_iter().filter(|ship| ship.is_alive()) {
        let offset = (enemy.position.x - shooter.x, enemy.position.y - shooter.y);
        let distance_sq = shooter.distance_squared(enemy.position);
        if distance_sq >= max_distance_sq || !within_firing_cone(offset, reference) {
            continue;
        }
        if best.map_or(true, |(closest, _)| distance_sq < closest) {
            best = Some((distance_sq, enemy.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Split the two player states into (acting player, opponent).
pub(crate) fn own_and_enemy(
    players: &mut [PlayerState; 2],
    player: PlayerId,
) -> (&mut PlayerState, &mut PlayerState) {
    let [one, two] = players;
    match player {
        PlayerId::One => (one, two),
        PlayerId::Two => (two, one),
    }
}

/// Resolve every fire action, player 1 first.
///
/// Only the first fire action per ship counts. Ships that are cooling down or
/// unknown are skipped. Hit ships stay on the board until the death stage and
/// may still return fire this tick.
pub fn firing_stage(
    players: &mut [PlayerState; 2],
    actions: &Actions,
    rules: &GameRules,
    effects: &mut EffectsLedger,
) -> Vec<Shot> {
    let mut shots = Vec::new();

    for player in PlayerId::ALL {
        let (own, enemy) = own_and_enemy(players, player);
        let mut fired = HashSet::new();

        for action in &actions.get(player).ships_actions {
            let ShipActionKind::Fire { direction } = action.kind else {
                continue;
            };
            if !fired.insert(action.ship_id) {
                continue;
            }
            let Some(ship) = own.ships.get_mut(action.ship_id) else {
                continue;
            };
            if ship.firing_cooldown > 0 {
                continue;
            }

            ship.facing = direction;
            ship.firing_cooldown = rules.firing_cooldown;
            effects.push(EffectKind::Fire {
                origin: ship.position,
                direction,
            });

            let target = select_target(
                ship.position,
                direction,
                rules.max_ship_fire_range,
                enemy.ships.iter(),
            );
            let target_hp = target.and_then(|id| enemy.ships.get_mut(id)).map(|victim| {
                victim.hp -= rules.ship_damage;
                victim.hp
            });
            if let (Some(target), Some(hp)) = (target, target_hp) {
                tracing::trace!(%player, shooter = %ship.id, %target, hp, "Ship hit");
            }

            shots.push(Shot {
                player,
                shooter: ship.id,
                target,
                target_hp,
            });
        }
    }

    shots
}
