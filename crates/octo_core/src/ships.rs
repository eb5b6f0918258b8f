//! Ships and per-player ship storage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::{Direction, GridPos};

/// Per-player ship identifier, allocated from 0 in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ShipId(pub u32);

impl std::fmt::Display for ShipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    /// Identifier within its owner's fleet.
    pub id: ShipId,
    /// Board cell, always on the board.
    pub position: GridPos,
    /// Hit points; the ship is removed once this drops to 0 or below.
    pub hp: i32,
    /// Ticks until the ship may fire again.
    pub firing_cooldown: i32,
    /// Ticks until the ship may move again.
    pub move_cooldown: i32,
    /// Current facing.
    pub facing: Direction,
}

impl Ship {
    /// Whether the ship still counts as alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Dense ship storage with stable ids.
///
/// Ships live in a slot vector in spawn order; removal leaves a tombstone
/// so lookups through the id map stay O(1). Tombstones are compacted away
/// once they outnumber live ships. Iteration is always in ascending id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ShipStoreRepr", into = "ShipStoreRepr")]
pub struct ShipStore {
    slots: Vec<Option<Ship>>,
    index: HashMap<ShipId, usize>,
    next_id: u32,
}

impl ShipStore {
    /// Create an empty store whose first ship gets id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a ship with a freshly allocated id.
    pub fn spawn(&mut self, position: GridPos, hp: i32, facing: Direction) -> ShipId {
        let id = ShipId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.slots.len());
        self.slots.push(Some(Ship {
            id,
            position,
            hp,
            firing_cooldown: 0,
            move_cooldown: 0,
            facing,
        }));
        id
    }

    /// Remove a ship by id.
    pub fn remove(&mut self, id: ShipId) -> Option<Ship> {
        let slot = self.index.remove(&id)?;
        let ship = self.slots.get_mut(slot)?.take();
        if self.slots.len() > 2 * self.index.len() + 8 {
            self.compact();
        }
        ship
    }

    /// Get a ship by id.
    #[must_use]
    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        let slot = *self.index.get(&id)?;
        self.slots.get(slot)?.as_ref()
    }

    /// Get a mutable ship by id.
    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        let slot = *self.index.get(&id)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Check if a ship exists.
    #[must_use]
    pub fn contains(&self, id: ShipId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of live ships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the fleet is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Id the next spawned ship will receive.
    #[must_use]
    pub const fn next_id(&self) -> ShipId {
        ShipId(self.next_id)
    }

    /// Live ships in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.slots.iter().flatten()
    }

    /// Mutable live ships in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        self.slots.iter_mut().flatten()
    }

    /// Snapshot of live ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ShipId> {
        self.iter().map(|ship| ship.id).collect()
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.index.clear();
        for (slot, ship) in self.slots.iter().flatten().enumerate() {
            self.index.insert(ship.id, slot);
        }
    }
}

impl PartialEq for ShipStore {
    fn eq(&self, other: &Self) -> bool {
        self.next_id == other.next_id && self.iter().eq(other.iter())
    }
}

#[derive(Serialize, Deserialize)]
struct ShipStoreRepr {
    next_id: u32,
    ships: Vec<Ship>,
}

impl From<ShipStore> for ShipStoreRepr {
    fn from(store: ShipStore) -> Self {
        Self {
            next_id: store.next_id,
            ships: store.slots.into_iter().flatten().collect(),
        }
    }
}

impl From<ShipStoreRepr> for ShipStore {
    fn from(repr: ShipStoreRepr) -> Self {
        let index = repr
            .ships
            .iter()
            .enumerate()
            .map(|(slot, ship)| (ship.id, slot))
            .collect();
        Self {
            slots: repr.ships.into_iter().map(Some).collect(),
            index,
            next_id: repr.next_id,
        }
    }
}
