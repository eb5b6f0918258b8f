//! Transient visual effects.
//!
//! The simulation appends effects while it runs a tick and ages them once at
//! the start of the next one. Nothing in the simulation reads them back; they
//! exist for renderers and sound players.

use serde::{Deserialize, Serialize};

use crate::math::{Direction, GridPos};
use crate::player::PlayerId;
use crate::ships::ShipId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// A ship was destroyed at `position`.
    Death {
        /// Where the ship died.
        position: GridPos,
    },
    /// A ship is repairing on its own territory.
    Heal {
        /// Owner of the ship.
        player: PlayerId,
        /// The healing ship.
        ship: ShipId,
    },
    /// A ship fired.
    Fire {
        /// Shooter position.
        origin: GridPos,
        /// Fire direction.
        direction: Direction,
    },
    /// A planet changed hands.
    Capture {
        /// Planet centre.
        center: GridPos,
        /// New owner.
        player: PlayerId,
    },
    /// A ship moved faster than base speed.
    SpaceJump {
        /// Where the jump started.
        origin: GridPos,
        /// Jump direction.
        direction: Direction,
    },
}

impl EffectKind {
    /// Frame at which the effect expires; `None` for looping effects.
    #[must_use]
    pub const fn terminal_frame(&self) -> Option<u32> {
        match self {
            EffectKind::Death { .. } => Some(15),
            EffectKind::Heal { .. } => None,
            EffectKind::Fire { .. } => Some(5),
            EffectKind::Capture { .. } => Some(12),
            EffectKind::SpaceJump { .. } => Some(9),
        }
    }
}

/// Frame count after which a looping heal effect restarts.
pub const HEAL_LOOP_FRAMES: u32 = 15;

/// An effect and its animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    /// What happened.
    pub kind: EffectKind,
    /// Frames elapsed since the effect started.
    pub frame: u32,
}

/// Ordered queue of live effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectsLedger {
    effects: Vec<Effect>,
}

impl EffectsLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new effect at frame 0.
    pub fn push(&mut self, kind: EffectKind) {
        self.effects.push(Effect { kind, frame: 0 });
    }

    /// Age every effect by one frame, dropping finished ones and looping heals.
    pub fn advance(&mut self) {
        self.effects.retain_mut(|effect| {
            effect.frame += 1;
            match effect.kind.terminal_frame() {
                Some(terminal) => effect.frame < terminal,
                None => {
                    if effect.frame >= HEAL_LOOP_FRAMES {
                        effect.frame = 0;
                    }
                    true
                }
            }
        });
    }

    /// Start a heal effect for a ship unless one is already running.
    pub fn start_heal(&mut self, player: PlayerId, ship: ShipId) {
        if !self.is_healing(player, ship) {
            self.push(EffectKind::Heal { player, ship });
        }
    }

    /// Stop the heal effect of a ship, if any.
    pub fn stop_heal(&mut self, player: PlayerId, ship: ShipId) {
        let heal = EffectKind::Heal { player, ship };
        self.effects.retain(|effect| effect.kind != heal);
    }

    /// Whether a heal effect is running for the ship.
    #[must_use]
    pub fn is_healing(&self, player: PlayerId, ship: ShipId) -> bool {
        let heal = EffectKind::Heal { player, ship };
        self.effects.iter().any(|effect| effect.kind == heal)
    }

    /// Live effects, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
