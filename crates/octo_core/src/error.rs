//! Error types for the game simulation.

use thiserror::Error;

use crate::map_generation::MapFeature;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Map generation ran out of placement attempts.
    #[error("No space on map for {feature} after {attempts} attempts")]
    NoSpaceOnMap {
        /// What was being placed.
        feature: MapFeature,
        /// Number of consecutive failed attempts.
        attempts: u32,
    },

    /// A tile byte did not decode to a valid tile.
    #[error(transparent)]
    CorruptTile(#[from] TileError),

    /// Configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        /// Path to the file that failed to load.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Configuration data could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Snapshot or replay (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Replay verification produced a different final state.
    #[error("Replay desync at tick {tick}: recorded hash {recorded}, replayed hash {replayed}")]
    ReplayDesync {
        /// Final tick of the replay.
        tick: u32,
        /// Hash stored in the replay.
        recorded: u64,
        /// Hash produced by re-simulation.
        replayed: u64,
    },
}

/// Tile codec failure. Always indicates corrupted board data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileError {
    /// Land tile whose resource bits are not in the coding table.
    #[error("unknown resource field coding {coding:#04x} in tile {byte:#04x}")]
    UnknownResourceCoding {
        /// The full tile byte.
        byte: u8,
        /// The masked resource bits.
        coding: u8,
    },

    /// Space tile carrying resource bits.
    #[error("space tile {0:#04x} carries resource field bits")]
    ResourceOnSpace(u8),

    /// Tile with both the slow and the ionized modifier.
    #[error("tile {0:#04x} is both slowed and ionized")]
    ConflictingModifiers(u8),
}
