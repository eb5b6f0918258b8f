//! Procedural map generation.
//!
//! Builds a fresh board from a seed:
//! - two home planets in opposite corners, pre-owned by their players
//! - `n_planets` neutral planets, each with 16 resource fields of 4 kinds
//! - asteroid fields drawn from a fixed shape catalog
//! - single-cell ionized fields
//!
//! All randomness comes from a [`ChaCha8Rng`] seeded with
//! [`MapConfig::seed`], so a seed always yields the same board.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::{
    BOARD_SIZE, PLANETS_DIAMETER, PLANETS_OFFSET, PLAYER_1_ORIGIN, PLAYER_2_ORIGIN,
};
use crate::error::{GameError, Result};
use crate::math::GridPos;
use crate::player::PlayerId;
use crate::schemes::{
    max_asteroid_area, planet_with_fields, starting_planet, AsteroidShape, ASTEROID_SHAPES,
    RESOURCE_FIELDS_PER_PLANET,
};
use crate::tile::Tile;

/// Consecutive failed placements before a planet is given up on.
pub const MAX_PLANET_ATTEMPTS: u32 = 1000;

/// Consecutive failed placements before an asteroid field is given up on.
pub const MAX_ASTEROID_ATTEMPTS: u32 = 1000;

/// Consecutive failed placements before an ionized field is given up on.
pub const MAX_IONIZED_ATTEMPTS: u32 = 10_000;

/// Map configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Neutral planets besides the two homes.
    pub n_planets: usize,
    /// Share of the board covered by asteroid fields.
    pub asteroid_fraction: f64,
    /// Share of the board covered by ionized fields.
    pub ionized_fraction: f64,
    /// Planet centres must be farther apart than this.
    pub planets_distance: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            n_planets: 7,
            asteroid_fraction: 0.2,
            ionized_fraction: 0.003,
            planets_distance: 20,
        }
    }
}

impl MapConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of neutral planets.
    #[must_use]
    pub const fn with_planets(mut self, n_planets: usize) -> Self {
        self.n_planets = n_planets;
        self
    }

    /// Set the asteroid coverage.
    #[must_use]
    pub fn with_asteroid_fraction(mut self, fraction: f64) -> Self {
        self.asteroid_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the ionized field coverage.
    #[must_use]
    pub fn with_ionized_fraction(mut self, fraction: f64) -> Self {
        self.ionized_fraction = fraction.clamp(0.0, 1.0);
        self
    }
}

/// What map generation was trying to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapFeature {
    /// A neutral planet.
    Planet,
    /// An asteroid field.
    AsteroidField,
    /// An ionized field.
    IonizedField,
}

impl std::fmt::Display for MapFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapFeature::Planet => write!(f, "planet"),
            MapFeature::AsteroidField => write!(f, "asteroid field"),
            MapFeature::IonizedField => write!(f, "ionized field"),
        }
    }
}

/// Generated map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// Configuration used.
    pub config: MapConfig,
    /// Finished board with the home planets owned.
    pub board: Board,
    /// Planet centres; the homes of player 1 and player 2 come first.
    pub planet_centers: Vec<GridPos>,
}

impl GeneratedMap {
    /// Drop all ownership and give each home planet back to its player.
    ///
    /// Used to replay the same layout with the sides swapped.
    pub fn reset_ownership(&mut self) {
        self.board.clear_ownership();
        self.board.set_footprint_owner(PLAYER_1_ORIGIN, PlayerId::One);
        self.board.set_footprint_owner(PLAYER_2_ORIGIN, PlayerId::Two);
    }
}

/// Top-left corner of the 9x9 stencil centred on `center`.
#[must_use]
pub const fn planet_corner(center: GridPos) -> GridPos {
    center.offset(-(PLANETS_DIAMETER / 2), -(PLANETS_DIAMETER / 2))
}

/// Generate a map with the given configuration.
///
/// # Errors
///
/// [`GameError::NoSpaceOnMap`] when a planet, asteroid field or ionized
/// field cannot be placed within its attempt budget.
pub fn generate_map(config: &MapConfig) -> Result<GeneratedMap> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut board = Board::new(BOARD_SIZE);

    let home = starting_planet();
    for (player, origin) in [(PlayerId::One, PLAYER_1_ORIGIN), (PlayerId::Two, PLAYER_2_ORIGIN)] {
        board.stamp_planet(planet_corner(origin), &home);
        board.set_footprint_owner(origin, player);
    }

    let mut planet_centers = vec![PLAYER_1_ORIGIN, PLAYER_2_ORIGIN];
    place_planets(config, &mut rng, &mut board, &mut planet_centers)?;
    place_asteroid_fields(config, &mut rng, &mut board)?;
    place_ionized_fields(config, &mut rng, &mut board)?;

    tracing::debug!(
        seed = config.seed,
        planets = planet_centers.len(),
        "Map generated"
    );

    Ok(GeneratedMap {
        config: config.clone(),
        board,
        planet_centers,
    })
}

fn place_planets(
    config: &MapConfig,
    rng: &mut ChaCha8Rng,
    board: &mut Board,
    centers: &mut Vec<GridPos>,
) -> Result<()> {
    let min_distance_sq = i64::from(config.planets_distance).pow(2);
    for _ in 0..config.n_planets {
        let mut attempts = 0;
        let center = loop {
            if attempts >= MAX_PLANET_ATTEMPTS {
                return Err(GameError::NoSpaceOnMap {
                    feature: MapFeature::Planet,
                    attempts,
                });
            }
            attempts += 1;
            let candidate = GridPos::new(
                rng.gen_range(PLANETS_OFFSET..BOARD_SIZE - PLANETS_OFFSET),
                rng.gen_range(PLANETS_OFFSET..BOARD_SIZE - PLANETS_OFFSET),
            );
            if centers
                .iter()
                .all(|placed| placed.distance_squared(candidate) > min_distance_sq)
            {
                break candidate;
            }
        };
        if attempts > 1 {
            tracing::debug!(x = center.x, y = center.y, attempts, "Planet placed after retries");
        }

        board.stamp_planet(planet_corner(center), &planet_with_fields(split_resource_fields(rng)));
        centers.push(center);
    }
    Ok(())
}

/// Split the 16 field slots over the four kinds, each kind at least once.
fn split_resource_fields(rng: &mut ChaCha8Rng) -> [usize; 4] {
    let mut counts = [0; 4];
    let mut left = RESOURCE_FIELDS_PER_PLANET;
    for (i, count) in counts.iter_mut().enumerate().take(3) {
        *count = rng.gen_range(1..left - (3 - i));
        left -= *count;
    }
    counts[3] = left;
    counts
}

fn place_asteroid_fields(config: &MapConfig, rng: &mut ChaCha8Rng, board: &mut Board) -> Result<()> {
    let largest = max_asteroid_area();
    let mut area_left = coverage(config.asteroid_fraction);
    let mut placed = 0usize;

    while area_left >= largest {
        let Some(shape) = ASTEROID_SHAPES.choose(rng) else {
            return Ok(());
        };
        place_asteroid_field(shape, rng, board)?;
        area_left -= shape.area();
        placed += 1;
    }

    tracing::debug!(fields = placed, "Asteroid fields placed");
    Ok(())
}

/// Stamp one field of `shape`, retrying only its corner until it fits.
fn place_asteroid_field(
    shape: &AsteroidShape,
    rng: &mut ChaCha8Rng,
    board: &mut Board,
) -> Result<GridPos> {
    for _ in 0..MAX_ASTEROID_ATTEMPTS {
        let corner = GridPos::new(
            rng.gen_range(0..BOARD_SIZE - shape.width()),
            rng.gen_range(0..BOARD_SIZE - shape.height()),
        );
        let blocked = shape
            .cells()
            .any(|(dx, dy)| board.tile(corner.offset(dx, dy)).is_occupied());
        if blocked {
            continue;
        }
        for (dx, dy) in shape.cells() {
            board.set(corner.offset(dx, dy), Tile::ASTEROID);
        }
        return Ok(corner);
    }
    Err(GameError::NoSpaceOnMap {
        feature: MapFeature::AsteroidField,
        attempts: MAX_ASTEROID_ATTEMPTS,
    })
}

fn place_ionized_fields(config: &MapConfig, rng: &mut ChaCha8Rng, board: &mut Board) -> Result<()> {
    let mut attempts = 0;
    for _ in 0..coverage(config.ionized_fraction) {
        loop {
            if attempts >= MAX_IONIZED_ATTEMPTS {
                return Err(GameError::NoSpaceOnMap {
                    feature: MapFeature::IonizedField,
                    attempts,
                });
            }
            attempts += 1;
            let pos = GridPos::new(rng.gen_range(0..BOARD_SIZE), rng.gen_range(0..BOARD_SIZE));
            if board.tile(pos) == Tile::SPACE {
                board.set(pos, Tile::IONIZED);
                attempts = 0;
                break;
            }
        }
    }
    Ok(())
}

/// Number of cells covering `fraction` of the board, rounded down.
fn coverage(fraction: f64) -> usize {
    let cells = f64::from(BOARD_SIZE * BOARD_SIZE) * fraction;
    cells.floor().max(0.0) as usize
}
