//! The square tile grid.
//!
//! The board stores decoded [`Tile`]s in row-major order and only packs them
//! to bytes when serialized, so snapshots and observations share the
//! canonical one-byte-per-cell layout.

use serde::{Deserialize, Serialize};

use crate::config::{PLANETS_DIAMETER, RESOURCE_KINDS};
use crate::error::{GameError, Result};
use crate::math::GridPos;
use crate::player::PlayerId;
use crate::schemes::PlanetStencil;
use crate::tile::Tile;

/// Square grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PackedBoard", into = "PackedBoard")]
pub struct Board {
    size: i32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Board of the given side filled with empty space.
    #[must_use]
    pub fn new(size: i32) -> Self {
        Self {
            size,
            tiles: vec![Tile::SPACE; (size.max(0) * size.max(0)) as usize],
        }
    }

    /// Side length.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Tile at `pos`, if on the board.
    #[must_use]
    pub fn get(&self, pos: GridPos) -> Option<Tile> {
        pos.in_bounds(self.size)
            .then(|| self.tiles[self.index(pos)])
    }

    /// Tile at `pos`; off-board positions read as empty space.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Tile {
        self.get(pos).unwrap_or(Tile::SPACE)
    }

    /// Overwrite the tile at `pos`. Off-board writes are ignored.
    pub fn set(&mut self, pos: GridPos, tile: Tile) {
        if pos.in_bounds(self.size) {
            let index = self.index(pos);
            self.tiles[index] = tile;
        }
    }

    /// Row-major tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Every cell with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, Tile)> + '_ {
        let size = self.size;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &tile)| (GridPos::new(i as i32 % size, i as i32 / size), tile))
    }

    /// Canonical byte per cell, row-major.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.tiles.iter().map(|tile| tile.encode()).collect()
    }

    /// Rebuild a board from canonical bytes.
    pub fn decode(size: i32, bytes: &[u8]) -> Result<Self> {
        let expected = (size.max(0) * size.max(0)) as usize;
        if bytes.len() != expected {
            return Err(GameError::InvalidState(format!(
                "board of side {size} needs {expected} cells, got {}",
                bytes.len()
            )));
        }
        let tiles = bytes
            .iter()
            .map(|&byte| Tile::decode(byte))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { size, tiles })
    }

    /// Copy a planet stencil onto the board with its top-left corner at `corner`.
    ///
    /// Space cells of the stencil leave the board untouched.
    pub fn stamp_planet(&mut self, corner: GridPos, stencil: &PlanetStencil) {
        for (row, line) in stencil.iter().enumerate() {
            for (col, &tile) in line.iter().enumerate() {
                if tile.is_occupied() {
                    self.set(corner.offset(col as i32, row as i32), tile);
                }
            }
        }
    }

    /// Land cells of the planet footprint centred on `center`.
    pub fn footprint(&self, center: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        let half = PLANETS_DIAMETER / 2;
        (-half..=half)
            .flat_map(move |dy| (-half..=half).map(move |dx| center.offset(dx, dy)))
            .filter(|&pos| self.get(pos).is_some_and(Tile::is_land))
    }

    /// Resource fields per kind under the footprint centred on `center`.
    #[must_use]
    pub fn count_resource_fields(&self, center: GridPos) -> [i32; RESOURCE_KINDS] {
        let mut counts = [0; RESOURCE_KINDS];
        for pos in self.footprint(center) {
            if let Some(kind) = self.tile(pos).resource() {
                counts[kind.index()] += 1;
            }
        }
        counts
    }

    /// Give the footprint centred on `center` to `owner` alone.
    pub fn set_footprint_owner(&mut self, center: GridPos, owner: PlayerId) {
        let cells: Vec<GridPos> = self.footprint(center).collect();
        for pos in cells {
            let tile = self.tile(pos).unowned().with_owner(owner);
            self.set(pos, tile);
        }
    }

    /// Clear every ownership bit on the board.
    pub fn clear_ownership(&mut self) {
        for tile in &mut self.tiles {
            *tile = tile.unowned();
        }
    }

    fn index(&self, pos: GridPos) -> usize {
        (pos.y * self.size + pos.x) as usize
    }
}

#[derive(Serialize, Deserialize)]
struct PackedBoard {
    size: i32,
    cells: Vec<u8>,
}

impl From<Board> for PackedBoard {
    fn from(board: Board) -> Self {
        Self {
            size: board.size,
            cells: board.encode(),
        }
    }
}

impl TryFrom<PackedBoard> for Board {
    type Error = GameError;

    fn try_from(packed: PackedBoard) -> Result<Self> {
        Board::decode(packed.size, &packed.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemes::{starting_planet, EMPTY_PLANET};
    use crate::tile::ResourceKind;

    fn board_with_home() -> Board {
        let mut board = Board::new(30);
        board.stamp_planet(GridPos::new(5, 5), &starting_planet());
        board
    }

    #[test]
    fn test_new_board_is_space() {
        let board = Board::new(10);
        assert_eq!(board.tiles().len(), 100);
        assert!(board.tiles().iter().all(|&t| t == Tile::SPACE));
        assert_eq!(board.get(GridPos::new(10, 0)), None);
        assert_eq!(board.tile(GridPos::new(-1, 3)), Tile::SPACE);
    }

    #[test]
    fn test_stamp_uses_column_row_order() {
        let board = board_with_home();
        // first stencil row is land only in its middle three columns
        assert!(board.tile(GridPos::new(9, 5)).is_land());
        assert!(!board.tile(GridPos::new(5, 9 - 4)).is_land());
        // slot (row 1, col 4) holds kind 0
        assert_eq!(board.tile(GridPos::new(9, 6)).resource(), Some(ResourceKind::Gray));
        // slot (row 4, col 1) holds kind 1
        assert_eq!(board.tile(GridPos::new(6, 9)).resource(), Some(ResourceKind::Green));
    }

    #[test]
    fn test_footprint_covers_planet_land() {
        let board = board_with_home();
        let land = EMPTY_PLANET.iter().flatten().filter(|t| t.is_land()).count();
        assert_eq!(board.footprint(GridPos::new(9, 9)).count(), land);
        assert_eq!(board.count_resource_fields(GridPos::new(9, 9)), [4, 4, 4, 4]);
    }

    #[test]
    fn test_footprint_ownership() {
        let mut board = board_with_home();
        let center = GridPos::new(9, 9);
        board.set_footprint_owner(center, PlayerId::One);
        assert!(board.footprint(center).all(|p| board.tile(p).is_owned_by(PlayerId::One)));
        assert!(!board.tile(GridPos::new(5, 5)).is_owned_by(PlayerId::One));

        board.set_footprint_owner(center, PlayerId::Two);
        assert!(board.footprint(center).all(|p| board.tile(p).owner().sole_owner() == Some(PlayerId::Two)));

        board.clear_ownership();
        assert!(board.tiles().iter().all(|t| t.owner().is_empty()));
    }

    #[test]
    fn test_serde_packs_to_bytes() {
        let mut board = board_with_home();
        board.set_footprint_owner(GridPos::new(9, 9), PlayerId::Two);
        board.set(GridPos::new(20, 20), Tile::ASTEROID);
        let bytes = bincode::serialize(&board).unwrap();
        let restored: Board = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let mut bytes = Board::new(3).encode();
        bytes[4] = 33;
        assert!(matches!(Board::decode(3, &bytes), Err(GameError::CorruptTile(_))));
        assert!(matches!(Board::decode(3, &bytes[..5]), Err(GameError::InvalidState(_))));
    }
}
