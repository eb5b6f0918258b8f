//! Tile codec.
//!
//! Each board cell packs into one byte:
//!
//! ```text
//! xxxxxxx0 - space
//! xxx000x1 - land
//! xxxxxx1x - slow modifier (rough land, or an asteroid field on space)
//! xxxxx1xx - ionized field
//! xx001xx1 - resource field 0
//! xx010xx1 - resource field 1
//! xx011xx1 - resource field 2
//! xx111xx1 - resource field 3
//! x1xxxxxx - owned by player 1
//! 1xxxxxxx - owned by player 2
//! ```
//!
//! The board keeps decoded [`Tile`] values; bytes only appear at
//! serialization and observation boundaries.

use serde::{Deserialize, Serialize};

use crate::error::TileError;
use crate::player::PlayerId;

const LAND_BIT: u8 = 0b0000_0001;
const SLOW_BIT: u8 = 0b0000_0010;
const IONIZED_BIT: u8 = 0b0000_0100;
const RESOURCE_MASK: u8 = 0b0011_1001;
const RESOURCE_BITS: u8 = 0b0011_1000;
const OWNER_SHIFT: u8 = 6;
const PLAYER_1_BIT: u8 = 0b0100_0000;
const PLAYER_2_BIT: u8 = 0b1000_0000;

/// Land without a resource field, as seen through [`RESOURCE_MASK`].
const PLAIN_LAND_CODING: u8 = 1;

/// One of the four resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceKind {
    /// Resource type 0.
    Gray = 0,
    /// Resource type 1.
    Green = 1,
    /// Resource type 2.
    Brown = 2,
    /// Resource type 3.
    Blue = 3,
}

impl ResourceKind {
    /// All kinds in id order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Gray,
        ResourceKind::Green,
        ResourceKind::Brown,
        ResourceKind::Blue,
    ];

    /// Resource field id (index into resource vectors).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Kind for a resource field id.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ResourceKind::Gray),
            1 => Some(ResourceKind::Green),
            2 => Some(ResourceKind::Brown),
            3 => Some(ResourceKind::Blue),
            _ => None,
        }
    }

    /// Byte coding of this resource field (land bit included).
    #[must_use]
    pub const fn coding(self) -> u8 {
        match self {
            ResourceKind::Gray => 9,
            ResourceKind::Green => 17,
            ResourceKind::Brown => 25,
            ResourceKind::Blue => 57,
        }
    }

    /// Inverse of [`coding`](Self::coding).
    #[must_use]
    pub const fn from_coding(coding: u8) -> Option<Self> {
        match coding {
            9 => Some(ResourceKind::Gray),
            17 => Some(ResourceKind::Green),
            25 => Some(ResourceKind::Brown),
            57 => Some(ResourceKind::Blue),
            _ => None,
        }
    }
}

/// Base terrain of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Open space.
    #[default]
    Space,
    /// Planet surface.
    Land,
}

/// Movement modifier of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modifier {
    /// No modifier.
    #[default]
    None,
    /// Rough land, or an asteroid field when on space.
    Slow,
    /// Ionized field (speed boost).
    Ionized,
}

/// The two ownership bits of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OwnerBits(u8);

impl OwnerBits {
    /// No owner.
    pub const NONE: Self = Self(0);

    /// Build from the raw two-bit value (`0..=3`).
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & 0b11)
    }

    /// Owned by exactly one player.
    #[must_use]
    pub const fn player(player: PlayerId) -> Self {
        Self(player.owner_bit())
    }

    /// Raw two-bit value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Whether the bit of `player` is set.
    #[must_use]
    pub const fn contains(self, player: PlayerId) -> bool {
        self.0 & player.owner_bit() != 0
    }

    /// Whether no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Single owner, if exactly one bit is set.
    #[must_use]
    pub const fn sole_owner(self) -> Option<PlayerId> {
        match self.0 {
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        }
    }
}

/// Decoded view of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tile {
    terrain: Terrain,
    modifier: Modifier,
    resource: Option<ResourceKind>,
    owner: OwnerBits,
}

impl Tile {
    /// Empty space.
    pub const SPACE: Self = Self {
        terrain: Terrain::Space,
        modifier: Modifier::None,
        resource: None,
        owner: OwnerBits::NONE,
    };

    /// Plain land.
    pub const LAND: Self = Self {
        terrain: Terrain::Land,
        modifier: Modifier::None,
        resource: None,
        owner: OwnerBits::NONE,
    };

    /// Rough land.
    pub const ROUGH_LAND: Self = Self {
        terrain: Terrain::Land,
        modifier: Modifier::Slow,
        resource: None,
        owner: OwnerBits::NONE,
    };

    /// Asteroid field.
    pub const ASTEROID: Self = Self {
        terrain: Terrain::Space,
        modifier: Modifier::Slow,
        resource: None,
        owner: OwnerBits::NONE,
    };

    /// Ionized field.
    pub const IONIZED: Self = Self {
        terrain: Terrain::Space,
        modifier: Modifier::Ionized,
        resource: None,
        owner: OwnerBits::NONE,
    };

    /// Build a tile from its parts.
    ///
    /// Resource fields only exist on land.
    pub fn try_new(
        terrain: Terrain,
        modifier: Modifier,
        resource: Option<ResourceKind>,
        owner: OwnerBits,
    ) -> Result<Self, TileError> {
        let tile = Self {
            terrain,
            modifier,
            resource,
            owner,
        };
        if terrain == Terrain::Space && resource.is_some() {
            return Err(TileError::ResourceOnSpace(tile.encode()));
        }
        Ok(tile)
    }

    /// Plain land carrying a resource field.
    #[must_use]
    pub const fn resource_field(kind: ResourceKind) -> Self {
        Self {
            terrain: Terrain::Land,
            modifier: Modifier::None,
            resource: Some(kind),
            owner: OwnerBits::NONE,
        }
    }

    /// Decode a tile byte.
    pub fn decode(byte: u8) -> Result<Self, TileError> {
        let slow = byte & SLOW_BIT != 0;
        let ionized = byte & IONIZED_BIT != 0;
        let modifier = match (slow, ionized) {
            (false, false) => Modifier::None,
            (true, false) => Modifier::Slow,
            (false, true) => Modifier::Ionized,
            (true, true) => return Err(TileError::ConflictingModifiers(byte)),
        };

        let (terrain, resource) = if byte & LAND_BIT != 0 {
            let coding = byte & RESOURCE_MASK;
            let resource = if coding == PLAIN_LAND_CODING {
                None
            } else {
                Some(
                    ResourceKind::from_coding(coding)
                        .ok_or(TileError::UnknownResourceCoding { byte, coding })?,
                )
            };
            (Terrain::Land, resource)
        } else {
            if byte & RESOURCE_BITS != 0 {
                return Err(TileError::ResourceOnSpace(byte));
            }
            (Terrain::Space, None)
        };

        Ok(Self {
            terrain,
            modifier,
            resource,
            owner: OwnerBits::from_raw(byte >> OWNER_SHIFT),
        })
    }

    /// Pack into the canonical byte.
    #[must_use]
    pub const fn encode(self) -> u8 {
        let mut byte = match self.terrain {
            Terrain::Space => 0,
            Terrain::Land => LAND_BIT,
        };
        byte |= match self.modifier {
            Modifier::None => 0,
            Modifier::Slow => SLOW_BIT,
            Modifier::Ionized => IONIZED_BIT,
        };
        if let Some(kind) = self.resource {
            byte |= kind.coding();
        }
        byte | (self.owner.raw() << OWNER_SHIFT)
    }

    /// Base terrain.
    #[must_use]
    pub const fn terrain(self) -> Terrain {
        self.terrain
    }

    /// Movement modifier.
    #[must_use]
    pub const fn modifier(self) -> Modifier {
        self.modifier
    }

    /// Resource field on this cell.
    #[must_use]
    pub const fn resource(self) -> Option<ResourceKind> {
        self.resource
    }

    /// Ownership bits.
    #[must_use]
    pub const fn owner(self) -> OwnerBits {
        self.owner
    }

    /// Whether the cell is land.
    #[must_use]
    pub const fn is_land(self) -> bool {
        matches!(self.terrain, Terrain::Land)
    }

    /// Whether the cell is an asteroid field.
    #[must_use]
    pub const fn is_asteroid(self) -> bool {
        matches!(self.terrain, Terrain::Space) && matches!(self.modifier, Modifier::Slow)
    }

    /// Whether the cell is an ionized field.
    #[must_use]
    pub const fn is_ionized(self) -> bool {
        matches!(self.modifier, Modifier::Ionized)
    }

    /// Whether the cell holds anything besides empty space (ownership ignored).
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !(matches!(self.terrain, Terrain::Space) && matches!(self.modifier, Modifier::None))
    }

    /// Whether `player` owns this cell.
    #[must_use]
    pub const fn is_owned_by(self, player: PlayerId) -> bool {
        self.owner.contains(player)
    }

    /// Copy with the ownership bit of `player` set.
    #[must_use]
    pub const fn with_owner(mut self, player: PlayerId) -> Self {
        self.owner = OwnerBits::from_raw(self.owner.raw() | player.owner_bit());
        self
    }

    /// Copy with the ownership bit of `player` cleared.
    #[must_use]
    pub const fn without_owner(mut self, player: PlayerId) -> Self {
        self.owner = OwnerBits::from_raw(self.owner.raw() & !player.owner_bit());
        self
    }

    /// Copy with both ownership bits cleared.
    #[must_use]
    pub const fn unowned(mut self) -> Self {
        self.owner = OwnerBits::NONE;
        self
    }
}

/// Whether the byte is land.
#[must_use]
pub const fn is_land(byte: u8) -> bool {
    byte & LAND_BIT != 0
}

/// Whether the byte is an asteroid field.
#[must_use]
pub const fn is_asteroid(byte: u8) -> bool {
    byte & (LAND_BIT | SLOW_BIT) == SLOW_BIT
}

/// Whether the byte is an ionized field.
#[must_use]
pub const fn is_ionized(byte: u8) -> bool {
    byte & IONIZED_BIT != 0
}

/// The two ownership bits of the byte.
#[must_use]
pub const fn owner_bits(byte: u8) -> OwnerBits {
    OwnerBits::from_raw(byte >> OWNER_SHIFT)
}

/// Resource field carried by the byte.
///
/// `Ok(None)` for space and plain land, an error for an unknown coding.
pub fn resource_field_id(byte: u8) -> Result<Option<ResourceKind>, TileError> {
    Tile::decode(byte).map(Tile::resource)
}

// Ownership bit values must line up with PlayerId::owner_bit.
const _: () = assert!(PLAYER_1_BIT >> OWNER_SHIFT == PlayerId::One.owner_bit());
const _: () = assert!(PLAYER_2_BIT >> OWNER_SHIFT == PlayerId::Two.owner_bit());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_values() {
        assert_eq!(Tile::SPACE.encode(), 0);
        assert_eq!(Tile::LAND.encode(), 1);
        assert_eq!(Tile::ASTEROID.encode(), 2);
        assert_eq!(Tile::ROUGH_LAND.encode(), 3);
        assert_eq!(Tile::IONIZED.encode(), 4);
        assert_eq!(Tile::resource_field(ResourceKind::Green).encode(), 17);
        assert_eq!(Tile::LAND.with_owner(PlayerId::One).encode(), 65);
        assert_eq!(Tile::LAND.with_owner(PlayerId::Two).encode(), 129);
    }

    #[test]
    fn test_coding_table() {
        let codes: Vec<u8> = ResourceKind::ALL.iter().map(|k| k.coding()).collect();
        assert_eq!(codes, vec![9, 17, 25, 57]);
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_coding(kind.coding()), Some(kind));
            assert_eq!(ResourceKind::from_index(kind.index()), Some(kind));
        }
    }

    #[test]
    fn test_roundtrip_every_valid_combination() {
        let terrains = [Terrain::Space, Terrain::Land];
        let modifiers = [Modifier::None, Modifier::Slow, Modifier::Ionized];
        let resources = [
            None,
            Some(ResourceKind::Gray),
            Some(ResourceKind::Green),
            Some(ResourceKind::Brown),
            Some(ResourceKind::Blue),
        ];
        let mut checked = 0;
        for terrain in terrains {
            for modifier in modifiers {
                for resource in resources {
                    for raw_owner in 0..4 {
                        let owner = OwnerBits::from_raw(raw_owner);
                        let Ok(tile) = Tile::try_new(terrain, modifier, resource, owner) else {
                            assert!(terrain == Terrain::Space && resource.is_some());
                            continue;
                        };
                        let decoded = Tile::decode(tile.encode()).unwrap();
                        assert_eq!(
                            (decoded.terrain(), decoded.modifier(), decoded.resource(), decoded.owner()),
                            (terrain, modifier, resource, owner)
                        );
                        checked += 1;
                    }
                }
            }
        }
        // 3 space modifiers * 4 owners + 3 land modifiers * 5 resources * 4 owners
        assert_eq!(checked, 12 + 60);
    }

    #[test]
    fn test_every_decodable_byte_reencodes() {
        let mut valid = 0;
        for byte in 0..=u8::MAX {
            if let Ok(tile) = Tile::decode(byte) {
                assert_eq!(tile.encode(), byte);
                valid += 1;
            }
        }
        assert_eq!(valid, 72);
    }

    #[test]
    fn test_unknown_resource_coding() {
        // 33 = 0b0010_0001: land with resource bits 100, not in the table
        let err = Tile::decode(33).unwrap_err();
        assert_eq!(err, TileError::UnknownResourceCoding { byte: 33, coding: 33 });
        assert!(resource_field_id(33).is_err());
    }

    #[test]
    fn test_resource_on_space_rejected() {
        assert_eq!(Tile::decode(8), Err(TileError::ResourceOnSpace(8)));
        assert!(Tile::try_new(
            Terrain::Space,
            Modifier::None,
            Some(ResourceKind::Gray),
            OwnerBits::NONE
        )
        .is_err());
    }

    #[test]
    fn test_conflicting_modifiers() {
        assert_eq!(Tile::decode(6), Err(TileError::ConflictingModifiers(6)));
    }

    #[test]
    fn test_byte_predicates() {
        assert!(is_land(1) && is_land(57 | 64));
        assert!(is_asteroid(2) && !is_asteroid(3));
        assert!(is_ionized(4));
        assert_eq!(owner_bits(129 | 64).raw(), 3);
        assert_eq!(resource_field_id(25 | 128), Ok(Some(ResourceKind::Brown)));
        assert_eq!(resource_field_id(1), Ok(None));
    }

    #[test]
    fn test_ownership_helpers() {
        let tile = Tile::LAND.with_owner(PlayerId::One);
        assert!(tile.is_owned_by(PlayerId::One));
        assert!(!tile.is_owned_by(PlayerId::Two));
        assert_eq!(tile.owner().sole_owner(), Some(PlayerId::One));

        let both = tile.with_owner(PlayerId::Two);
        assert_eq!(both.owner().sole_owner(), None);
        assert_eq!(both.without_owner(PlayerId::One).owner().sole_owner(), Some(PlayerId::Two));
        assert!(both.unowned().owner().is_empty());
    }
}
