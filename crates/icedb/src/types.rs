//! Shared value types for the chip database.
//!
//! This module defines the tile and cell kinds, physical [`Location`]s, and
//! the records describing non-grid-regular cells and named global bits.

use crate::ids::TileId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The type of a tile in the fabric grid.
///
/// The tile type selects the layout of the tile's nonrouting configuration
/// fields and the size of its configuration-bit block.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TileType {
    /// A grid position with no programmable resources (corners).
    #[default]
    NoTile,
    /// An IO tile on the die edge.
    Io,
    /// A logic tile holding eight LUT/FF pairs.
    Logic,
    /// The bottom half of a block RAM.
    RamB,
    /// The top half of a block RAM.
    RamT,
}

impl TileType {
    /// All tile types in declaration order.
    pub const ALL: [TileType; 5] = [
        TileType::NoTile,
        TileType::Io,
        TileType::Logic,
        TileType::RamB,
        TileType::RamT,
    ];

    /// Returns the chipdb keyword for this tile type (e.g. `"logic_tile"`).
    pub fn name(self) -> &'static str {
        match self {
            TileType::NoTile => "no_tile",
            TileType::Io => "io_tile",
            TileType::Logic => "logic_tile",
            TileType::RamB => "ramb_tile",
            TileType::RamT => "ramt_tile",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of a placeable functional primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// A LUT/FF pair in a logic tile.
    Logic,
    /// An IO pad cell.
    Io,
    /// A global buffer driving one global net.
    Gb,
    /// A block RAM.
    Ram,
    /// The warm-boot controller.
    Warmboot,
    /// A phase-locked loop.
    Pll,
}

impl CellType {
    /// Number of cell kinds.
    pub const COUNT: usize = 6;

    /// All cell kinds in index order.
    pub const ALL: [CellType; Self::COUNT] = [
        CellType::Logic,
        CellType::Io,
        CellType::Gb,
        CellType::Ram,
        CellType::Warmboot,
        CellType::Pll,
    ];

    /// Returns the dense index of this cell kind, `0..COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns a short lowercase name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            CellType::Logic => "logic",
            CellType::Io => "io",
            CellType::Gb => "gb",
            CellType::Ram => "ram",
            CellType::Warmboot => "warmboot",
            CellType::Pll => "pll",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A physical site: a tile plus a sub-position within it.
///
/// Ordering is lexicographic on `(tile, pos)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The tile containing the site.
    pub tile: TileId,
    /// The sub-position within the tile (LUT index, IO pad index, ...).
    pub pos: u32,
}

impl Location {
    /// Creates a location at `pos` within `tile`.
    pub fn new(tile: TileId, pos: u32) -> Self {
        Self { tile, pos }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tile, self.pos)
    }
}

/// A named global configuration bit outside any tile's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtraBit {
    /// Configuration bank holding the bit.
    pub bank: u32,
    /// Column address within the bank.
    pub x: u32,
    /// Row address within the bank.
    pub y: u32,
}

/// One configuration field of an extra cell: a group index and an encoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// The group (usually a tile or bank index) the field lives in.
    pub group: u32,
    /// The encoded value or bit name within the group.
    pub value: String,
}

/// A non-grid-regular fixed-function cell (PLL, oscillator, warm boot).
///
/// These cells are configured through named fields rather than row/col
/// geometry, so they carry their own field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraCell {
    /// The tile the cell is attached to.
    pub tile: TileId,
    /// The primitive kind name (e.g. "PLL", "WARMBOOT").
    pub kind: String,
    /// Configuration fields by name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl ExtraCell {
    /// Creates an extra cell with no configuration fields.
    pub fn new(tile: TileId, kind: impl Into<String>) -> Self {
        Self {
            tile,
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a configuration field, builder style.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        group: u32,
        value: impl Into<String>,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldValue {
                group,
                value: value.into(),
            },
        );
        self
    }

    /// Returns the configuration field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
