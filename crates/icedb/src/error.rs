//! Error types for chip database construction and snapshot decoding.

use crate::cbit::CBit;
use crate::ids::{NetId, TileId};
use crate::types::{Location, TileType};

/// Errors raised while populating or decoding a chip database.
///
/// Query-time misses are not errors; they are reported as `None`.
#[derive(Debug, thiserror::Error)]
pub enum ChipDbError {
    /// A population call was made before `set_device`.
    #[error("device geometry has not been set")]
    DeviceNotSet,

    /// `set_device` was called more than once.
    #[error("device geometry already set for '{0}'")]
    DeviceAlreadySet(String),

    /// The grid has a zero dimension.
    #[error("invalid device dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A tile id is outside `0..n_tiles`.
    #[error("tile {tile} out of range (device has {n_tiles} tiles)")]
    TileOutOfRange {
        /// The offending tile.
        tile: TileId,
        /// Number of tiles in the device.
        n_tiles: u32,
    },

    /// A net id is outside `0..n_nets`.
    #[error("net {net} out of range (device has {n_nets} nets)")]
    NetOutOfRange {
        /// The offending net.
        net: NetId,
        /// Number of nets in the device.
        n_nets: u32,
    },

    /// A switch input pattern does not match the switch's bit count.
    #[error(
        "switch driving net {out} in tile {tile}: \
         input {input} has {found} pattern bits, expected {expected}"
    )]
    PatternLength {
        /// The switch's tile.
        tile: TileId,
        /// The switch's output net.
        out: NetId,
        /// The input with the bad pattern.
        input: NetId,
        /// Number of configuration bits of the switch.
        expected: usize,
        /// Length of the offending pattern.
        found: usize,
    },

    /// Two cells were placed at the same location.
    #[error("location {0} already holds a cell")]
    DuplicateLocation(Location),

    /// A tile-local net name was bound to two different nets.
    #[error("tile {tile} already has a net named '{name}'")]
    DuplicateNetName {
        /// The tile.
        tile: TileId,
        /// The repeated name.
        name: String,
    },

    /// A net was never given a tile-local name.
    #[error("net {0} has no tile-local name")]
    UnnamedNet(NetId),

    /// Two packages share one name.
    #[error("package '{0}' defined twice")]
    DuplicatePackage(String),

    /// A pin name was bound twice within one package.
    #[error("package '{package}': pin '{pin}' defined twice")]
    DuplicatePin {
        /// The package.
        package: String,
        /// The repeated pin name.
        pin: String,
    },

    /// A location was bound to two pins within one package.
    #[error("package '{package}': location {loc} bonded to two pins")]
    DuplicatePinLocation {
        /// The package.
        package: String,
        /// The repeated location.
        loc: Location,
    },

    /// A configuration bit falls outside its tile type's block.
    #[error("config bit {cbit} outside the {rows}x{cols} block of {tile_type}")]
    CBitOutOfBlock {
        /// The offending bit.
        cbit: CBit,
        /// The type of the bit's tile.
        tile_type: TileType,
        /// Block rows for that type.
        rows: u32,
        /// Block columns for that type.
        cols: u32,
    },

    /// More global nets were declared than nets exist.
    #[error("{n_global_nets} global nets declared but device has only {n_nets} nets")]
    GlobalNetCount {
        /// Declared global net count.
        n_global_nets: u32,
        /// Total net count.
        n_nets: u32,
    },

    /// The cell kind and cell location tables disagree in length.
    #[error("cell tables disagree: {types} cell types but {locations} cell locations")]
    CellTableLength {
        /// Entries in the cell kind table.
        types: usize,
        /// Entries in the cell location table.
        locations: usize,
    },

    /// A net's recorded provenance names a wire that does not carry the net.
    #[error("net {net}: provenance in tile {tile} does not name a wire of that net")]
    NetProvenance {
        /// The net.
        net: NetId,
        /// The tile its provenance points at.
        tile: TileId,
    },

    /// A snapshot could not be decoded.
    #[error("failed to decode chip database snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A binary snapshot is truncated, corrupt, or of another format version.
    #[error("invalid binary chip database snapshot: {reason}")]
    BinarySnapshot {
        /// What was wrong with it.
        reason: String,
    },
}
