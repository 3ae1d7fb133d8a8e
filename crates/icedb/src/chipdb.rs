//! The frozen chip database and its query surface.
//!
//! [`ChipDb`] is the aggregate root: tile grid, nets, cells, switches,
//! configuration-bit tables, IO bank topology, extra cells, and packages.
//! It is produced by [`ChipDbBuilder::finish`](crate::ChipDbBuilder::finish)
//! or [`ChipDb::from_json`] and is never mutated afterwards, so any number of
//! placer and router threads may read it concurrently.
//!
//! Out-of-range ids and coordinates are caller bugs and panic. Expected
//! misses (no switch between two nets, an unbanked tile) return `None`.

use crate::cbit::{BlockSize, CBit};
use crate::cells::CellRegistry;
use crate::error::ChipDbError;
use crate::ident::{NameId, NameTable};
use crate::ids::{BankId, CellId, ExtraCellId, NetId, SwitchId, TileId};
use crate::package::Package;
use crate::switch::Switch;
use crate::types::{CellType, ExtraBit, ExtraCell, Location, TileType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Name to net table of one tile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct TileNets {
    #[serde(with = "crate::pairs")]
    pub(crate) nets: BTreeMap<NameId, NetId>,
}

/// An immutable target-architecture description of one device.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChipDb {
    pub(crate) device: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) n_tiles: u32,
    pub(crate) n_nets: u32,
    pub(crate) n_global_nets: u32,

    pub(crate) tile_type: Vec<TileType>,
    pub(crate) names: NameTable,
    pub(crate) net_tile_name: Vec<(TileId, NameId)>,
    pub(crate) tile_nets: Vec<TileNets>,

    pub(crate) cells: CellRegistry,

    pub(crate) switches: Vec<Switch>,
    #[serde(skip)]
    pub(crate) out_switches: Vec<BTreeSet<SwitchId>>,
    #[serde(skip)]
    pub(crate) in_switches: Vec<BTreeSet<SwitchId>>,

    #[serde(with = "crate::pairs")]
    pub(crate) tile_nonrouting_cbits: BTreeMap<TileType, BTreeMap<String, Vec<CBit>>>,
    #[serde(with = "crate::pairs")]
    pub(crate) tile_cbits_block_size: BTreeMap<TileType, BlockSize>,

    pub(crate) bank_tiles: Vec<Vec<TileId>>,
    #[serde(skip)]
    pub(crate) tile_bank: Vec<Option<BankId>>,
    pub(crate) iolatch: Vec<TileId>,
    #[serde(with = "crate::pairs")]
    pub(crate) ieren: BTreeMap<Location, Location>,
    pub(crate) extra_bits: BTreeMap<String, ExtraBit>,
    #[serde(with = "crate::pairs")]
    pub(crate) gbufin: BTreeMap<(u32, u32), NetId>,
    #[serde(with = "crate::pairs")]
    pub(crate) tile_colbuf_tile: BTreeMap<TileId, TileId>,
    #[serde(with = "crate::pairs")]
    pub(crate) loc_pin_glb_num: BTreeMap<Location, u32>,

    pub(crate) extra_cells: Vec<ExtraCell>,
    pub(crate) packages: BTreeMap<String, Package>,
}

impl ChipDb {
    // --- Identity and geometry ---

    /// The device name (e.g. "1k", "8k").
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Grid width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles, `width * height`.
    pub fn n_tiles(&self) -> u32 {
        self.n_tiles
    }

    /// Number of nets.
    pub fn n_nets(&self) -> u32 {
        self.n_nets
    }

    /// Number of global nets; they occupy ids `0..n_global_nets`.
    pub fn n_global_nets(&self) -> u32 {
        self.n_global_nets
    }

    /// Returns the row-major tile id of grid position `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics unless `x < width` and `y < height`.
    pub fn tile(&self, x: u32, y: u32) -> TileId {
        assert!(x < self.width, "tile x {x} out of range 0..{}", self.width);
        assert!(y < self.height, "tile y {y} out of range 0..{}", self.height);
        TileId::from_raw(x + self.width * y)
    }

    /// Returns the grid column of a tile.
    ///
    /// `t == n_tiles` is accepted as a one-past-the-end sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `t > n_tiles`.
    pub fn tile_x(&self, t: TileId) -> u32 {
        assert!(t.as_raw() <= self.n_tiles, "tile {t} out of range");
        t.as_raw() % self.width
    }

    /// Returns the grid row of a tile.
    ///
    /// `t == n_tiles` is accepted as a one-past-the-end sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `t > n_tiles`.
    pub fn tile_y(&self, t: TileId) -> u32 {
        assert!(t.as_raw() <= self.n_tiles, "tile {t} out of range");
        t.as_raw() / self.width
    }

    /// Returns the type of a tile.
    pub fn tile_type(&self, t: TileId) -> TileType {
        self.tile_type[t.index()]
    }

    /// Iterates all tile ids in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> {
        (0..self.n_tiles).map(TileId::from_raw)
    }

    // --- Nets ---

    /// Returns whether `net` belongs to the global network.
    pub fn is_global_net(&self, net: NetId) -> bool {
        net.as_raw() < self.n_global_nets
    }

    /// Looks up the net a tile-local wire name refers to.
    pub fn tile_net(&self, t: TileId, name: &str) -> Option<NetId> {
        let id = self.names.get(name)?;
        self.tile_nets[t.index()].nets.get(&id).copied()
    }

    /// Iterates the `(name, net)` pairs visible in a tile.
    pub fn tile_nets(&self, t: TileId) -> impl Iterator<Item = (&str, NetId)> + '_ {
        self.tile_nets[t.index()]
            .nets
            .iter()
            .map(|(&id, &net)| (self.names.resolve(id), net))
    }

    /// Returns the tile and name a net was first declared with.
    pub fn net_tile_name(&self, net: NetId) -> (TileId, &str) {
        let (tile, name) = self.net_tile_name[net.index()];
        (tile, self.names.resolve(name))
    }

    // --- Cells ---

    /// The grid cell tables.
    pub fn cells(&self) -> &CellRegistry {
        &self.cells
    }

    /// Number of grid cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the kind of a cell.
    pub fn cell_type(&self, cell: CellId) -> CellType {
        self.cells.cell_type(cell)
    }

    /// Returns the location of a cell.
    pub fn cell_location(&self, cell: CellId) -> Location {
        self.cells.cell_location(cell)
    }

    /// Returns the cell at a location.
    pub fn loc_cell(&self, loc: Location) -> Option<CellId> {
        self.cells.loc_cell(loc)
    }

    /// Returns all cells of a kind.
    pub fn cells_of_type(&self, kind: CellType) -> &[CellId] {
        self.cells.cells_of_type(kind)
    }

    // --- Switches ---

    /// All switches, indexed by switch id.
    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    /// Returns a switch.
    pub fn switch(&self, s: SwitchId) -> &Switch {
        &self.switches[s.index()]
    }

    /// Switches driving `net`.
    pub fn out_switches(&self, net: NetId) -> &BTreeSet<SwitchId> {
        &self.out_switches[net.index()]
    }

    /// Switches that can take `net` as an input.
    pub fn in_switches(&self, net: NetId) -> &BTreeSet<SwitchId> {
        &self.in_switches[net.index()]
    }

    /// Returns a switch that drives `out` and has `input` among its inputs.
    ///
    /// When several switches qualify the lowest id is returned.
    pub fn find_switch(&self, input: NetId, out: NetId) -> Option<SwitchId> {
        let ins = &self.in_switches[input.index()];
        let outs = &self.out_switches[out.index()];
        let (small, large) = if ins.len() <= outs.len() {
            (ins, outs)
        } else {
            (outs, ins)
        };
        small.iter().copied().find(|s| large.contains(s))
    }

    // --- Configuration bits ---

    /// Nonrouting configuration fields shared by all tiles of a type.
    pub fn tile_nonrouting_cbits(
        &self,
        tile_type: TileType,
    ) -> Option<&BTreeMap<String, Vec<CBit>>> {
        self.tile_nonrouting_cbits.get(&tile_type)
    }

    /// The ordered configuration bits of one nonrouting field.
    pub fn nonrouting_cbits(&self, tile_type: TileType, field: &str) -> Option<&[CBit]> {
        self.tile_nonrouting_cbits
            .get(&tile_type)?
            .get(field)
            .map(Vec::as_slice)
    }

    /// Configuration block geometry of a tile type.
    pub fn cbits_block_size(&self, tile_type: TileType) -> Option<BlockSize> {
        self.tile_cbits_block_size.get(&tile_type).copied()
    }

    /// Returns whether a bit addresses a cell inside its tile's block.
    ///
    /// Bits of tiles whose type has no declared geometry are rejected.
    pub fn is_valid_cbit(&self, cbit: CBit) -> bool {
        cbit.tile.as_raw() < self.n_tiles
            && self
                .cbits_block_size(self.tile_type(cbit.tile))
                .is_some_and(|block| block.contains(cbit.row, cbit.col))
    }

    // --- IO and bank topology ---

    /// Number of IO banks.
    pub fn n_banks(&self) -> usize {
        self.bank_tiles.len()
    }

    /// Tiles belonging to a bank.
    pub fn bank_tiles(&self, bank: BankId) -> &[TileId] {
        &self.bank_tiles[bank.index()]
    }

    /// Returns the IO bank of a tile, or `None` if the tile is unbanked.
    pub fn tile_bank(&self, t: TileId) -> Option<BankId> {
        self.tile_bank[t.index()]
    }

    /// Tiles holding an IO latch.
    pub fn iolatch(&self) -> &[TileId] {
        &self.iolatch
    }

    /// Returns the location of the input-enable bits of an IO site.
    pub fn ieren(&self, io: Location) -> Option<Location> {
        self.ieren.get(&io).copied()
    }

    /// Returns a named global configuration bit.
    pub fn extra_bit(&self, name: &str) -> Option<ExtraBit> {
        self.extra_bits.get(name).copied()
    }

    /// All named global configuration bits.
    pub fn extra_bits(&self) -> &BTreeMap<String, ExtraBit> {
        &self.extra_bits
    }

    /// Returns the global net fed by the global buffer input at `(x, y)`.
    pub fn gbufin(&self, x: u32, y: u32) -> Option<NetId> {
        self.gbufin.get(&(x, y)).copied()
    }

    /// Returns the tile holding the column buffer bits for `t`.
    pub fn colbuf_tile(&self, t: TileId) -> Option<TileId> {
        self.tile_colbuf_tile.get(&t).copied()
    }

    /// Returns the global network a package pin location can drive directly.
    pub fn pin_glb_num(&self, loc: Location) -> Option<u32> {
        self.loc_pin_glb_num.get(&loc).copied()
    }

    // --- Extra cells ---

    /// All extra cells, indexed by extra cell id.
    pub fn extra_cells(&self) -> &[ExtraCell] {
        &self.extra_cells
    }

    /// Returns an extra cell.
    pub fn extra_cell(&self, id: ExtraCellId) -> &ExtraCell {
        &self.extra_cells[id.index()]
    }

    // --- Packages ---

    /// Returns a package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// All packages by name.
    pub fn packages(&self) -> &BTreeMap<String, Package> {
        &self.packages
    }

    // --- Freezing ---

    /// Checks cross-table consistency. Run before indices are built so that
    /// bad ids surface as errors rather than panics.
    pub(crate) fn validate(&self) -> Result<(), ChipDbError> {
        if self.width == 0
            || self.height == 0
            || self.width.checked_mul(self.height) != Some(self.n_tiles)
        {
            return Err(ChipDbError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.n_global_nets > self.n_nets {
            return Err(ChipDbError::GlobalNetCount {
                n_global_nets: self.n_global_nets,
                n_nets: self.n_nets,
            });
        }
        let n_tiles = self.n_tiles as usize;
        if self.tile_type.len() != n_tiles || self.tile_nets.len() != n_tiles {
            return Err(ChipDbError::TileOutOfRange {
                tile: TileId::from_index(self.tile_type.len().max(self.tile_nets.len())),
                n_tiles: self.n_tiles,
            });
        }
        if self.net_tile_name.len() != self.n_nets as usize {
            return Err(ChipDbError::UnnamedNet(NetId::from_index(
                self.net_tile_name.len(),
            )));
        }

        for (i, &(tile, name)) in self.net_tile_name.iter().enumerate() {
            self.check_tile(tile)?;
            let net = NetId::from_index(i);
            if name.as_raw() as usize >= self.names.len() {
                return Err(ChipDbError::UnnamedNet(net));
            }
            if self.tile_nets[tile.index()].nets.get(&name) != Some(&net) {
                return Err(ChipDbError::NetProvenance { net, tile });
            }
        }
        for nets in &self.tile_nets {
            for (&name, &net) in &nets.nets {
                self.check_net(net)?;
                if name.as_raw() as usize >= self.names.len() {
                    return Err(ChipDbError::UnnamedNet(net));
                }
            }
        }
        for &loc in self.cells.cell_locations() {
            self.check_tile(loc.tile)?;
        }

        for sw in &self.switches {
            self.check_tile(sw.tile)?;
            self.check_net(sw.out)?;
            for input in sw.inputs() {
                self.check_net(input)?;
            }
            if let Some((input, found)) = sw.malformed_input() {
                return Err(ChipDbError::PatternLength {
                    tile: sw.tile,
                    out: sw.out,
                    input,
                    expected: sw.cbits.len(),
                    found,
                });
            }
            for &cbit in &sw.cbits {
                self.check_tile(cbit.tile)?;
                self.check_cbit(cbit, self.tile_type(cbit.tile))?;
            }
        }
        for (&tile_type, fields) in &self.tile_nonrouting_cbits {
            for &cbit in fields.values().flatten() {
                self.check_cbit(cbit, tile_type)?;
            }
        }

        for &tile in self.bank_tiles.iter().flatten().chain(&self.iolatch) {
            self.check_tile(tile)?;
        }
        for (&io, &ieren) in &self.ieren {
            self.check_tile(io.tile)?;
            self.check_tile(ieren.tile)?;
        }
        for (&(x, y), &net) in &self.gbufin {
            if x >= self.width || y >= self.height {
                return Err(ChipDbError::TileOutOfRange {
                    tile: TileId::from_raw(x.saturating_add(self.width.saturating_mul(y))),
                    n_tiles: self.n_tiles,
                });
            }
            self.check_net(net)?;
        }
        for (&tile, &colbuf) in &self.tile_colbuf_tile {
            self.check_tile(tile)?;
            self.check_tile(colbuf)?;
        }
        for loc in self.loc_pin_glb_num.keys() {
            self.check_tile(loc.tile)?;
        }
        for cell in &self.extra_cells {
            self.check_tile(cell.tile)?;
        }
        for package in self.packages.values() {
            for loc in package.pin_loc().values() {
                self.check_tile(loc.tile)?;
            }
        }
        Ok(())
    }

    /// Builds the switch fan-in/fan-out and tile-to-bank indices.
    pub(crate) fn build_indices(&mut self) {
        let n_nets = self.n_nets as usize;
        self.out_switches = vec![BTreeSet::new(); n_nets];
        self.in_switches = vec![BTreeSet::new(); n_nets];
        for (i, sw) in self.switches.iter().enumerate() {
            let id = SwitchId::from_index(i);
            self.out_switches[sw.out.index()].insert(id);
            for input in sw.inputs() {
                self.in_switches[input.index()].insert(id);
            }
        }

        self.tile_bank = vec![None; self.n_tiles as usize];
        for (b, tiles) in self.bank_tiles.iter().enumerate() {
            for &tile in tiles {
                self.tile_bank[tile.index()].get_or_insert(BankId::from_index(b));
            }
        }
    }

    fn check_tile(&self, tile: TileId) -> Result<(), ChipDbError> {
        if tile.as_raw() < self.n_tiles {
            Ok(())
        } else {
            Err(ChipDbError::TileOutOfRange {
                tile,
                n_tiles: self.n_tiles,
            })
        }
    }

    fn check_net(&self, net: NetId) -> Result<(), ChipDbError> {
        if net.as_raw() < self.n_nets {
            Ok(())
        } else {
            Err(ChipDbError::NetOutOfRange {
                net,
                n_nets: self.n_nets,
            })
        }
    }

    fn check_cbit(&self, cbit: CBit, tile_type: TileType) -> Result<(), ChipDbError> {
        match self.cbits_block_size(tile_type) {
            Some(block) if !block.contains(cbit.row, cbit.col) => {
                Err(ChipDbError::CBitOutOfBlock {
                    cbit,
                    tile_type,
                    rows: block.rows,
                    cols: block.cols,
                })
            }
            _ => Ok(()),
        }
    }
}
