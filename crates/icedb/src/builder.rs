//! Single-writer construction of a [`ChipDb`].
//!
//! A loader creates a [`ChipDbBuilder`], calls [`ChipDbBuilder::set_device`]
//! once, populates tiles, nets, cells, switches, configuration tables and
//! packages, and finally calls [`ChipDbBuilder::finish`]. `finish` either
//! returns a fully validated, immutable [`ChipDb`] or an error; there is no
//! way to observe a partially built database.

use crate::cbit::{BlockSize, CBit};
use crate::cells::CellRegistry;
use crate::chipdb::{ChipDb, TileNets};
use crate::error::ChipDbError;
use crate::ident::{NameId, NameInterner};
use crate::ids::{CellId, ExtraCellId, NetId, SwitchId, TileId};
use crate::package::Package;
use crate::switch::Switch;
use crate::types::{CellType, ExtraBit, ExtraCell, Location, TileType};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of global nets on iCE40 devices.
pub const DEFAULT_GLOBAL_NETS: u32 = 8;

/// Geometry fixed by `set_device`.
#[derive(Debug)]
struct Geometry {
    device: String,
    width: u32,
    height: u32,
    n_tiles: u32,
    n_nets: u32,
}

/// Mutable staging area for a chip database.
#[derive(Debug, Default)]
pub struct ChipDbBuilder {
    geometry: Option<Geometry>,
    n_global_nets: Option<u32>,
    tile_type: Vec<TileType>,
    names: NameInterner,
    net_tile_name: Vec<Option<(TileId, NameId)>>,
    tile_nets: Vec<TileNets>,
    cells: CellRegistry,
    switches: Vec<Switch>,
    tile_nonrouting_cbits: BTreeMap<TileType, BTreeMap<String, Vec<CBit>>>,
    tile_cbits_block_size: BTreeMap<TileType, BlockSize>,
    bank_tiles: Vec<Vec<TileId>>,
    iolatch: Vec<TileId>,
    ieren: BTreeMap<Location, Location>,
    extra_bits: BTreeMap<String, ExtraBit>,
    gbufin: BTreeMap<(u32, u32), NetId>,
    tile_colbuf_tile: BTreeMap<TileId, TileId>,
    loc_pin_glb_num: BTreeMap<Location, u32>,
    extra_cells: Vec<ExtraCell>,
    packages: BTreeMap<String, Package>,
}

impl ChipDbBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device identity and geometry. Must be called exactly once,
    /// before any other population call.
    ///
    /// All tiles start as [`TileType::NoTile`].
    pub fn set_device(
        &mut self,
        device: impl Into<String>,
        width: u32,
        height: u32,
        n_nets: u32,
    ) -> Result<(), ChipDbError> {
        if let Some(geometry) = &self.geometry {
            return Err(ChipDbError::DeviceAlreadySet(geometry.device.clone()));
        }
        let n_tiles = width
            .checked_mul(height)
            .filter(|&n| n > 0)
            .ok_or(ChipDbError::InvalidDimensions { width, height })?;

        self.tile_type = vec![TileType::NoTile; n_tiles as usize];
        self.tile_nets = vec![TileNets::default(); n_tiles as usize];
        self.net_tile_name = vec![None; n_nets as usize];
        self.geometry = Some(Geometry {
            device: device.into(),
            width,
            height,
            n_tiles,
            n_nets,
        });
        Ok(())
    }

    /// Overrides the number of global nets (default [`DEFAULT_GLOBAL_NETS`]).
    pub fn set_global_net_count(&mut self, n_global_nets: u32) -> Result<(), ChipDbError> {
        let n_nets = self.geometry()?.n_nets;
        if n_global_nets > n_nets {
            return Err(ChipDbError::GlobalNetCount {
                n_global_nets,
                n_nets,
            });
        }
        self.n_global_nets = Some(n_global_nets);
        Ok(())
    }

    /// Returns the tile id of `(x, y)`, like [`ChipDb::tile`], for use while loading.
    pub fn tile(&self, x: u32, y: u32) -> Result<TileId, ChipDbError> {
        let geometry = self.geometry()?;
        if x >= geometry.width || y >= geometry.height {
            return Err(ChipDbError::TileOutOfRange {
                tile: TileId::from_raw(x.saturating_add(geometry.width.saturating_mul(y))),
                n_tiles: geometry.n_tiles,
            });
        }
        Ok(TileId::from_raw(x + geometry.width * y))
    }

    /// Sets the type of a tile.
    pub fn set_tile_type(&mut self, tile: TileId, tile_type: TileType) -> Result<(), ChipDbError> {
        self.check_tile(tile)?;
        self.tile_type[tile.index()] = tile_type;
        Ok(())
    }

    /// Binds a tile-local wire name to a net.
    ///
    /// The first binding of a net records its provenance. Rebinding a name
    /// to the same net is a no-op; binding it to a different net fails.
    pub fn add_net_name(
        &mut self,
        tile: TileId,
        name: &str,
        net: NetId,
    ) -> Result<(), ChipDbError> {
        self.check_tile(tile)?;
        self.check_net(net)?;
        let id = self.names.get_or_intern(name);
        let nets = &mut self.tile_nets[tile.index()].nets;
        match nets.get(&id) {
            Some(&existing) if existing != net => {
                return Err(ChipDbError::DuplicateNetName {
                    tile,
                    name: name.to_string(),
                });
            }
            Some(_) => {}
            None => {
                nets.insert(id, net);
            }
        }
        self.net_tile_name[net.index()].get_or_insert((tile, id));
        Ok(())
    }

    /// Adds a grid cell and returns its id. Ids are dense, in call order.
    ///
    /// # Errors
    ///
    /// Fails, leaving every cell table unchanged, if the tile is out of
    /// range or the location is already occupied.
    pub fn add_cell(&mut self, kind: CellType, loc: Location) -> Result<CellId, ChipDbError> {
        self.check_tile(loc.tile)?;
        self.cells.add_cell(kind, loc)
    }

    /// Adds a routing switch and returns its id.
    ///
    /// # Errors
    ///
    /// Fails if the tile or any net is out of range, or if an input pattern
    /// length differs from the number of configuration bits.
    pub fn add_switch(&mut self, switch: Switch) -> Result<SwitchId, ChipDbError> {
        self.check_tile(switch.tile)?;
        self.check_net(switch.out)?;
        for input in switch.inputs() {
            self.check_net(input)?;
        }
        for cbit in &switch.cbits {
            self.check_tile(cbit.tile)?;
        }
        if let Some((input, found)) = switch.malformed_input() {
            return Err(ChipDbError::PatternLength {
                tile: switch.tile,
                out: switch.out,
                input,
                expected: switch.cbits.len(),
                found,
            });
        }
        let id = SwitchId::from_index(self.switches.len());
        self.switches.push(switch);
        Ok(id)
    }

    /// Sets the ordered bits of a nonrouting field shared by a tile type.
    pub fn set_nonrouting_cbits(
        &mut self,
        tile_type: TileType,
        field: impl Into<String>,
        cbits: Vec<CBit>,
    ) -> Result<(), ChipDbError> {
        self.geometry()?;
        self.tile_nonrouting_cbits
            .entry(tile_type)
            .or_default()
            .insert(field.into(), cbits);
        Ok(())
    }

    /// Sets the configuration block geometry of a tile type.
    pub fn set_cbits_block_size(
        &mut self,
        tile_type: TileType,
        rows: u32,
        cols: u32,
    ) -> Result<(), ChipDbError> {
        self.geometry()?;
        self.tile_cbits_block_size
            .insert(tile_type, BlockSize { rows, cols });
        Ok(())
    }

    /// Adds a tile to an IO bank, growing the bank table as needed.
    pub fn add_bank_tile(&mut self, bank: u32, tile: TileId) -> Result<(), ChipDbError> {
        self.check_tile(tile)?;
        let bank = bank as usize;
        if self.bank_tiles.len() <= bank {
            self.bank_tiles.resize_with(bank + 1, Vec::new);
        }
        self.bank_tiles[bank].push(tile);
        Ok(())
    }

    /// Records a tile holding an IO latch.
    pub fn add_iolatch(&mut self, tile: TileId) -> Result<(), ChipDbError> {
        self.check_tile(tile)?;
        self.iolatch.push(tile);
        Ok(())
    }

    /// Records where the input-enable bits of an IO site live.
    pub fn add_ieren(&mut self, io: Location, ieren: Location) -> Result<(), ChipDbError> {
        self.check_tile(io.tile)?;
        self.check_tile(ieren.tile)?;
        self.ieren.insert(io, ieren);
        Ok(())
    }

    /// Names a global configuration bit.
    pub fn add_extra_bit(
        &mut self,
        name: impl Into<String>,
        bit: ExtraBit,
    ) -> Result<(), ChipDbError> {
        self.geometry()?;
        self.extra_bits.insert(name.into(), bit);
        Ok(())
    }

    /// Records the global net fed by the global buffer input at `(x, y)`,
    /// which must lie on the grid.
    pub fn add_gbufin(&mut self, x: u32, y: u32, glb: NetId) -> Result<(), ChipDbError> {
        self.tile(x, y)?;
        self.check_net(glb)?;
        self.gbufin.insert((x, y), glb);
        Ok(())
    }

    /// Records which tile holds the column buffer bits for `tile`.
    pub fn set_colbuf_tile(&mut self, tile: TileId, colbuf: TileId) -> Result<(), ChipDbError> {
        self.check_tile(tile)?;
        self.check_tile(colbuf)?;
        self.tile_colbuf_tile.insert(tile, colbuf);
        Ok(())
    }

    /// Records the global network a pin location can drive directly.
    pub fn set_pin_glb_num(&mut self, loc: Location, glb: u32) -> Result<(), ChipDbError> {
        self.check_tile(loc.tile)?;
        self.loc_pin_glb_num.insert(loc, glb);
        Ok(())
    }

    /// Adds a non-grid-regular cell and returns its id.
    pub fn add_extra_cell(&mut self, cell: ExtraCell) -> Result<ExtraCellId, ChipDbError> {
        self.check_tile(cell.tile)?;
        let id = ExtraCellId::from_index(self.extra_cells.len());
        self.extra_cells.push(cell);
        Ok(id)
    }

    /// Adds a package pinout.
    pub fn add_package(&mut self, package: Package) -> Result<(), ChipDbError> {
        self.geometry()?;
        for loc in package.pin_loc().values() {
            self.check_tile(loc.tile)?;
        }
        if self.packages.contains_key(&package.name) {
            return Err(ChipDbError::DuplicatePackage(package.name));
        }
        self.packages.insert(package.name.clone(), package);
        Ok(())
    }

    /// Validates and freezes the database.
    ///
    /// # Errors
    ///
    /// Fails if `set_device` was never called, if some net never received a
    /// tile-local name, or if any configuration bit lies outside the block
    /// geometry of its tile type.
    pub fn finish(self) -> Result<ChipDb, ChipDbError> {
        let geometry = self.geometry.ok_or(ChipDbError::DeviceNotSet)?;
        let net_tile_name = self
            .net_tile_name
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.ok_or(ChipDbError::UnnamedNet(NetId::from_index(i))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut db = ChipDb {
            device: geometry.device,
            width: geometry.width,
            height: geometry.height,
            n_tiles: geometry.n_tiles,
            n_nets: geometry.n_nets,
            n_global_nets: self
                .n_global_nets
                .unwrap_or(DEFAULT_GLOBAL_NETS.min(geometry.n_nets)),
            tile_type: self.tile_type,
            names: self.names.freeze(),
            net_tile_name,
            tile_nets: self.tile_nets,
            cells: self.cells,
            switches: self.switches,
            out_switches: Vec::new(),
            in_switches: Vec::new(),
            tile_nonrouting_cbits: self.tile_nonrouting_cbits,
            tile_cbits_block_size: self.tile_cbits_block_size,
            bank_tiles: self.bank_tiles,
            tile_bank: Vec::new(),
            iolatch: self.iolatch,
            ieren: self.ieren,
            extra_bits: self.extra_bits,
            gbufin: self.gbufin,
            tile_colbuf_tile: self.tile_colbuf_tile,
            loc_pin_glb_num: self.loc_pin_glb_num,
            extra_cells: self.extra_cells,
            packages: self.packages,
        };
        db.validate()?;
        db.build_indices();
        debug!(
            device = db.device.as_str(),
            tiles = db.n_tiles,
            nets = db.n_nets,
            cells = db.cells.len(),
            switches = db.switches.len(),
            packages = db.packages.len(),
            "chip database frozen"
        );
        Ok(db)
    }

    fn geometry(&self) -> Result<&Geometry, ChipDbError> {
        self.geometry.as_ref().ok_or(ChipDbError::DeviceNotSet)
    }

    fn check_tile(&self, tile: TileId) -> Result<(), ChipDbError> {
        let n_tiles = self.geometry()?.n_tiles;
        if tile.as_raw() < n_tiles {
            Ok(())
        } else {
            Err(ChipDbError::TileOutOfRange { tile, n_tiles })
        }
    }

    fn check_net(&self, net: NetId) -> Result<(), ChipDbError> {
        let n_nets = self.geometry()?.n_nets;
        if net.as_raw() < n_nets {
            Ok(())
        } else {
            Err(ChipDbError::NetOutOfRange { net, n_nets })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> ChipDbBuilder {
        let mut b = ChipDbBuilder::new();
        b.set_device("test", 2, 2, 4).unwrap();
        for n in 0..4 {
            b.add_net_name(TileId::from_raw(0), &format!("n{n}"), NetId::from_raw(n))
                .unwrap();
        }
        b
    }

    #[test]
    fn population_before_set_device_fails() {
        let mut b = ChipDbBuilder::new();
        let loc = Location::new(TileId::from_raw(0), 0);
        assert!(matches!(
            b.add_cell(CellType::Logic, loc),
            Err(ChipDbError::DeviceNotSet)
        ));
        assert!(matches!(b.finish(), Err(ChipDbError::DeviceNotSet)));
    }

    #[test]
    fn set_device_only_once() {
        let mut b = ChipDbBuilder::new();
        b.set_device("1k", 14, 18, 10).unwrap();
        let err = b.set_device("8k", 34, 34, 10).unwrap_err();
        assert!(matches!(err, ChipDbError::DeviceAlreadySet(name) if name == "1k"));
    }

    #[test]
    fn zero_sized_grid_rejected() {
        let mut b = ChipDbBuilder::new();
        assert!(matches!(
            b.set_device("bad", 0, 4, 1),
            Err(ChipDbError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn builder_tile_matches_row_major() {
        let b = two_by_two();
        assert_eq!(b.tile(1, 1).unwrap(), TileId::from_raw(3));
        assert!(b.tile(2, 0).is_err());
    }

    #[test]
    fn unnamed_net_fails_finish() {
        let mut b = ChipDbBuilder::new();
        b.set_device("test", 1, 1, 2).unwrap();
        b.add_net_name(TileId::from_raw(0), "a", NetId::from_raw(0))
            .unwrap();
        assert!(matches!(
            b.finish(),
            Err(ChipDbError::UnnamedNet(net)) if net == NetId::from_raw(1)
        ));
    }

    #[test]
    fn net_name_rebinding() {
        let mut b = two_by_two();
        let t = TileId::from_raw(1);
        b.add_net_name(t, "local_g0_0", NetId::from_raw(2)).unwrap();
        b.add_net_name(t, "local_g0_0", NetId::from_raw(2)).unwrap();
        let err = b
            .add_net_name(t, "local_g0_0", NetId::from_raw(3))
            .unwrap_err();
        assert!(matches!(err, ChipDbError::DuplicateNetName { .. }));
    }

    #[test]
    fn first_binding_is_provenance() {
        let mut b = two_by_two();
        b.add_net_name(TileId::from_raw(3), "alias", NetId::from_raw(1))
            .unwrap();
        let db = b.finish().unwrap();
        assert_eq!(db.net_tile_name(NetId::from_raw(1)), (TileId::from_raw(0), "n1"));
        assert_eq!(
            db.tile_net(TileId::from_raw(3), "alias"),
            Some(NetId::from_raw(1))
        );
    }

    #[test]
    fn switch_pattern_length_checked() {
        let mut b = two_by_two();
        let t = TileId::from_raw(0);
        let sw = Switch::new(
            false,
            t,
            NetId::from_raw(1),
            [(NetId::from_raw(0), vec![true])].into_iter().collect(),
            vec![CBit::new(t, 0, 0), CBit::new(t, 0, 1)],
        );
        assert!(matches!(
            b.add_switch(sw),
            Err(ChipDbError::PatternLength {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn switch_net_range_checked() {
        let mut b = two_by_two();
        let t = TileId::from_raw(0);
        let sw = Switch::new(
            false,
            t,
            NetId::from_raw(9),
            BTreeMap::new(),
            Vec::new(),
        );
        assert!(matches!(
            b.add_switch(sw),
            Err(ChipDbError::NetOutOfRange { .. })
        ));
    }

    #[test]
    fn cbit_outside_block_fails_finish() {
        let mut b = two_by_two();
        let t = TileId::from_raw(0);
        b.set_tile_type(t, TileType::Logic).unwrap();
        b.set_cbits_block_size(TileType::Logic, 16, 54).unwrap();
        b.set_nonrouting_cbits(TileType::Logic, "LC_0", vec![CBit::new(t, 16, 0)])
            .unwrap();
        assert!(matches!(
            b.finish(),
            Err(ChipDbError::CBitOutOfBlock { rows: 16, cols: 54, .. })
        ));
    }

    #[test]
    fn duplicate_package_rejected() {
        let mut b = two_by_two();
        b.add_package(Package::new("tq144")).unwrap();
        assert!(matches!(
            b.add_package(Package::new("tq144")),
            Err(ChipDbError::DuplicatePackage(_))
        ));
    }

    #[test]
    fn global_net_count_defaults_and_overrides() {
        let db = two_by_two().finish().unwrap();
        assert_eq!(db.n_global_nets(), 4);

        let mut b = two_by_two();
        b.set_global_net_count(2).unwrap();
        assert!(b.set_global_net_count(5).is_err());
        let db = b.finish().unwrap();
        assert_eq!(db.n_global_nets(), 2);
    }

    #[test]
    fn gbufin_must_lie_on_grid() {
        let mut b = two_by_two();
        b.add_gbufin(1, 1, NetId::from_raw(0)).unwrap();
        assert!(matches!(
            b.add_gbufin(2, 0, NetId::from_raw(1)),
            Err(ChipDbError::TileOutOfRange { n_tiles: 4, .. })
        ));
        assert!(b.add_gbufin(0, 5, NetId::from_raw(1)).is_err());
        let db = b.finish().unwrap();
        assert_eq!(db.gbufin(1, 1), Some(NetId::from_raw(0)));
        assert_eq!(db.gbufin(2, 0), None);
    }

    #[test]
    fn extra_cells_get_dense_ids() {
        let mut b = two_by_two();
        let t = TileId::from_raw(1);
        let a = b.add_extra_cell(ExtraCell::new(t, "WARMBOOT")).unwrap();
        let p = b
            .add_extra_cell(ExtraCell::new(t, "PLL").with_field("PLLTYPE_0", 0, "PLLCONFIG_5"))
            .unwrap();
        assert_eq!((a.as_raw(), p.as_raw()), (0, 1));
        let db = b.finish().unwrap();
        assert_eq!(db.extra_cell(p).kind, "PLL");
        assert_eq!(db.extra_cell(p).field("PLLTYPE_0").unwrap().group, 0);
    }
}
