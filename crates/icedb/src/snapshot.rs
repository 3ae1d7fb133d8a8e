//! Snapshot codecs: human-readable JSON and a compact checksummed binary form.
//!
//! A snapshot holds the primary tables only. Reverse indices (location to
//! cell, kind to cells, pin location to pin, switch fan-in/fan-out, tile to
//! bank) are rebuilt on decode, and the decoded tables go through the same
//! validation as [`ChipDbBuilder::finish`](crate::ChipDbBuilder::finish).

use crate::chipdb::ChipDb;
use crate::error::ChipDbError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Magic bytes at the start of every binary snapshot header.
const SNAPSHOT_MAGIC: [u8; 4] = *b"ICDB";

/// Binary snapshot layout version. Bump on any change to the table layout.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Header preceding the bincode payload of a binary snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    format_version: u32,
    /// xxh3-64 of the payload.
    checksum: u64,
}

fn binary_error(reason: impl ToString) -> ChipDbError {
    ChipDbError::BinarySnapshot {
        reason: reason.to_string(),
    }
}

impl ChipDb {
    /// Encodes the database as a JSON snapshot.
    pub fn to_json(&self) -> Result<String, ChipDbError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and validates a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ChipDbError::Snapshot`] for malformed JSON and the usual
    /// construction errors for well-formed but inconsistent tables.
    pub fn from_json(json: &str) -> Result<ChipDb, ChipDbError> {
        let db: ChipDb = serde_json::from_str(json)?;
        db.thaw("json")
    }

    /// Encodes the database as a binary snapshot.
    ///
    /// Layout: 4-byte little-endian header length, bincode header (magic,
    /// format version, payload checksum), bincode payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChipDbError> {
        let config = bincode::config::standard();
        let payload = bincode::serde::encode_to_vec(self, config).map_err(binary_error)?;
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            format_version: SNAPSHOT_FORMAT_VERSION,
            checksum: xxhash_rust::xxh3::xxh3_64(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, config).map_err(binary_error)?;

        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);
        Ok(output)
    }

    /// Decodes and validates a binary snapshot produced by [`ChipDb::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`ChipDbError::BinarySnapshot`] if the data is truncated, has
    /// the wrong magic or format version, or fails its checksum.
    pub fn from_bytes(raw: &[u8]) -> Result<ChipDb, ChipDbError> {
        let config = bincode::config::standard();
        let len_bytes: [u8; 4] = raw
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| binary_error("missing header length"))?;
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        let header_bytes = raw
            .get(4..4 + header_len)
            .ok_or_else(|| binary_error("truncated header"))?;
        let (header, _): (SnapshotHeader, usize) =
            bincode::serde::decode_from_slice(header_bytes, config).map_err(binary_error)?;

        if header.magic != SNAPSHOT_MAGIC {
            return Err(binary_error("bad magic"));
        }
        if header.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(binary_error(format!(
                "format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                header.format_version
            )));
        }
        let payload = &raw[4 + header_len..];
        if xxhash_rust::xxh3::xxh3_64(payload) != header.checksum {
            return Err(binary_error("checksum mismatch"));
        }

        let (db, _): (ChipDb, usize) =
            bincode::serde::decode_from_slice(payload, config).map_err(binary_error)?;
        db.thaw("binary")
    }

    /// Rebuilds skipped indices and re-runs freeze-time validation.
    fn thaw(mut self, format: &'static str) -> Result<ChipDb, ChipDbError> {
        self.cells.reindex()?;
        for package in self.packages.values_mut() {
            package.reindex()?;
        }
        self.validate()?;
        self.build_indices();
        debug!(
            device = self.device.as_str(),
            format,
            tiles = self.n_tiles,
            nets = self.n_nets,
            switches = self.switches.len(),
            "chip database snapshot decoded"
        );
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::cbit::CBit;
    use crate::ids::{CellId, NetId, SwitchId, TileId};
    use crate::package::Package;
    use crate::switch::Switch;
    use crate::types::{CellType, ExtraBit, Location, TileType};
    use crate::{ChipDb, ChipDbBuilder, ChipDbError};

    fn sample() -> ChipDb {
        let mut b = ChipDbBuilder::new();
        b.set_device("test", 2, 2, 4).unwrap();
        b.set_global_net_count(1).unwrap();
        let t = TileId::from_raw(3);
        b.set_tile_type(t, TileType::Logic).unwrap();
        b.set_cbits_block_size(TileType::Logic, 16, 54).unwrap();
        for n in 0..4 {
            b.add_net_name(t, &format!("w{n}"), NetId::from_raw(n)).unwrap();
        }
        b.add_cell(CellType::Logic, Location::new(t, 0)).unwrap();
        b.add_cell(CellType::Io, Location::new(TileId::from_raw(0), 1))
            .unwrap();
        b.add_switch(Switch::new(
            true,
            t,
            NetId::from_raw(2),
            [(NetId::from_raw(1), vec![true])].into_iter().collect(),
            vec![CBit::new(t, 4, 7)],
        ))
        .unwrap();
        let mut pkg = Package::new("cm81");
        pkg.add_pin("A1", Location::new(TileId::from_raw(0), 1)).unwrap();
        b.add_package(pkg).unwrap();
        b.add_bank_tile(2, TileId::from_raw(0)).unwrap();
        b.add_gbufin(0, 1, NetId::from_raw(0)).unwrap();
        b.add_extra_bit("padin_glb_netwk.0", ExtraBit { bank: 0, x: 3, y: 7 })
            .unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn roundtrip_rebuilds_indices() {
        let db = sample();
        let restored = ChipDb::from_json(&db.to_json().unwrap()).unwrap();

        assert_eq!(restored.device(), "test");
        assert_eq!(restored.n_global_nets(), 1);
        assert_eq!(
            restored.loc_cell(Location::new(TileId::from_raw(0), 1)),
            Some(CellId::from_raw(1))
        );
        assert_eq!(
            restored.cells_of_type(CellType::Logic),
            &[CellId::from_raw(0)]
        );
        assert_eq!(
            restored.find_switch(NetId::from_raw(1), NetId::from_raw(2)),
            Some(SwitchId::from_raw(0))
        );
        assert_eq!(
            restored
                .package("cm81")
                .unwrap()
                .location_pin(Location::new(TileId::from_raw(0), 1)),
            Some("A1")
        );
        assert_eq!(
            restored.tile_net(TileId::from_raw(3), "w3"),
            Some(NetId::from_raw(3))
        );
        assert_eq!(restored.tile_bank(TileId::from_raw(0)).map(|b| b.as_raw()), Some(2));
        assert_eq!(restored.gbufin(0, 1), Some(NetId::from_raw(0)));
        assert_eq!(restored.extra_bit("padin_glb_netwk.0").unwrap().y, 7);
    }

    #[test]
    fn malformed_json_is_snapshot_error() {
        assert!(matches!(
            ChipDb::from_json("{\"device\":"),
            Err(ChipDbError::Snapshot(_))
        ));
    }

    #[test]
    fn binary_roundtrip_matches_json() {
        let db = sample();
        let restored = ChipDb::from_bytes(&db.to_bytes().unwrap()).unwrap();
        assert_eq!(restored.to_json().unwrap(), db.to_json().unwrap());
        assert_eq!(
            restored.find_switch(NetId::from_raw(1), NetId::from_raw(2)),
            Some(SwitchId::from_raw(0))
        );
    }

    #[test]
    fn corrupt_binary_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            ChipDb::from_bytes(&bytes),
            Err(ChipDbError::BinarySnapshot { reason }) if reason == "checksum mismatch"
        ));
        assert!(matches!(
            ChipDb::from_bytes(&[1, 0]),
            Err(ChipDbError::BinarySnapshot { .. })
        ));
    }

    fn edit_json(edit: impl FnOnce(&mut serde_json::Value)) -> Result<ChipDb, ChipDbError> {
        let json = sample().to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        edit(&mut value);
        ChipDb::from_json(&value.to_string())
    }

    #[test]
    fn unequal_cell_tables_rejected() {
        let err = edit_json(|v| {
            v["cells"]["cell_type"]
                .as_array_mut()
                .unwrap()
                .push(serde_json::json!("Io"))
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ChipDbError::CellTableLength {
                types: 3,
                locations: 2
            }
        ));
    }

    #[test]
    fn repeated_switch_input_rejected() {
        let err = edit_json(|v| {
            v["switches"][0]["in_val"]
                .as_array_mut()
                .unwrap()
                .push(serde_json::json!([1, [false]]))
        })
        .unwrap_err();
        assert!(matches!(err, ChipDbError::Snapshot(_)));
    }

    #[test]
    fn net_provenance_must_name_its_wire() {
        // Name 3 ("w3") in tile 3 carries net 3, not net 2.
        let err = edit_json(|v| v["net_tile_name"][2] = serde_json::json!([3, 3])).unwrap_err();
        assert!(matches!(
            err,
            ChipDbError::NetProvenance { net, tile }
                if net == NetId::from_raw(2) && tile == TileId::from_raw(3)
        ));
        // Tile 0 has no wires at all.
        let err = edit_json(|v| v["net_tile_name"][2] = serde_json::json!([0, 2])).unwrap_err();
        assert!(matches!(err, ChipDbError::NetProvenance { .. }));
    }

    #[test]
    fn off_grid_gbufin_rejected() {
        let err = edit_json(|v| v["gbufin"] = serde_json::json!([[[5, 0], 0]])).unwrap_err();
        assert!(matches!(err, ChipDbError::TileOutOfRange { .. }));
    }

    #[test]
    fn inconsistent_tables_rejected() {
        let db = sample();
        let mut value: serde_json::Value = serde_json::from_str(&db.to_json().unwrap()).unwrap();
        value["n_nets"] = serde_json::json!(2);
        let err = ChipDb::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ChipDbError::UnnamedNet(_)));
    }
}
