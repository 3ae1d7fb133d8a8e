//! Diagnostic text rendering of a chip database.
//!
//! The listing loosely follows the icestorm chipdb text layout, with one
//! dot-directive per section. It is a debugging aid only; nothing parses it.

use crate::chipdb::ChipDb;
use crate::ids::{CellId, ExtraCellId, NetId, TileId};
use crate::types::{Location, TileType};
use std::io::{self, Write};

impl ChipDb {
    /// Writes a full textual listing of the database to `out`.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            ".device {} {} {} {}",
            self.device, self.width, self.height, self.n_nets
        )?;
        writeln!(out, ".global_nets {}", self.n_global_nets)?;

        for (name, package) in &self.packages {
            writeln!(out, "\n.pins {name}")?;
            for (pin, &loc) in package.pin_loc() {
                writeln!(out, "{pin} {}", self.loc_str(loc))?;
            }
        }

        writeln!(out)?;
        for t in self.tiles() {
            let tile_type = self.tile_type(t);
            if tile_type != TileType::NoTile {
                writeln!(out, ".{tile_type} {} {}", self.tile_x(t), self.tile_y(t))?;
            }
        }

        for tile_type in TileType::ALL {
            let fields = self.tile_nonrouting_cbits(tile_type);
            match self.cbits_block_size(tile_type) {
                Some(block) => {
                    writeln!(out, "\n.tile_bits {tile_type} {} {}", block.rows, block.cols)?
                }
                None if fields.is_some() => writeln!(out, "\n.tile_bits {tile_type}")?,
                None => continue,
            }
            for (field, cbits) in fields.into_iter().flatten() {
                write!(out, "{field}")?;
                for cbit in cbits {
                    write!(out, " B{}[{}]", cbit.row, cbit.col)?;
                }
                writeln!(out)?;
            }
        }

        self.dump_nets(out)?;

        for sw in &self.switches {
            let kind = if sw.bidir { "routing" } else { "buffer" };
            write!(
                out,
                "\n.{kind} {} {} {}",
                self.tile_x(sw.tile),
                self.tile_y(sw.tile),
                sw.out
            )?;
            for cbit in &sw.cbits {
                write!(out, " B{}[{}]", cbit.row, cbit.col)?;
            }
            writeln!(out)?;
            for (input, pattern) in &sw.in_val {
                let bits: String = pattern.iter().map(|&b| if b { '1' } else { '0' }).collect();
                writeln!(out, "{bits} {input}")?;
            }
        }

        writeln!(out)?;
        for (i, &kind) in self.cells.cell_types().iter().enumerate() {
            let loc = self.cell_location(CellId::from_index(i));
            writeln!(out, ".cell {i} {kind} {}", self.loc_str(loc))?;
        }

        for (i, cell) in self.extra_cells.iter().enumerate() {
            let id = ExtraCellId::from_index(i);
            writeln!(
                out,
                "\n.extra_cell {id} {} {} {}",
                self.tile_x(cell.tile),
                self.tile_y(cell.tile),
                cell.kind
            )?;
            for (name, field) in &cell.fields {
                writeln!(out, "{name} {} {}", field.group, field.value)?;
            }
        }

        if !self.extra_bits.is_empty() {
            writeln!(out, "\n.extra_bits")?;
            for (name, bit) in &self.extra_bits {
                writeln!(out, "{name} {} {} {}", bit.bank, bit.x, bit.y)?;
            }
        }

        if !self.gbufin.is_empty() {
            writeln!(out, "\n.gbufin")?;
            for ((x, y), glb) in &self.gbufin {
                writeln!(out, "{x} {y} {glb}")?;
            }
        }

        if !self.loc_pin_glb_num.is_empty() {
            writeln!(out, "\n.gbufpin")?;
            for (&loc, glb) in &self.loc_pin_glb_num {
                writeln!(out, "{} {glb}", self.loc_str(loc))?;
            }
        }

        if !self.tile_colbuf_tile.is_empty() {
            writeln!(out, "\n.colbuf")?;
            for (&tile, &colbuf) in &self.tile_colbuf_tile {
                writeln!(
                    out,
                    "{} {} {} {}",
                    self.tile_x(colbuf),
                    self.tile_y(colbuf),
                    self.tile_x(tile),
                    self.tile_y(tile)
                )?;
            }
        }

        if !self.iolatch.is_empty() {
            writeln!(out, "\n.iolatch")?;
            for &tile in &self.iolatch {
                writeln!(out, "{} {}", self.tile_x(tile), self.tile_y(tile))?;
            }
        }

        if !self.ieren.is_empty() {
            writeln!(out, "\n.ieren")?;
            for (&io, &ieren) in &self.ieren {
                writeln!(out, "{} {}", self.loc_str(io), self.loc_str(ieren))?;
            }
        }

        for (b, tiles) in self.bank_tiles.iter().enumerate() {
            write!(out, "\n.bank {b}")?;
            for &tile in tiles {
                write!(out, " {},{}", self.tile_x(tile), self.tile_y(tile))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn dump_nets(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut segments: Vec<Vec<(TileId, &str)>> = vec![Vec::new(); self.n_nets as usize];
        for t in self.tiles() {
            for (name, net) in self.tile_nets(t) {
                segments[net.index()].push((t, name));
            }
        }
        for (i, segs) in segments.iter().enumerate() {
            let net = NetId::from_index(i);
            let global = if self.is_global_net(net) { " global" } else { "" };
            writeln!(out, "\n.net {net}{global}")?;
            for &(t, name) in segs {
                writeln!(out, "{} {} {name}", self.tile_x(t), self.tile_y(t))?;
            }
        }
        Ok(())
    }

    fn loc_str(&self, loc: Location) -> String {
        format!("{} {} {}", self.tile_x(loc.tile), self.tile_y(loc.tile), loc.pos)
    }
}
