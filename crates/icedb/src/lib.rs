//! Target architecture database for iCE40-style FPGA place and route.
//!
//! A [`ChipDb`] describes one device: its tile grid, routing nets and the
//! switches between them, placeable cells, configuration bit layout, IO bank
//! topology, special-function cells, and package pinouts. Placement, routing
//! and bitstream generation only read it.
//!
//! # Usage
//!
//! A loader fills a [`ChipDbBuilder`] and freezes it:
//!
//! ```
//! use icedb::{CBit, CellType, ChipDbBuilder, Location, Switch, TileType};
//! use icedb::ids::NetId;
//!
//! let mut b = ChipDbBuilder::new();
//! b.set_device("demo", 2, 2, 3).unwrap();
//! let t = b.tile(1, 1).unwrap();
//! b.set_tile_type(t, TileType::Logic).unwrap();
//! for (n, name) in ["glb_netwk_0", "local_g0_0", "lutff_0/in_0"].iter().enumerate() {
//!     b.add_net_name(t, name, NetId::from_raw(n as u32)).unwrap();
//! }
//! b.add_cell(CellType::Logic, Location::new(t, 0)).unwrap();
//! b.add_switch(Switch::new(
//!     false,
//!     t,
//!     NetId::from_raw(2),
//!     [(NetId::from_raw(1), vec![true])].into_iter().collect(),
//!     vec![CBit::new(t, 0, 26)],
//! ))
//! .unwrap();
//!
//! let db = b.finish().unwrap();
//! assert_eq!(db.tile(db.tile_x(t), db.tile_y(t)), t);
//! assert!(db.find_switch(NetId::from_raw(1), NetId::from_raw(2)).is_some());
//! ```
//!
//! # Concurrency
//!
//! A finished [`ChipDb`] has no interior mutability and is `Send + Sync`;
//! share it behind an `Arc` or plain references across worker threads.

#![warn(missing_docs)]

mod builder;
mod cbit;
mod cells;
mod chipdb;
mod dump;
mod error;
mod ident;
pub mod ids;
mod package;
mod pairs;
mod snapshot;
mod switch;
mod types;

pub use builder::{ChipDbBuilder, DEFAULT_GLOBAL_NETS};
pub use cbit::{BlockSize, CBit, CBitVal};
pub use cells::CellRegistry;
pub use chipdb::ChipDb;
pub use error::ChipDbError;
pub use ident::{NameId, NameInterner, NameTable};
pub use package::Package;
pub use switch::Switch;
pub use types::{CellType, ExtraBit, ExtraCell, FieldValue, Location, TileType};
