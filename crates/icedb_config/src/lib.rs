//! Loading of `icedb.toml` project settings and chip database snapshots.
//!
//! This crate is the file-system boundary of the chip database: it reads the
//! project configuration, locates a snapshot on disk, decodes it into a
//! frozen [`icedb::ChipDb`], and resolves the configured package against it.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{load_chipdb, open_chipdb, resolve_chipdb_path, select_package, CHIPDB_ENV};
pub use types::*;
