//! Configuration types deserialized from `icedb.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `icedb.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IcedbConfig {
    /// The target device and its packaging.
    pub device: DeviceConfig,
}

/// The `[device]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    /// Device name; must equal the chip database's device (e.g. "1k", "8k").
    pub name: String,
    /// Package name; must name one of the chip database's packages.
    pub package: String,
    /// Path of the chip database snapshot.
    #[serde(default)]
    pub chipdb: Option<String>,
}
