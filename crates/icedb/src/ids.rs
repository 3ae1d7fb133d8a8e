//! Dense ID newtypes for chip database entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Ord`, `Hash`, and
//! `Serialize`/`Deserialize`. IDs are assigned densely from zero at
//! construction time and index directly into the database's tables.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the ID as a table index.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Row-major tile index: `x + width * y`.
    TileId
);

define_id!(
    /// A routing net (tile-local wire segment). Global nets occupy the lowest ids.
    NetId
);

define_id!(
    /// A placeable grid cell (logic, IO, global buffer, RAM, ...).
    CellId
);

define_id!(
    /// A routing switch (multiplexer or pass buffer).
    SwitchId
);

define_id!(
    /// A non-grid-regular cell such as a PLL or the warm-boot controller.
    ExtraCellId
);

define_id!(
    /// An IO bank sharing one set of electrical constraints.
    BankId
);
