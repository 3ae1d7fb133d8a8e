//! Interned tile-local net names.
//!
//! The same wire names ("lutff_0/out", "sp4_h_r_3", "glb2local_1") repeat in
//! every tile of a type, so names are interned once. A [`NameInterner`] is
//! used while the database is being populated and is frozen into a read-only
//! [`NameTable`] that can be shared across threads without locking.

use lasso::{Rodeo, RodeoReader};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An interned net name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NameId(u32);

impl NameId {
    /// Returns the raw `u32` index of this name.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `NameId` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for NameId {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(NameId)
    }
}

/// Mutable string interner used during construction.
pub struct NameInterner {
    rodeo: Rodeo<NameId>,
}

impl NameInterner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Interns a name, returning the existing id if it was seen before.
    pub fn get_or_intern(&mut self, name: &str) -> NameId {
        self.rodeo.get_or_intern(name)
    }

    /// Resolves an id created by this interner.
    pub fn resolve(&self, id: NameId) -> &str {
        self.rodeo.resolve(&id)
    }

    /// Freezes the interner into a read-only table.
    pub fn freeze(self) -> NameTable {
        NameTable {
            reader: self.rodeo.into_reader(),
        }
    }
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameInterner")
            .field("len", &self.rodeo.len())
            .finish()
    }
}

/// Read-only interned name table.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTable {
    reader: RodeoReader<NameId>,
}

impl NameTable {
    /// Looks up the id of an already interned name.
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.reader.get(name)
    }

    /// Resolves an id back to its name.
    ///
    /// # Panics
    ///
    /// Panics if the id was not created by this table's interner.
    pub fn resolve(&self, id: NameId) -> &str {
        self.reader.resolve(&id)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    /// Whether the table holds no names.
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable")
            .field("len", &self.reader.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_id() {
        let mut interner = NameInterner::new();
        let a = interner.get_or_intern("lutff_0/out");
        let b = interner.get_or_intern("lutff_0/out");
        let c = interner.get_or_intern("lutff_1/out");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(c), "lutff_1/out");
    }

    #[test]
    fn frozen_table_lookups() {
        let mut interner = NameInterner::new();
        let id = interner.get_or_intern("sp4_h_r_3");
        let table = interner.freeze();
        assert_eq!(table.get("sp4_h_r_3"), Some(id));
        assert_eq!(table.get("sp4_h_r_4"), None);
        assert_eq!(table.resolve(id), "sp4_h_r_3");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_serde_roundtrip() {
        let mut interner = NameInterner::new();
        let a = interner.get_or_intern("glb_netwk_0");
        let b = interner.get_or_intern("neigh_op_top_2");
        let json = serde_json::to_string(&interner.freeze()).unwrap();
        let restored: NameTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.resolve(a), "glb_netwk_0");
        assert_eq!(restored.get("neigh_op_top_2"), Some(b));
    }

    #[test]
    fn table_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<NameTable>();
    }
}
