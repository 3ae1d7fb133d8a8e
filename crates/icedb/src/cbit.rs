//! Configuration-bit addressing.
//!
//! A [`CBit`] names one SRAM configuration cell inside a tile's configuration
//! block. A [`CBitVal`] is a set of CBit assignments that together encode one
//! value of a multi-bit field (a LUT entry, an IO standard, a PLL divider).
//! Valid row/col ranges for a tile come from its type's [`BlockSize`].

use crate::ids::TileId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The address of one configuration bit: `(tile, row, col)`.
///
/// Equality, ordering and hashing are structural over the triple, in that
/// field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CBit {
    /// The tile owning the configuration block.
    pub tile: TileId,
    /// Row within the tile's block.
    pub row: u32,
    /// Column within the tile's block.
    pub col: u32,
}

impl CBit {
    /// Creates a configuration-bit address.
    pub fn new(tile: TileId, row: u32, col: u32) -> Self {
        Self { tile, row, col }
    }
}

impl fmt::Display for CBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} B{}[{}]", self.tile, self.row, self.col)
    }
}

/// Configuration-block geometry for one tile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSize {
    /// Number of rows in the block.
    pub rows: u32,
    /// Number of columns in the block.
    pub cols: u32,
}

impl BlockSize {
    /// Returns whether `(row, col)` addresses a bit inside the block.
    pub fn contains(self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }
}

/// A named configuration pattern: the value every listed bit must hold.
///
/// Distinct patterns for the same field are expected to assign disjoint or
/// consistently-valued bits; this is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CBitVal {
    #[serde(with = "crate::pairs")]
    cbit_val: BTreeMap<CBit, bool>,
}

impl CBitVal {
    /// Creates a pattern from a bit-to-value map.
    pub fn new(cbit_val: BTreeMap<CBit, bool>) -> Self {
        Self { cbit_val }
    }

    /// Returns the set of bits the pattern constrains.
    pub fn cbits(&self) -> BTreeSet<CBit> {
        self.cbit_val.keys().copied().collect()
    }

    /// Returns the value the pattern assigns to `cbit`, if any.
    pub fn value(&self, cbit: CBit) -> Option<bool> {
        self.cbit_val.get(&cbit).copied()
    }

    /// Iterates `(bit, value)` assignments in bit order.
    pub fn iter(&self) -> impl Iterator<Item = (CBit, bool)> + '_ {
        self.cbit_val.iter().map(|(&cbit, &val)| (cbit, val))
    }

    /// Returns the number of constrained bits.
    pub fn len(&self) -> usize {
        self.cbit_val.len()
    }

    /// Returns whether the pattern constrains no bits.
    pub fn is_empty(&self) -> bool {
        self.cbit_val.is_empty()
    }

    /// Returns the bits both patterns constrain to opposite values.
    pub fn conflicts(&self, other: &CBitVal) -> BTreeSet<CBit> {
        self.iter()
            .filter(|&(cbit, val)| other.value(cbit).is_some_and(|v| v != val))
            .map(|(cbit, _)| cbit)
            .collect()
    }
}

impl FromIterator<(CBit, bool)> for CBitVal {
    fn from_iter<I: IntoIterator<Item = (CBit, bool)>>(iter: I) -> Self {
        Self {
            cbit_val: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for CBitVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (cbit, val)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cbit} = {}", u8::from(val))?;
        }
        f.write_str("}")
    }
}
