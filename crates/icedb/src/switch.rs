//! Routing switch model.
//!
//! A [`Switch`] is one configurable multiplexer or pass buffer located in a
//! tile. For every candidate input net it records the exact configuration
//! bit pattern that selects that input, so the router (is this hop
//! possible?) and the bitstream writer (which bits do I set?) read the same
//! table.

use crate::cbit::{CBit, CBitVal};
use crate::ids::{NetId, TileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A routing multiplexer or bidirectional pass buffer.
///
/// Invariant (checked by the builder): every input pattern has exactly
/// `cbits.len()` entries, where `pattern[i]` is the value of `cbits[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    /// Pass-transistor buffer usable against its nominal direction.
    pub bidir: bool,
    /// The tile holding the switch's configuration bits.
    pub tile: TileId,
    /// The driven net.
    pub out: NetId,
    /// Selection pattern for each candidate input net.
    #[serde(with = "crate::pairs")]
    pub in_val: BTreeMap<NetId, Vec<bool>>,
    /// The configuration bits encoding the selection, in pattern order.
    pub cbits: Vec<CBit>,
}

impl Switch {
    /// Creates a switch. Pattern lengths are validated when the switch is
    /// added to a [`ChipDbBuilder`](crate::ChipDbBuilder).
    pub fn new(
        bidir: bool,
        tile: TileId,
        out: NetId,
        in_val: BTreeMap<NetId, Vec<bool>>,
        cbits: Vec<CBit>,
    ) -> Self {
        Self {
            bidir,
            tile,
            out,
            in_val,
            cbits,
        }
    }

    /// Iterates candidate input nets in ascending id order.
    pub fn inputs(&self) -> impl Iterator<Item = NetId> + '_ {
        self.in_val.keys().copied()
    }

    /// Returns whether `net` is a candidate input.
    pub fn has_input(&self, net: NetId) -> bool {
        self.in_val.contains_key(&net)
    }

    /// Returns the raw selection pattern for `net`.
    pub fn pattern(&self, net: NetId) -> Option<&[bool]> {
        self.in_val.get(&net).map(Vec::as_slice)
    }

    /// Returns the bit assignments that select `net` as the switch input.
    pub fn selection(&self, net: NetId) -> Option<CBitVal> {
        let pattern = self.in_val.get(&net)?;
        Some(self.cbits.iter().copied().zip(pattern.iter().copied()).collect())
    }

    /// Returns whether a signal can cross this switch from `from` to `to`.
    ///
    /// Unidirectional muxes only conduct input to output. A `bidir` buffer
    /// also conducts from its output net back onto any of its inputs.
    pub fn connects(&self, from: NetId, to: NetId) -> bool {
        if to == self.out && self.has_input(from) {
            return true;
        }
        self.bidir && from == self.out && self.has_input(to)
    }

    /// Returns the first input whose pattern length disagrees with `cbits`.
    pub(crate) fn malformed_input(&self) -> Option<(NetId, usize)> {
        self.in_val
            .iter()
            .find(|(_, pattern)| pattern.len() != self.cbits.len())
            .map(|(&net, pattern)| (net, pattern.len()))
    }
}
