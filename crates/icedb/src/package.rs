//! Package pinouts.
//!
//! A [`Package`] maps package pin names to physical [`Location`]s and back.
//! The two directions are kept as exact inverses: inserting a pin name or a
//! location twice is rejected.

use crate::error::ChipDbError;
use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The pinout of one package variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name (e.g. "tq144", "ct256").
    pub name: String,
    pin_loc: BTreeMap<String, Location>,
    #[serde(skip)]
    loc_pin: BTreeMap<Location, String>,
}

impl Package {
    /// Creates a package with no pins.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pin_loc: BTreeMap::new(),
            loc_pin: BTreeMap::new(),
        }
    }

    /// Binds `pin` to `loc`.
    ///
    /// # Errors
    ///
    /// Fails if either the pin name or the location is already bound; the
    /// package is left unchanged.
    pub fn add_pin(&mut self, pin: impl Into<String>, loc: Location) -> Result<(), ChipDbError> {
        let pin = pin.into();
        if self.pin_loc.contains_key(&pin) {
            return Err(ChipDbError::DuplicatePin {
                package: self.name.clone(),
                pin,
            });
        }
        if self.loc_pin.contains_key(&loc) {
            return Err(ChipDbError::DuplicatePinLocation {
                package: self.name.clone(),
                loc,
            });
        }
        self.loc_pin.insert(loc, pin.clone());
        self.pin_loc.insert(pin, loc);
        Ok(())
    }

    /// Returns the location of a pin.
    pub fn pin_location(&self, pin: &str) -> Option<Location> {
        self.pin_loc.get(pin).copied()
    }

    /// Returns the pin bonded to a location.
    pub fn location_pin(&self, loc: Location) -> Option<&str> {
        self.loc_pin.get(&loc).map(String::as_str)
    }

    /// The pin name to location table.
    pub fn pin_loc(&self) -> &BTreeMap<String, Location> {
        &self.pin_loc
    }

    /// The location to pin name table.
    pub fn loc_pin(&self) -> &BTreeMap<Location, String> {
        &self.loc_pin
    }

    /// Number of bonded pins.
    pub fn len(&self) -> usize {
        self.pin_loc.len()
    }

    /// Whether the package has no bonded pins.
    pub fn is_empty(&self) -> bool {
        self.pin_loc.is_empty()
    }

    /// Rebuilds the location index from the pin table after decoding.
    pub(crate) fn reindex(&mut self) -> Result<(), ChipDbError> {
        self.loc_pin.clear();
        for (pin, &loc) in &self.pin_loc {
            if self.loc_pin.insert(loc, pin.clone()).is_some() {
                return Err(ChipDbError::DuplicatePinLocation {
                    package: self.name.clone(),
                    loc,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TileId;

    fn loc(tile: u32, pos: u32) -> Location {
        Location::new(TileId::from_raw(tile), pos)
    }

    #[test]
    fn pins_roundtrip_both_ways() {
        let mut pkg = Package::new("tq144");
        pkg.add_pin("1", loc(1, 0)).unwrap();
        pkg.add_pin("2", loc(1, 1)).unwrap();
        assert_eq!(pkg.len(), 2);
        assert_eq!(pkg.pin_loc().len(), pkg.loc_pin().len());
        for (pin, &l) in pkg.pin_loc() {
            assert_eq!(pkg.location_pin(l), Some(pin.as_str()));
        }
        assert_eq!(pkg.pin_location("2"), Some(loc(1, 1)));
        assert_eq!(pkg.pin_location("3"), None);
    }

    #[test]
    fn duplicate_pin_rejected() {
        let mut pkg = Package::new("tq144");
        pkg.add_pin("1", loc(1, 0)).unwrap();
        let err = pkg.add_pin("1", loc(2, 0)).unwrap_err();
        assert!(matches!(err, ChipDbError::DuplicatePin { .. }));
        assert_eq!(pkg.len(), 1);
        assert_eq!(pkg.location_pin(loc(2, 0)), None);
    }

    #[test]
    fn duplicate_location_rejected() {
        let mut pkg = Package::new("tq144");
        pkg.add_pin("1", loc(1, 0)).unwrap();
        let err = pkg.add_pin("7", loc(1, 0)).unwrap_err();
        assert!(matches!(err, ChipDbError::DuplicatePinLocation { .. }));
        assert_eq!(pkg.pin_location("7"), None);
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let mut pkg = Package::new("vq100");
        pkg.add_pin("A1", loc(4, 1)).unwrap();
        let json = serde_json::to_string(&pkg).unwrap();
        let mut restored: Package = serde_json::from_str(&json).unwrap();
        assert!(restored.loc_pin().is_empty());
        restored.reindex().unwrap();
        assert_eq!(restored, pkg);
    }
}
