//! Placement-capacity bookkeeping for grid cells.
//!
//! Cells live in parallel dense tables (`cell_type`, `cell_location`) with two
//! reverse indices: location to cell, and kind to the list of cells of that
//! kind. All four are updated by the single [`CellRegistry::add_cell`] call.

use crate::error::ChipDbError;
use crate::ids::CellId;
use crate::types::{CellType, Location};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The grid cell tables of a chip database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellRegistry {
    cell_type: Vec<CellType>,
    cell_location: Vec<Location>,
    #[serde(skip)]
    loc_cell: HashMap<Location, CellId>,
    #[serde(skip)]
    cell_type_cells: [Vec<CellId>; CellType::COUNT],
}

impl CellRegistry {
    /// Appends a cell of `kind` at `loc` and returns its id.
    ///
    /// Ids are assigned densely in call order.
    ///
    /// # Errors
    ///
    /// Fails without modifying any table if `loc` already holds a cell.
    pub fn add_cell(&mut self, kind: CellType, loc: Location) -> Result<CellId, ChipDbError> {
        if self.loc_cell.contains_key(&loc) {
            return Err(ChipDbError::DuplicateLocation(loc));
        }
        let id = CellId::from_index(self.cell_type.len());
        self.cell_type.push(kind);
        self.cell_location.push(loc);
        self.loc_cell.insert(loc, id);
        self.cell_type_cells[kind.index()].push(id);
        Ok(id)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cell_type.len()
    }

    /// Whether no cells have been added.
    pub fn is_empty(&self) -> bool {
        self.cell_type.is_empty()
    }

    /// The kind of every cell, indexed by cell id.
    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_type
    }

    /// The location of every cell, indexed by cell id.
    pub fn cell_locations(&self) -> &[Location] {
        &self.cell_location
    }

    /// Returns the kind of a cell.
    pub fn cell_type(&self, cell: CellId) -> CellType {
        self.cell_type[cell.index()]
    }

    /// Returns the location of a cell.
    pub fn cell_location(&self, cell: CellId) -> Location {
        self.cell_location[cell.index()]
    }

    /// Returns the cell at a location.
    pub fn loc_cell(&self, loc: Location) -> Option<CellId> {
        self.loc_cell.get(&loc).copied()
    }

    /// Returns all cells of a kind, in ascending id order.
    pub fn cells_of_type(&self, kind: CellType) -> &[CellId] {
        &self.cell_type_cells[kind.index()]
    }

    /// Rebuilds both reverse indices from the dense tables after decoding.
    pub(crate) fn reindex(&mut self) -> Result<(), ChipDbError> {
        if self.cell_type.len() != self.cell_location.len() {
            return Err(ChipDbError::CellTableLength {
                types: self.cell_type.len(),
                locations: self.cell_location.len(),
            });
        }
        self.loc_cell.clear();
        for cells in &mut self.cell_type_cells {
            cells.clear();
        }
        for (i, (&kind, &loc)) in self.cell_type.iter().zip(&self.cell_location).enumerate() {
            let id = CellId::from_index(i);
            if self.loc_cell.insert(loc, id).is_some() {
                return Err(ChipDbError::DuplicateLocation(loc));
            }
            self.cell_type_cells[kind.index()].push(id);
        }
        Ok(())
    }
}
