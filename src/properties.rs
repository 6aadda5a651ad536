//! Sparse per-cell boolean attributes
//!
//! The store is the single authority pathfinding consults. A flag that was
//! never written reads back as false, so unseeded cells are closed to
//! traversal.

use std::collections::{HashMap, HashSet};

use crate::terrain::TerrainClass;
use crate::tilemap::{Cell, OutOfBounds, Tilemap};

/// Named boolean attribute of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileFlag {
    Walkable,
    Buildable,
    Water,
    Blocked,
}

/// Flag set for a single cell.
///
/// Absence of a flag is distinct from a flag stored as false; readers that
/// need a plain bool go through [`PropertyRecord::get`], which defaults
/// absent flags to false.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyRecord {
    flags: HashMap<TileFlag, bool>,
}

impl PropertyRecord {
    /// Store `flag`, overwriting any previous value.
    pub fn set(&mut self, flag: TileFlag, value: bool) {
        self.flags.insert(flag, value);
    }

    pub fn remove(&mut self, flag: TileFlag) {
        self.flags.remove(&flag);
    }

    pub fn has(&self, flag: TileFlag) -> bool {
        self.flags.contains_key(&flag)
    }

    /// Flag value, defaulting to false when the flag was never set.
    pub fn get(&self, flag: TileFlag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileFlag, bool)> + '_ {
        self.flags.iter().map(|(flag, value)| (*flag, *value))
    }
}

/// Sparse map from cell to property record over a fixed-size grid.
///
/// Records exist only for cells that were seeded or edited. Mutations on
/// out-of-grid coordinates are rejected with [`OutOfBounds`]; queries on
/// cells that simply have no record return defaults, which is a normal,
/// expected path.
#[derive(Clone, Debug)]
pub struct PropertyStore {
    width: usize,
    height: usize,
    records: HashMap<Cell, PropertyRecord>,
    /// Cells touched by mutations after seeding.
    edited: HashSet<Cell>,
}

impl PropertyStore {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            records: HashMap::new(),
            edited: HashSet::new(),
        }
    }

    /// Seed one record per terrain cell: grass is walkable, water is
    /// blocked. The returned store has empty edit tracking.
    pub fn seed_from_terrain(terrain: &Tilemap<TerrainClass>) -> Self {
        let mut store = Self::new(terrain.width, terrain.height);
        for (x, y, class) in terrain.iter() {
            let mut record = PropertyRecord::default();
            match class {
                TerrainClass::Grass => {
                    record.set(TileFlag::Walkable, true);
                    record.set(TileFlag::Blocked, false);
                }
                TerrainClass::Water => {
                    record.set(TileFlag::Walkable, false);
                    record.set(TileFlag::Blocked, true);
                }
            }
            store.records.insert(Cell::new(x as i32, y as i32), record);
        }
        store
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Create or update `flag` on the cell's record, creating the record
    /// when missing.
    pub fn add(&mut self, cell: Cell, flag: TileFlag, value: bool) -> Result<(), OutOfBounds> {
        self.check_bounds(cell)?;
        self.records.entry(cell).or_default().set(flag, value);
        self.edited.insert(cell);
        Ok(())
    }

    /// Same contract as [`PropertyStore::add`]: creates the record when
    /// missing and overwrites the flag when present.
    pub fn set(&mut self, cell: Cell, flag: TileFlag, value: bool) -> Result<(), OutOfBounds> {
        self.add(cell, flag, value)
    }

    pub fn remove(&mut self, cell: Cell, flag: TileFlag) -> Result<(), OutOfBounds> {
        self.check_bounds(cell)?;
        if let Some(record) = self.records.get_mut(&cell) {
            record.remove(flag);
            self.edited.insert(cell);
        }
        Ok(())
    }

    /// Drop every flag on the cell, leaving an empty record.
    pub fn clear(&mut self, cell: Cell) -> Result<(), OutOfBounds> {
        self.check_bounds(cell)?;
        if let Some(record) = self.records.get_mut(&cell) {
            record.clear();
            self.edited.insert(cell);
        }
        Ok(())
    }

    /// True when the cell has `flag` recorded, with either value.
    ///
    /// Panics on out-of-grid coordinates; a cell with no record is normal
    /// and reads false.
    pub fn has(&self, cell: Cell, flag: TileFlag) -> bool {
        self.assert_bounds(cell);
        self.records.get(&cell).is_some_and(|r| r.has(flag))
    }

    /// Flag value for a cell. Absent records and absent flags both read
    /// as false, the closed-world default.
    ///
    /// Panics on out-of-grid coordinates.
    pub fn get(&self, cell: Cell, flag: TileFlag) -> bool {
        self.assert_bounds(cell);
        self.records.get(&cell).is_some_and(|r| r.get(flag))
    }

    /// The cell's record, or None when it has none.
    ///
    /// Panics on out-of-grid coordinates.
    pub fn get_all(&self, cell: Cell) -> Option<&PropertyRecord> {
        self.assert_bounds(cell);
        self.records.get(&cell)
    }

    /// Cells whose records were mutated after seeding.
    pub fn edited_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.edited.iter().copied()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Reinstate a record wholesale, marking the cell edited. Used by
    /// regeneration when carrying hand edits across a reseed.
    pub(crate) fn restore_record(&mut self, cell: Cell, record: PropertyRecord) {
        debug_assert!(self.in_bounds(cell));
        self.records.insert(cell, record);
        self.edited.insert(cell);
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), OutOfBounds> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn assert_bounds(&self, cell: Cell) {
        assert!(
            self.in_bounds(cell),
            "cell {} is outside the {}x{} grid",
            cell,
            self.width,
            self.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_get_roundtrip() {
        let mut store = PropertyStore::new(10, 10);
        let cell = Cell::new(3, 4);
        store.add(cell, TileFlag::Buildable, true).unwrap();
        assert!(store.get(cell, TileFlag::Buildable));
        assert!(store.has(cell, TileFlag::Buildable));
    }

    #[test]
    fn test_remove_then_has_is_false() {
        let mut store = PropertyStore::new(10, 10);
        let cell = Cell::new(1, 1);
        store.add(cell, TileFlag::Walkable, true).unwrap();
        store.remove(cell, TileFlag::Walkable).unwrap();
        assert!(!store.has(cell, TileFlag::Walkable));
        assert!(!store.get(cell, TileFlag::Walkable));
    }

    #[test]
    fn test_clear_empties_record() {
        let mut store = PropertyStore::new(10, 10);
        let cell = Cell::new(2, 2);
        store.add(cell, TileFlag::Walkable, true).unwrap();
        store.add(cell, TileFlag::Buildable, false).unwrap();
        store.clear(cell).unwrap();
        assert!(store.get_all(cell).is_some_and(|r| r.is_empty()));
    }

    #[test]
    fn test_unknown_cell_reads_defaults() {
        let store = PropertyStore::new(10, 10);
        let cell = Cell::new(5, 5);
        // No record at all: not an error, just the closed-world default.
        assert!(!store.get(cell, TileFlag::Walkable));
        assert!(!store.has(cell, TileFlag::Walkable));
        assert!(store.get_all(cell).is_none());
    }

    #[test]
    fn test_flag_stored_false_differs_from_absent() {
        let mut store = PropertyStore::new(10, 10);
        let cell = Cell::new(0, 0);
        store.add(cell, TileFlag::Blocked, false).unwrap();
        assert!(store.has(cell, TileFlag::Blocked));
        assert!(!store.get(cell, TileFlag::Blocked));
    }

    #[test]
    fn test_out_of_grid_mutation_fails_fast() {
        let mut store = PropertyStore::new(4, 4);
        let err = store.add(Cell::new(4, 0), TileFlag::Walkable, true);
        assert_eq!(
            err,
            Err(OutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 4
            })
        );
        assert!(store
            .add(Cell::new(-1, 2), TileFlag::Walkable, true)
            .is_err());
    }

    #[test]
    #[should_panic(expected = "outside the")]
    fn test_out_of_grid_query_panics() {
        let store = PropertyStore::new(4, 4);
        store.get(Cell::new(0, -1), TileFlag::Walkable);
    }

    #[test]
    fn test_seeding_from_terrain() {
        let mut terrain = Tilemap::new_with(2, 1, TerrainClass::Grass);
        terrain.set(1, 0, TerrainClass::Water);
        let store = PropertyStore::seed_from_terrain(&terrain);

        assert_eq!(store.record_count(), 2);
        assert!(store.get(Cell::new(0, 0), TileFlag::Walkable));
        assert!(!store.get(Cell::new(0, 0), TileFlag::Blocked));
        assert!(store.has(Cell::new(0, 0), TileFlag::Blocked));
        assert!(!store.get(Cell::new(1, 0), TileFlag::Walkable));
        assert!(store.get(Cell::new(1, 0), TileFlag::Blocked));
        assert_eq!(store.edited_cells().count(), 0);
    }

    #[test]
    fn test_edit_tracking() {
        let terrain = Tilemap::new_with(3, 3, TerrainClass::Grass);
        let mut store = PropertyStore::seed_from_terrain(&terrain);
        store.set(Cell::new(1, 1), TileFlag::Walkable, false).unwrap();
        store.remove(Cell::new(2, 2), TileFlag::Blocked).unwrap();

        let edited: HashSet<Cell> = store.edited_cells().collect();
        assert_eq!(
            edited,
            HashSet::from([Cell::new(1, 1), Cell::new(2, 2)])
        );
    }
}
