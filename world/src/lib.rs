#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-scoped world state for the Harvest Fleet decision engine.
//!
//! The [`GridView`] wraps the host's per-turn grid snapshot and layers the
//! claimed overlay on top of it, [`TurnContext`] carries every piece of state
//! that lives for a single turn, and [`StatusLedger`] is the only memory the
//! engine keeps between turns.

mod ledger;
mod torus;
mod turn;

use std::collections::BTreeSet;

use harvest_fleet_core::{CellCoord, Direction, TurnSnapshot, UnitId};

pub use ledger::{StatusLedger, UnitStatus};
pub use torus::{axis_steps, toroidal_distance};
pub use turn::{CommitError, Commitment, TurnContext};

/// Reasons a turn snapshot cannot be turned into a grid view.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The grid has no cells.
    #[error("grid dimensions {columns}x{rows} are empty")]
    EmptyGrid {
        /// Number of columns reported by the host.
        columns: u32,
        /// Number of rows reported by the host.
        rows: u32,
    },
    /// The resource vector does not cover the grid exactly.
    #[error("expected {expected} resource values, got {actual}")]
    ResourceCountMismatch {
        /// Number of cells in the grid.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A coordinate lies outside the grid.
    #[error("{what} at ({column}, {row}) lies outside the grid")]
    OutOfBounds {
        /// Description of the misplaced entity.
        what: &'static str,
        /// Column supplied by the host.
        column: u32,
        /// Row supplied by the host.
        row: u32,
    },
    /// The same unit identifier was reported twice.
    #[error("unit {0} appears more than once in the snapshot")]
    DuplicateUnit(u32),
}

/// Entity standing on a cell at the start of the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// A friendly unit.
    Unit(UnitId),
    /// A unit owned by another player.
    Opponent,
}

/// Toroidal grid of resources and occupants with a per-turn claim overlay.
#[derive(Clone, Debug)]
pub struct GridView {
    columns: u32,
    rows: u32,
    resources: Vec<u32>,
    occupants: Vec<Option<Occupant>>,
    claimed: Vec<bool>,
}

impl GridView {
    /// Creates a grid without occupants from row-major resource amounts.
    pub fn new(columns: u32, rows: u32, resources: Vec<u32>) -> Result<Self, SnapshotError> {
        if columns == 0 || rows == 0 {
            return Err(SnapshotError::EmptyGrid { columns, rows });
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if resources.len() != expected {
            return Err(SnapshotError::ResourceCountMismatch {
                expected,
                actual: resources.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            resources,
            occupants: vec![None; expected],
            claimed: vec![false; expected],
        })
    }

    /// Builds the grid described by a turn snapshot, placing every unit.
    pub fn from_snapshot(snapshot: &TurnSnapshot) -> Result<Self, SnapshotError> {
        let mut grid = Self::new(snapshot.columns, snapshot.rows, snapshot.resources.clone())?;

        if !grid.contains(snapshot.home_base) {
            return Err(out_of_bounds("home base", snapshot.home_base));
        }

        let mut seen = BTreeSet::new();
        for unit in &snapshot.units {
            if !seen.insert(unit.id) {
                return Err(SnapshotError::DuplicateUnit(unit.id.get()));
            }
            grid.place(unit.cell, Occupant::Unit(unit.id))
                .map_err(|cell| out_of_bounds("unit", cell))?;
        }

        for &cell in &snapshot.opponents {
            grid.place(cell, Occupant::Opponent)
                .map_err(|cell| out_of_bounds("opponent", cell))?;
        }

        Ok(grid)
    }

    /// Places an occupant on the cell, replacing any previous one.
    ///
    /// Returns the cell back when it lies outside the grid.
    pub fn place(&mut self, cell: CellCoord, occupant: Occupant) -> Result<(), CellCoord> {
        let index = self.index(cell).ok_or(cell)?;
        self.occupants[index] = Some(occupant);
        Ok(())
    }

    /// Provides the dimensions of the grid as columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Resource amount stored in the cell; zero outside the grid.
    #[must_use]
    pub fn resource(&self, cell: CellCoord) -> u32 {
        self.index(cell)
            .and_then(|index| self.resources.get(index).copied())
            .unwrap_or(0)
    }

    /// Entity standing on the cell at the start of the turn.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.index(cell)
            .and_then(|index| self.occupants.get(index).copied().flatten())
    }

    /// Reports whether a unit already claimed the cell this turn.
    #[must_use]
    pub fn is_claimed(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.claimed.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the cell is held by an occupant or a claim.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_some() || self.is_claimed(cell)
    }

    /// Marks the cell as some unit's destination for this turn.
    pub fn claim(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.claimed.get_mut(index)) {
            *slot = true;
        }
    }

    /// Cell reached by a single step from `cell`, wrapping around the edges.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        torus::offset(cell, direction, self.columns, self.rows)
    }

    /// Median resource amount across the whole grid.
    #[must_use]
    pub fn median_resource(&self) -> f64 {
        let mut values = self.resources.clone();
        median(&mut values).unwrap_or(0.0)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Median of the values, averaging the two middle entries of an even count.
///
/// The slice is reordered in place. Returns `None` when it is empty.
pub fn median(values: &mut [u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable();
    let middle = values.len() / 2;
    let upper = f64::from(values[middle]);
    if values.len() % 2 == 1 {
        return Some(upper);
    }
    let lower = f64::from(values[middle - 1]);
    Some((lower + upper) / 2.0)
}

fn out_of_bounds(what: &'static str, cell: CellCoord) -> SnapshotError {
    SnapshotError::OutOfBounds {
        what,
        column: cell.column(),
        row: cell.row(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_fleet_core::UnitSnapshot;

    fn snapshot(units: Vec<UnitSnapshot>, opponents: Vec<CellCoord>) -> TurnSnapshot {
        TurnSnapshot {
            turn: 1,
            total_turns: 400,
            funds: 5000,
            production_cost: 1000,
            max_cargo: 1000,
            home_base: CellCoord::new(2, 2),
            columns: 4,
            rows: 3,
            resources: (0..12).collect(),
            units,
            opponents,
        }
    }

    fn unit(id: u32, column: u32, row: u32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            cell: CellCoord::new(column, row),
            cargo: 0,
            is_full: false,
        }
    }

    #[test]
    fn from_snapshot_places_units_and_opponents() {
        let grid = GridView::from_snapshot(&snapshot(
            vec![unit(3, 1, 1)],
            vec![CellCoord::new(0, 2)],
        ))
        .expect("valid snapshot");

        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.resource(CellCoord::new(3, 1)), 7);
        assert_eq!(
            grid.occupant(CellCoord::new(1, 1)),
            Some(Occupant::Unit(UnitId::new(3)))
        );
        assert_eq!(grid.occupant(CellCoord::new(0, 2)), Some(Occupant::Opponent));
        assert!(!grid.is_occupied(CellCoord::new(0, 0)));
    }

    #[test]
    fn from_snapshot_rejects_malformed_input() {
        let mut bad = snapshot(Vec::new(), Vec::new());
        let _ = bad.resources.pop();
        assert_eq!(
            GridView::from_snapshot(&bad).err(),
            Some(SnapshotError::ResourceCountMismatch {
                expected: 12,
                actual: 11
            })
        );

        let duplicate = snapshot(vec![unit(1, 0, 0), unit(1, 1, 0)], Vec::new());
        assert_eq!(
            GridView::from_snapshot(&duplicate).err(),
            Some(SnapshotError::DuplicateUnit(1))
        );

        let stray = snapshot(vec![unit(1, 9, 0)], Vec::new());
        assert!(matches!(
            GridView::from_snapshot(&stray),
            Err(SnapshotError::OutOfBounds { what: "unit", .. })
        ));
    }

    #[test]
    fn claims_count_as_occupied() {
        let mut grid = GridView::new(2, 2, vec![0; 4]).expect("grid");
        let cell = CellCoord::new(1, 0);
        assert!(!grid.is_occupied(cell));
        grid.claim(cell);
        assert!(grid.is_claimed(cell));
        assert!(grid.is_occupied(cell));
    }

    #[test]
    fn median_averages_even_counts() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [5, 1, 3]), Some(3.0));
        assert_eq!(median(&mut [4, 1, 3, 10]), Some(3.5));

        let grid = GridView::new(2, 2, vec![10, 0, 30, 20]).expect("grid");
        assert!((grid.median_resource() - 15.0).abs() < f64::EPSILON);
    }
}
