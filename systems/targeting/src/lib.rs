#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection system that picks the richest reachable cell near a unit.

use harvest_fleet_core::{CellCoord, Direction, Tuning, UnitSnapshot};
use harvest_fleet_world::{median, toroidal_distance, TurnContext};
use tracing::debug;

/// Outcome of a successful neighborhood scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Cell the unit should harvest next.
    pub target: CellCoord,
    /// Resource level used for the stay-and-harvest decision.
    pub median: f64,
}

/// Scans a bounded window around each harvesting unit.
///
/// The selector reuses its scratch buffer between units to avoid repeated
/// allocations during a turn.
#[derive(Debug)]
pub struct TargetSelector {
    tuning: Tuning,
    samples: Vec<u32>,
}

impl TargetSelector {
    /// Creates a selector using the supplied tuning.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            samples: Vec::new(),
        }
    }

    /// Picks a target for the unit and reserves it in the turn context.
    ///
    /// The window spans `2 * scan_radius` cells per side starting
    /// `scan_radius` cells before the unit and does not wrap around the grid
    /// edges. Cells that are occupied, claimed or already reserved by an
    /// earlier unit are skipped. The richest remaining cell wins; ties go to
    /// the cell nearest to the unit, then to the first one scanned in
    /// row-major order. Returns `None` when the window holds no eligible cell.
    pub fn select(
        &mut self,
        ctx: &mut TurnContext,
        unit: &UnitSnapshot,
        index: usize,
    ) -> Option<Selection> {
        let (columns, rows) = ctx.grid().dimensions();
        let radius = i64::from(self.tuning.scan_radius);
        let column_span = window(unit.cell.column(), radius, columns);
        let row_span = window(unit.cell.row(), radius, rows);

        self.samples.clear();
        let mut best: Option<Candidate> = None;

        for row in row_span.0..row_span.1 {
            for column in column_span.0..column_span.1 {
                let cell = CellCoord::new(column, row);
                if ctx.grid().is_occupied(cell) || ctx.is_reserved(cell) {
                    continue;
                }

                let candidate = Candidate {
                    cell,
                    resource: ctx.grid().resource(cell),
                    distance: toroidal_distance(unit.cell, cell, columns, rows),
                };
                self.samples.push(candidate.resource);
                best = Some(match best {
                    Some(existing) if !candidate.is_better_than(existing) => existing,
                    _ => candidate,
                });
            }
        }

        let Some(best) = best else {
            debug!(unit = unit.id.get(), "no eligible target in scan window");
            return None;
        };

        let local_median = median(&mut self.samples).unwrap_or(0.0);
        let median = if index % self.tuning.median_stride.max(1) == 0 {
            ctx.grid().median_resource()
        } else {
            local_median
        };

        // The target, its four neighbors and the unit's own cell.
        let grid = ctx.grid();
        let exclusions = [
            best.cell,
            grid.neighbor(best.cell, Direction::North),
            grid.neighbor(best.cell, Direction::East),
            grid.neighbor(best.cell, Direction::South),
            grid.neighbor(best.cell, Direction::West),
            unit.cell,
        ];
        ctx.reserve_target(best.cell, exclusions);

        debug!(
            unit = unit.id.get(),
            target = ?best.cell,
            resource = best.resource,
            median,
            "target selected"
        );

        Some(Selection {
            target: best.cell,
            median,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cell: CellCoord,
    resource: u32,
    distance: u32,
}

impl Candidate {
    fn is_better_than(self, other: Candidate) -> bool {
        self.resource > other.resource
            || (self.resource == other.resource && self.distance < other.distance)
    }
}

/// Half-open range `[position - radius, position + radius)` clipped to the grid.
fn window(position: u32, radius: i64, length: u32) -> (u32, u32) {
    let start = (i64::from(position) - radius).max(0);
    let end = (i64::from(position) + radius).min(i64::from(length));
    let start = u32::try_from(start).unwrap_or(0);
    let end = u32::try_from(end).unwrap_or(0);
    (start, end.max(start))
}
