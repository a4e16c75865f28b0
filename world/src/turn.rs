//! State that lives for exactly one turn.

use std::collections::{BTreeMap, BTreeSet};

use harvest_fleet_core::{CellCoord, Command, Direction, FleetView, UnitId};

use crate::{GridView, Occupant};

/// Errors raised when a unit's move for the turn is already settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// The unit was committed earlier this turn with a different step.
    #[error(
        "unit {} already committed at index {} to {:?}",
        .unit_id.get(),
        .existing.index,
        .existing.step
    )]
    AlreadyCommitted {
        /// Unit whose move was requested twice.
        unit_id: UnitId,
        /// Commitment recorded first.
        existing: Commitment,
    },
}

/// Final move decided for a unit this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment {
    /// Enumeration index of the unit whose processing decided the move.
    pub index: usize,
    /// Step taken, or `None` to hold the cell.
    pub step: Option<Direction>,
}

/// Turn-scoped claims, exclusions and commitments threaded through the systems.
///
/// A context is created from the turn's [`GridView`] and dropped once the
/// commands are emitted. Units are processed in enumeration order, so every
/// claim or commitment recorded here takes priority over later units.
#[derive(Debug)]
pub struct TurnContext {
    grid: GridView,
    home_base: CellCoord,
    force_return: bool,
    targets: BTreeSet<CellCoord>,
    exclusions: BTreeSet<CellCoord>,
    commitments: BTreeMap<UnitId, Commitment>,
    commit_order: Vec<UnitId>,
}

impl TurnContext {
    /// Starts a turn over the provided grid.
    ///
    /// The force-return flag is raised when an opponent sits on the home base.
    #[must_use]
    pub fn begin(grid: GridView, home_base: CellCoord) -> Self {
        let force_return = grid.occupant(home_base) == Some(Occupant::Opponent);
        Self {
            grid,
            home_base,
            force_return,
            targets: BTreeSet::new(),
            exclusions: BTreeSet::new(),
            commitments: BTreeMap::new(),
            commit_order: Vec::new(),
        }
    }

    /// Grid and claim overlay for the turn.
    #[must_use]
    pub const fn grid(&self) -> &GridView {
        &self.grid
    }

    /// Marks the cell as some unit's destination for this turn.
    pub fn claim(&mut self, cell: CellCoord) {
        self.grid.claim(cell);
    }

    /// Cell hosting the home base.
    #[must_use]
    pub const fn home_base(&self) -> CellCoord {
        self.home_base
    }

    /// Reports whether an opponent occupies the home base this turn.
    #[must_use]
    pub const fn force_return(&self) -> bool {
        self.force_return
    }

    /// Records a harvesting target together with the cells around it.
    pub fn reserve_target<I>(&mut self, target: CellCoord, excluded: I)
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let _ = self.targets.insert(target);
        self.exclusions.extend(excluded);
    }

    /// Reports whether an earlier unit already reserved the cell or its surroundings.
    #[must_use]
    pub fn is_reserved(&self, cell: CellCoord) -> bool {
        self.targets.contains(&cell) || self.exclusions.contains(&cell)
    }

    /// Settles the unit's move for the turn.
    ///
    /// Committing the same step twice is a no-op; a different step is refused
    /// so a settled unit never changes its move.
    pub fn commit(
        &mut self,
        unit_id: UnitId,
        index: usize,
        step: Option<Direction>,
    ) -> Result<(), CommitError> {
        if let Some(existing) = self.commitments.get(&unit_id) {
            if existing.step == step {
                return Ok(());
            }
            return Err(CommitError::AlreadyCommitted {
                unit_id,
                existing: *existing,
            });
        }

        let _ = self.commitments.insert(unit_id, Commitment { index, step });
        self.commit_order.push(unit_id);
        Ok(())
    }

    /// Reports whether the unit's move is already settled.
    #[must_use]
    pub fn is_committed(&self, unit_id: UnitId) -> bool {
        self.commitments.contains_key(&unit_id)
    }

    /// Commitment recorded for the unit, if any.
    #[must_use]
    pub fn commitment(&self, unit_id: UnitId) -> Option<Commitment> {
        self.commitments.get(&unit_id).copied()
    }

    /// Ends the turn, yielding one command per fleet unit in commit order.
    ///
    /// Units that never committed hold their cell.
    #[must_use]
    pub fn into_commands(self, fleet: &FleetView) -> Vec<Command> {
        let mut commands: Vec<Command> = self
            .commit_order
            .iter()
            .filter(|unit_id| fleet.contains(**unit_id))
            .filter_map(|unit_id| {
                self.commitments
                    .get(unit_id)
                    .map(|commitment| Command::for_step(*unit_id, commitment.step))
            })
            .collect();

        commands.extend(
            fleet
                .iter()
                .filter(|unit| !self.commitments.contains_key(&unit.id))
                .map(|unit| Command::HoldUnit { unit_id: unit.id }),
        );

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_fleet_core::UnitSnapshot;

    fn context() -> TurnContext {
        let grid = GridView::new(4, 4, vec![0; 16]).expect("grid");
        TurnContext::begin(grid, CellCoord::new(0, 0))
    }

    #[test]
    fn opponent_on_home_base_raises_force_return() {
        let mut grid = GridView::new(4, 4, vec![0; 16]).expect("grid");
        grid.place(CellCoord::new(1, 1), Occupant::Opponent)
            .expect("inside grid");
        assert!(TurnContext::begin(grid.clone(), CellCoord::new(1, 1)).force_return());
        assert!(!TurnContext::begin(grid, CellCoord::new(0, 0)).force_return());
    }

    #[test]
    fn commit_is_idempotent_and_never_changes_a_settled_move() {
        let mut ctx = context();
        let unit = UnitId::new(5);

        assert!(ctx.commit(unit, 0, Some(Direction::East)).is_ok());
        assert!(ctx.commit(unit, 3, Some(Direction::East)).is_ok());
        assert_eq!(
            ctx.commit(unit, 3, None),
            Err(CommitError::AlreadyCommitted {
                unit_id: unit,
                existing: Commitment {
                    index: 0,
                    step: Some(Direction::East)
                }
            })
        );
        assert_eq!(ctx.commitment(unit).map(|c| c.index), Some(0));
    }

    #[test]
    fn reserved_cells_include_target_and_exclusions() {
        let mut ctx = context();
        ctx.reserve_target(CellCoord::new(2, 2), [CellCoord::new(2, 1)]);
        assert!(ctx.is_reserved(CellCoord::new(2, 2)));
        assert!(ctx.is_reserved(CellCoord::new(2, 1)));
        assert!(!ctx.is_reserved(CellCoord::new(3, 3)));
    }

    #[test]
    fn into_commands_emits_every_unit_once() {
        let unit = |id| UnitSnapshot {
            id: UnitId::new(id),
            cell: CellCoord::new(id, 0),
            cargo: 0,
            is_full: false,
        };
        let fleet = FleetView::from_snapshots(vec![unit(1), unit(2), unit(3)]);
        let mut ctx = context();
        ctx.commit(UnitId::new(3), 0, Some(Direction::South))
            .expect("first commit");
        ctx.commit(UnitId::new(1), 1, None).expect("first commit");

        assert_eq!(
            ctx.into_commands(&fleet),
            vec![
                Command::StepUnit {
                    unit_id: UnitId::new(3),
                    direction: Direction::South
                },
                Command::HoldUnit {
                    unit_id: UnitId::new(1)
                },
                Command::HoldUnit {
                    unit_id: UnitId::new(2)
                },
            ]
        );
    }
}
