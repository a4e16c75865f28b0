#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-step navigation with toroidal routing and negotiated swaps.
//!
//! The navigator turns a unit and a target into at most one cardinal step.
//! Every step it hands out is claimed in the [`TurnContext`] so units
//! processed later route around it. When a friendly unit of the other role
//! blocks the way, the two units exchange cells in the same turn: the
//! blocking unit is committed on the spot, which is why the navigator also
//! needs the fleet snapshot and the status ledger.

use harvest_fleet_core::{CellCoord, Direction, FleetMode, FleetView, Role, Tuning, UnitSnapshot};
use harvest_fleet_world::{axis_steps, Occupant, StatusLedger, TurnContext};
use tracing::{debug, info, warn};

/// Pure system that resolves one move per call.
#[derive(Clone, Copy, Debug)]
pub struct Navigator {
    tuning: Tuning,
}

/// Shared state a navigation call reads and updates.
#[derive(Debug)]
pub struct NavigationScope<'a> {
    /// Turn-scoped claims and commitments.
    pub ctx: &'a mut TurnContext,
    /// Cross-turn roles and intended positions.
    pub ledger: &'a mut StatusLedger,
    /// Friendly units present this turn.
    pub fleet: &'a FleetView,
}

/// Reasons an axis cannot be used for the current unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Blocked {
    Unresolved,
    SameRole,
    AlreadyCommitted,
    InsufficientCargo,
}

impl Navigator {
    /// Creates a navigator using the supplied tuning.
    #[must_use]
    pub const fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Computes the unit's step toward `target`, or `None` to hold.
    ///
    /// Axes are tried horizontal first. When neither axis is usable the unit
    /// backs off along the opposite directions onto the richest free cell, and
    /// holds if there is none.
    pub fn navigate(
        &self,
        scope: &mut NavigationScope<'_>,
        unit: &UnitSnapshot,
        target: CellCoord,
        index: usize,
        mode: FleetMode,
    ) -> Option<Direction> {
        let (columns, rows) = scope.ctx.grid().dimensions();
        let intended: Vec<Direction> = axis_steps(unit.cell, target, columns, rows).collect();

        for &direction in &intended {
            let destination = scope.ctx.grid().neighbor(unit.cell, direction);
            let usable = match mode {
                FleetMode::Endgame => self.try_endgame_step(scope, destination),
                FleetMode::Normal => self.try_step(scope, unit, direction, destination, index),
            };
            if usable {
                return Some(direction);
            }
        }

        self.fall_back(scope, unit, &intended)
    }

    fn try_endgame_step(&self, scope: &mut NavigationScope<'_>, destination: CellCoord) -> bool {
        if !scope.ctx.grid().is_occupied(destination) {
            scope.ctx.claim(destination);
            return true;
        }

        // The home base absorbs any number of arriving units.
        destination == scope.ctx.home_base()
    }

    fn try_step(
        &self,
        scope: &mut NavigationScope<'_>,
        unit: &UnitSnapshot,
        direction: Direction,
        destination: CellCoord,
        index: usize,
    ) -> bool {
        let grid = scope.ctx.grid();
        if grid.occupant(destination) == Some(Occupant::Opponent) {
            // Two units never share an opponent's cell, even when forcing.
            if scope.ctx.force_return() && !grid.is_claimed(destination) {
                debug!(unit = unit.id.get(), ?destination, "forcing through opponent");
                scope.ctx.claim(destination);
                return true;
            }
            debug!(unit = unit.id.get(), ?destination, "opponent ahead");
            return false;
        }

        if !grid.is_occupied(destination) {
            scope.ctx.claim(destination);
            return true;
        }

        match self.negotiate_swap(scope, unit, direction, destination, index) {
            Ok(()) => true,
            Err(Blocked::Unresolved) => {
                info!(
                    unit = unit.id.get(),
                    ?destination,
                    "occupant unresolved; axis unusable this turn"
                );
                false
            }
            Err(reason) => {
                debug!(unit = unit.id.get(), ?destination, ?reason, "axis blocked");
                false
            }
        }
    }

    /// Exchanges cells with the friendly unit standing on `destination`.
    fn negotiate_swap(
        &self,
        scope: &mut NavigationScope<'_>,
        unit: &UnitSnapshot,
        direction: Direction,
        destination: CellCoord,
        index: usize,
    ) -> Result<(), Blocked> {
        let other = scope
            .ledger
            .intending(destination)
            .filter(|other_id| *other_id != unit.id)
            .and_then(|other_id| scope.fleet.get(other_id))
            .filter(|other| other.cell == destination)
            .copied()
            .ok_or(Blocked::Unresolved)?;

        let own_role = scope.ledger.role(unit.id).ok_or(Blocked::Unresolved)?;
        let other_role = scope.ledger.role(other.id).ok_or(Blocked::Unresolved)?;
        if own_role == other_role {
            return Err(Blocked::SameRole);
        }

        if scope.ctx.is_committed(other.id) {
            return Err(Blocked::AlreadyCommitted);
        }

        let harvester = if own_role == Role::Harvesting {
            unit
        } else {
            &other
        };
        if !self.can_leave_cell(scope.ctx, harvester) {
            return Err(Blocked::InsufficientCargo);
        }

        let displacement = direction.opposite();
        if let Err(error) = scope.ctx.commit(other.id, index, Some(displacement)) {
            warn!(%error, "swap partner changed its move mid-turn");
            return Err(Blocked::AlreadyCommitted);
        }
        scope.ctx.claim(unit.cell);
        scope.ledger.stamp_intended(other.id, unit.cell);
        scope.ctx.claim(destination);

        info!(
            unit = unit.id.get(),
            partner = other.id.get(),
            ?direction,
            "negotiated swap"
        );
        Ok(())
    }

    /// Reports whether the harvesting side of a swap can pay to move.
    fn can_leave_cell(&self, ctx: &TurnContext, harvester: &UnitSnapshot) -> bool {
        if harvester.cell == ctx.home_base() {
            return true;
        }
        let resource = ctx.grid().resource(harvester.cell);
        self.tuning.cargo_after_tax(harvester.cargo, resource) >= 0
    }

    fn fall_back(
        &self,
        scope: &mut NavigationScope<'_>,
        unit: &UnitSnapshot,
        intended: &[Direction],
    ) -> Option<Direction> {
        let mut best: Option<(Direction, CellCoord, u32)> = None;

        let grid = scope.ctx.grid();
        for direction in intended.iter().map(|direction| direction.opposite()) {
            let cell = grid.neighbor(unit.cell, direction);
            let resource = grid.resource(cell);
            if grid.is_occupied(cell) || resource == 0 {
                continue;
            }
            if best.map_or(true, |(_, _, current)| resource > current) {
                best = Some((direction, cell, resource));
            }
        }

        let Some((direction, cell, _)) = best else {
            debug!(unit = unit.id.get(), "no viable move; holding");
            return None;
        };

        scope.ctx.claim(cell);
        debug!(unit = unit.id.get(), ?direction, "backing off");
        Some(direction)
    }
}
