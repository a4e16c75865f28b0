#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler that drives every system once per snapshot.
//!
//! The scheduler owns the only state that outlives a turn, the
//! [`StatusLedger`]. Everything else is rebuilt from the snapshot: the grid,
//! the fleet view and the [`TurnContext`] that carries claims and
//! commitments between units. Units are processed in ascending identifier
//! order, and that order is the priority mechanism: a unit processed earlier
//! claims cells and settles swap partners before later units look at them.

use std::time::Instant;

use harvest_fleet_core::{
    CellCoord, Command, FleetMode, FleetView, Role, Tuning, TurnOrders, TurnSnapshot,
    UnitSnapshot,
};
use harvest_fleet_system_navigation::{NavigationScope, Navigator};
use harvest_fleet_system_roles::RoleAssigner;
use harvest_fleet_system_targeting::TargetSelector;
use harvest_fleet_world::{GridView, SnapshotError, StatusLedger, TurnContext};
use tracing::{debug, info, warn};

/// Decision core that turns snapshots into orders.
#[derive(Debug)]
pub struct TurnScheduler {
    tuning: Tuning,
    ledger: StatusLedger,
    roles: RoleAssigner,
    targeting: TargetSelector,
    navigator: Navigator,
}

impl TurnScheduler {
    /// Creates a scheduler with an empty ledger.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            ledger: StatusLedger::new(),
            roles: RoleAssigner::new(tuning),
            targeting: TargetSelector::new(tuning),
            navigator: Navigator::new(tuning),
        }
    }

    /// Roles and intended positions carried between turns.
    #[must_use]
    pub const fn ledger(&self) -> &StatusLedger {
        &self.ledger
    }

    /// Decides the orders for one turn.
    ///
    /// Every unit in the snapshot receives exactly one command. The snapshot
    /// is rejected before any state changes when its grid or unit positions
    /// are inconsistent.
    pub fn run_turn(&mut self, snapshot: &TurnSnapshot) -> Result<TurnOrders, SnapshotError> {
        let started = Instant::now();
        let grid = GridView::from_snapshot(snapshot)?;
        let fleet = FleetView::from_snapshots(snapshot.units.clone());
        self.ingest(&fleet, snapshot.max_cargo);

        let mut ctx = TurnContext::begin(grid, snapshot.home_base);
        let mode = if self
            .tuning
            .endgame_active(snapshot.turn, snapshot.total_turns)
        {
            FleetMode::Endgame
        } else {
            FleetMode::Normal
        };
        if ctx.force_return() {
            warn!(turn = snapshot.turn, "opponent on home base");
        }

        for (index, unit) in fleet.iter().enumerate() {
            if ctx.is_committed(unit.id) {
                debug!(unit = unit.id.get(), "already committed by a swap");
                continue;
            }

            let role = self.roles.assign(
                &mut self.ledger,
                unit,
                snapshot.home_base,
                snapshot.max_cargo,
            );

            let step = match self.plan(&mut ctx, unit, role, mode, index, snapshot) {
                Some(target) => {
                    let mut scope = NavigationScope {
                        ctx: &mut ctx,
                        ledger: &mut self.ledger,
                        fleet: &fleet,
                    };
                    self.navigator
                        .navigate(&mut scope, unit, target, index, mode)
                }
                None => None,
            };

            let intended = step.map_or(unit.cell, |direction| {
                ctx.grid().neighbor(unit.cell, direction)
            });
            self.ledger.stamp_intended(unit.id, intended);
            if let Err(error) = ctx.commit(unit.id, index, step) {
                warn!(%error, "discarding conflicting move");
            }
        }

        let produce = self.should_produce(&ctx, snapshot);
        let mut commands = ctx.into_commands(&fleet);
        if produce {
            commands.push(Command::ProduceUnit);
        }

        info!(
            turn = snapshot.turn,
            units = fleet.len(),
            ?mode,
            produce,
            elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            "turn decided"
        );

        Ok(TurnOrders {
            turn: snapshot.turn,
            commands,
        })
    }

    /// Prunes vanished units and registers newly sighted ones.
    fn ingest(&mut self, fleet: &FleetView, max_cargo: u32) {
        let before = self.ledger.len();
        self.ledger.retain(|unit_id| fleet.contains(unit_id));
        let pruned = before - self.ledger.len();
        if pruned > 0 {
            debug!(pruned, "dropped vanished units from ledger");
        }

        for unit in fleet.iter() {
            self.roles.register(&mut self.ledger, unit, max_cargo);
        }
    }

    /// Picks the cell the unit should head for, or `None` to hold.
    fn plan(
        &mut self,
        ctx: &mut TurnContext,
        unit: &UnitSnapshot,
        role: Role,
        mode: FleetMode,
        index: usize,
        snapshot: &TurnSnapshot,
    ) -> Option<CellCoord> {
        let home_base = snapshot.home_base;
        if mode == FleetMode::Endgame {
            return Some(home_base);
        }

        match role {
            Role::Harvesting => {
                let selection = self.targeting.select(ctx, unit, index)?;
                let resource = ctx.grid().resource(unit.cell);
                if f64::from(resource) > self.tuning.stay_level(selection.median) {
                    debug!(unit = unit.id.get(), resource, "staying to harvest");
                    return None;
                }
                Some(selection.target)
            }
            Role::Returning => {
                if unit.cell == home_base {
                    return None;
                }
                let resource = ctx.grid().resource(unit.cell);
                if self.should_top_up(unit, resource, snapshot.max_cargo) {
                    debug!(
                        unit = unit.id.get(),
                        cargo = unit.cargo,
                        resource,
                        "topping up before returning"
                    );
                    return None;
                }
                Some(home_base)
            }
        }
    }

    /// Reports whether a returning unit should keep harvesting its cell.
    ///
    /// Loaded or full units always head home. A unit that dropped below the
    /// load line, for instance after paying a swap tax, waits only while its
    /// cell still holds enough to close the gap; mining moves resource into
    /// cargo, so the wait ends once cargo reaches the line.
    fn should_top_up(&self, unit: &UnitSnapshot, resource: u32, max_cargo: u32) -> bool {
        if unit.is_full || self.tuning.is_loaded(unit.cargo, max_cargo) {
            return false;
        }
        resource > 0
            && f64::from(unit.cargo) + f64::from(resource) >= self.tuning.return_load(max_cargo)
    }

    fn should_produce(&self, ctx: &TurnContext, snapshot: &TurnSnapshot) -> bool {
        self.tuning
            .production_open(snapshot.turn, snapshot.total_turns)
            && snapshot.funds >= snapshot.production_cost
            && !ctx.grid().is_occupied(snapshot.home_base)
    }
}
