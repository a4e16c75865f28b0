#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Role assignment system that maps cargo levels to unit behavior.

use harvest_fleet_core::{CellCoord, Role, Tuning, UnitSnapshot};
use harvest_fleet_world::{StatusLedger, UnitStatus};
use tracing::debug;

/// Pure system that keeps every unit's role in the status ledger current.
#[derive(Clone, Copy, Debug)]
pub struct RoleAssigner {
    tuning: Tuning,
}

impl RoleAssigner {
    /// Creates a role assigner using the supplied tuning.
    #[must_use]
    pub const fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Role a unit takes when first sighted.
    #[must_use]
    pub fn initial_role(&self, unit: &UnitSnapshot, max_cargo: u32) -> Role {
        if self.tuning.is_loaded(unit.cargo, max_cargo) {
            Role::Returning
        } else {
            Role::Harvesting
        }
    }

    /// Adds a newly sighted unit to the ledger.
    pub fn register(&self, ledger: &mut StatusLedger, unit: &UnitSnapshot, max_cargo: u32) {
        ledger.register(unit.id, self.initial_role(unit, max_cargo), unit.cell);
    }

    /// Decides the unit's role for this turn and stamps its baseline position.
    ///
    /// Loaded units always return. A returning unit switches back to
    /// harvesting only once it stands on the home base; otherwise the previous
    /// role sticks.
    pub fn assign(
        &self,
        ledger: &mut StatusLedger,
        unit: &UnitSnapshot,
        home_base: CellCoord,
        max_cargo: u32,
    ) -> Role {
        let previous = ledger
            .role(unit.id)
            .unwrap_or_else(|| self.initial_role(unit, max_cargo));

        let role = if self.tuning.is_loaded(unit.cargo, max_cargo) {
            Role::Returning
        } else if previous == Role::Returning && unit.cell == home_base {
            Role::Harvesting
        } else {
            previous
        };

        if role != previous {
            debug!(unit = unit.id.get(), ?previous, ?role, cargo = unit.cargo, "role changed");
        }

        ledger.record(
            unit.id,
            UnitStatus {
                role,
                intended: unit.cell,
            },
        );
        role
    }
}
