//! Cross-turn memory of every unit's role and intended position.

use std::collections::BTreeMap;

use harvest_fleet_core::{CellCoord, Role, UnitId};

/// Status remembered for a unit between turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitStatus {
    /// Role the unit played when last processed.
    pub role: Role,
    /// Cell the unit is expected to occupy after its latest command.
    pub intended: CellCoord,
}

/// Process-lifetime mapping from unit to status.
///
/// Entries are keyed by identifier so lookups that scan the ledger resolve
/// in the same order as the fleet enumeration.
#[derive(Clone, Debug, Default)]
pub struct StatusLedger {
    entries: BTreeMap<UnitId, UnitStatus>,
}

impl StatusLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a unit seen for the first time; known units are left untouched.
    pub fn register(&mut self, unit_id: UnitId, role: Role, cell: CellCoord) {
        let _ = self.entries.entry(unit_id).or_insert(UnitStatus {
            role,
            intended: cell,
        });
    }

    /// Overwrites the status of a unit.
    pub fn record(&mut self, unit_id: UnitId, status: UnitStatus) {
        let _ = self.entries.insert(unit_id, status);
    }

    /// Updates the cell a unit is expected to occupy after this turn.
    pub fn stamp_intended(&mut self, unit_id: UnitId, cell: CellCoord) {
        if let Some(status) = self.entries.get_mut(&unit_id) {
            status.intended = cell;
        }
    }

    /// Status remembered for the unit, if any.
    #[must_use]
    pub fn status(&self, unit_id: UnitId) -> Option<UnitStatus> {
        self.entries.get(&unit_id).copied()
    }

    /// Role remembered for the unit, if any.
    #[must_use]
    pub fn role(&self, unit_id: UnitId) -> Option<Role> {
        self.status(unit_id).map(|status| status.role)
    }

    /// First unit, by identifier, whose intended position is `cell`.
    #[must_use]
    pub fn intending(&self, cell: CellCoord) -> Option<UnitId> {
        self.entries
            .iter()
            .find(|(_, status)| status.intended == cell)
            .map(|(unit_id, _)| *unit_id)
    }

    /// Drops entries for units that no longer exist.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(UnitId) -> bool,
    {
        self.entries.retain(|unit_id, _| keep(*unit_id));
    }

    /// Number of tracked units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no unit is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_keeps_existing_entries() {
        let mut ledger = StatusLedger::new();
        let unit = UnitId::new(4);
        ledger.register(unit, Role::Returning, CellCoord::new(1, 1));
        ledger.register(unit, Role::Harvesting, CellCoord::new(2, 2));

        assert_eq!(
            ledger.status(unit),
            Some(UnitStatus {
                role: Role::Returning,
                intended: CellCoord::new(1, 1)
            })
        );
    }

    #[test]
    fn intending_resolves_lowest_identifier_first() {
        let mut ledger = StatusLedger::new();
        let cell = CellCoord::new(3, 3);
        ledger.register(UnitId::new(9), Role::Harvesting, cell);
        ledger.register(UnitId::new(2), Role::Harvesting, CellCoord::new(0, 0));
        ledger.stamp_intended(UnitId::new(2), cell);

        assert_eq!(ledger.intending(cell), Some(UnitId::new(2)));
        assert_eq!(ledger.intending(CellCoord::new(0, 0)), None);
    }

    #[test]
    fn retain_prunes_vanished_units() {
        let mut ledger = StatusLedger::new();
        ledger.register(UnitId::new(1), Role::Harvesting, CellCoord::new(0, 0));
        ledger.register(UnitId::new(2), Role::Harvesting, CellCoord::new(1, 0));
        ledger.retain(|unit_id| unit_id == UnitId::new(2));

        assert_eq!(ledger.len(), 1);
        assert!(ledger.role(UnitId::new(1)).is_none());
    }
}
