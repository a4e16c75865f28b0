use harvest_fleet_core::{CellCoord, Role, Tuning, UnitId, UnitSnapshot};
use harvest_fleet_system_roles::RoleAssigner;
use harvest_fleet_world::StatusLedger;

const HOME: CellCoord = CellCoord::new(0, 0);
const MAX_CARGO: u32 = 1000;

#[test]
fn unit_cycles_between_harvesting_and_returning() {
    let assigner = RoleAssigner::new(Tuning::default());
    let mut ledger = StatusLedger::new();

    // (cargo, position, expected role)
    let script = [
        (0, CellCoord::new(4, 4), Role::Harvesting),
        (600, CellCoord::new(4, 4), Role::Harvesting),
        (900, CellCoord::new(4, 4), Role::Returning),
        (900, CellCoord::new(2, 2), Role::Returning),
        // Unloading a little on the way keeps the unit returning.
        (400, CellCoord::new(1, 0), Role::Returning),
        (0, HOME, Role::Harvesting),
        (0, CellCoord::new(1, 0), Role::Harvesting),
    ];

    for (turn, (cargo, cell, expected)) in script.into_iter().enumerate() {
        let unit = snapshot(cargo, cell);
        assigner.register(&mut ledger, &unit, MAX_CARGO);
        let role = assigner.assign(&mut ledger, &unit, HOME, MAX_CARGO);
        assert_eq!(role, expected, "turn {turn}");
        assert_eq!(ledger.role(unit.id), Some(expected), "turn {turn}");
    }
}

#[test]
fn loaded_unit_on_home_base_keeps_returning() {
    let assigner = RoleAssigner::new(Tuning::default());
    let mut ledger = StatusLedger::new();
    let unit = snapshot(950, HOME);

    assigner.register(&mut ledger, &unit, MAX_CARGO);
    assert_eq!(
        assigner.assign(&mut ledger, &unit, HOME, MAX_CARGO),
        Role::Returning
    );
}

#[test]
fn register_does_not_override_remembered_role() {
    let assigner = RoleAssigner::new(Tuning::default());
    let mut ledger = StatusLedger::new();

    let loaded = snapshot(950, CellCoord::new(3, 3));
    assigner.register(&mut ledger, &loaded, MAX_CARGO);
    let _ = assigner.assign(&mut ledger, &loaded, HOME, MAX_CARGO);

    let unloaded = snapshot(100, CellCoord::new(3, 2));
    assigner.register(&mut ledger, &unloaded, MAX_CARGO);

    assert_eq!(ledger.role(unloaded.id), Some(Role::Returning));
    assert_eq!(
        assigner.assign(&mut ledger, &unloaded, HOME, MAX_CARGO),
        Role::Returning
    );
}

#[test]
fn custom_threshold_changes_the_switch_point() {
    let tuning = Tuning {
        return_threshold: 0.5,
        ..Tuning::default()
    };
    let assigner = RoleAssigner::new(tuning);
    let mut ledger = StatusLedger::new();

    let unit = snapshot(500, CellCoord::new(5, 5));
    assert_eq!(
        assigner.assign(&mut ledger, &unit, HOME, MAX_CARGO),
        Role::Returning
    );
}

fn snapshot(cargo: u32, cell: CellCoord) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(7),
        cell,
        cargo,
        is_full: false,
    }
}
