#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Harvest Fleet decision engine.
//!
//! This crate defines the message surface that connects the command-line
//! adapter, the turn-scoped world state, and the pure systems. The adapter
//! hands a [`TurnSnapshot`] to the scheduler, the systems read immutable views
//! derived from it, and the turn ends with a [`TurnOrders`] batch of
//! [`Command`] values addressed to the game host.

use serde::{Deserialize, Serialize};

/// Behavioral role a unit cycles between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The unit collects resources from the grid.
    Harvesting,
    /// The unit carries its cargo back to the home base.
    Returning,
}

/// Movement rule set active for the whole fleet during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FleetMode {
    /// Regular play: targets, negotiation and claims apply.
    Normal,
    /// Late-game override where every unit converges on the home base.
    Endgame,
}

/// Cardinal movement directions available to units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All cardinal directions in a fixed enumeration order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to a unit by the game host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Immutable representation of a single friendly unit for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Resources carried by the unit.
    pub cargo: u32,
    /// Indicates whether the host reports the unit's hold as full.
    #[serde(default)]
    pub is_full: bool,
}

/// Read-only snapshot describing the friendly fleet in enumeration order.
#[derive(Clone, Debug, Default)]
pub struct FleetView {
    snapshots: Vec<UnitSnapshot>,
}

impl FleetView {
    /// Creates a new fleet view, ordering units by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured units in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided unit.
    #[must_use]
    pub fn get(&self, unit_id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit_id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Reports whether the unit is part of the fleet this turn.
    #[must_use]
    pub fn contains(&self, unit_id: UnitId) -> bool {
        self.get(unit_id).is_some()
    }

    /// Number of units in the fleet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the fleet is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Everything the game host reveals about a single turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    /// Current turn number, starting at one.
    pub turn: u32,
    /// Total number of turns in the game.
    pub total_turns: u32,
    /// Funds available for producing new units.
    pub funds: u32,
    /// Cost of producing a single unit.
    pub production_cost: u32,
    /// Maximum cargo a unit can carry.
    pub max_cargo: u32,
    /// Cell hosting the player's home base.
    pub home_base: CellCoord,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Resource amount per cell in row-major order.
    pub resources: Vec<u32>,
    /// Friendly units.
    pub units: Vec<UnitSnapshot>,
    /// Cells occupied by opposing units.
    #[serde(default)]
    pub opponents: Vec<CellCoord>,
}

/// Commands addressed to the game host at the end of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Requests that a unit advance a single step in the specified direction.
    StepUnit {
        /// Identifier of the unit attempting to move.
        unit_id: UnitId,
        /// Direction of travel for the step.
        direction: Direction,
    },
    /// Requests that a unit keep its cell for the turn.
    HoldUnit {
        /// Identifier of the unit that stays put.
        unit_id: UnitId,
    },
    /// Requests that the home base produce a new unit.
    ProduceUnit,
}

impl Command {
    /// Builds the command for a unit given its decided step.
    #[must_use]
    pub const fn for_step(unit_id: UnitId, step: Option<Direction>) -> Self {
        match step {
            Some(direction) => Self::StepUnit { unit_id, direction },
            None => Self::HoldUnit { unit_id },
        }
    }

    /// Unit addressed by the command, if any.
    #[must_use]
    pub const fn unit_id(&self) -> Option<UnitId> {
        match self {
            Self::StepUnit { unit_id, .. } | Self::HoldUnit { unit_id } => Some(*unit_id),
            Self::ProduceUnit => None,
        }
    }
}

/// Command batch produced for a single turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrders {
    /// Turn the orders answer.
    pub turn: u32,
    /// Commands issued this turn; each unit appears at most once.
    pub commands: Vec<Command>,
}

impl TurnOrders {
    /// Orders that leave every unit in place.
    #[must_use]
    pub const fn empty(turn: u32) -> Self {
        Self {
            turn,
            commands: Vec::new(),
        }
    }

    /// Reports whether the orders carry a production intent.
    #[must_use]
    pub fn produces_unit(&self) -> bool {
        self.commands
            .iter()
            .any(|command| matches!(command, Command::ProduceUnit))
    }
}

/// Reasons a tuning configuration may be rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TuningError {
    /// A fraction lies outside the unit interval.
    #[error("tuning value `{name}` must lie within [0, 1], got {value}")]
    FractionOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Value supplied by the configuration.
        value: f64,
    },
    /// The neighborhood radius must cover at least one cell.
    #[error("tuning value `scan_radius` must be positive")]
    ZeroScanRadius,
    /// The median refresh stride must be positive.
    #[error("tuning value `median_stride` must be positive")]
    ZeroMedianStride,
}

/// Tuning constants steering the fleet's behavior.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fraction of the maximum cargo at which a unit turns for home.
    pub return_threshold: f64,
    /// Half the side length of the square neighborhood scanned for targets.
    pub scan_radius: u32,
    /// Fraction of the game after which every unit converges on home.
    pub endgame_fraction: f64,
    /// Fraction of the game after which no units are produced.
    pub production_cutoff: f64,
    /// Fraction of a cell's resources charged when moving off it.
    pub extraction_tax: f64,
    /// Fraction of the median above which a unit stays to harvest.
    pub stay_fraction: f64,
    /// Every n-th processed unit uses the full-grid median.
    pub median_stride: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            return_threshold: 0.9,
            scan_radius: 4,
            endgame_fraction: 0.93,
            production_cutoff: 0.6,
            extraction_tax: 0.1,
            stay_fraction: 0.7,
            median_stride: 10,
        }
    }
}

impl Tuning {
    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<(), TuningError> {
        let fractions = [
            ("return_threshold", self.return_threshold),
            ("endgame_fraction", self.endgame_fraction),
            ("production_cutoff", self.production_cutoff),
            ("extraction_tax", self.extraction_tax),
            ("stay_fraction", self.stay_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::FractionOutOfRange { name, value });
            }
        }
        if self.scan_radius == 0 {
            return Err(TuningError::ZeroScanRadius);
        }
        if self.median_stride == 0 {
            return Err(TuningError::ZeroMedianStride);
        }
        Ok(())
    }

    /// Cargo level at which a unit is considered loaded.
    #[must_use]
    pub fn return_load(&self, max_cargo: u32) -> f64 {
        f64::from(max_cargo) * self.return_threshold
    }

    /// Reports whether the cargo reaches the return threshold.
    #[must_use]
    pub fn is_loaded(&self, cargo: u32, max_cargo: u32) -> bool {
        f64::from(cargo) >= self.return_load(max_cargo)
    }

    /// Cargo charged for moving off a cell holding `resource`.
    #[must_use]
    pub fn extraction_cost(&self, resource: u32) -> u32 {
        // Truncation mirrors the host's integer accounting.
        (f64::from(resource) * self.extraction_tax).floor() as u32
    }

    /// Cargo left after paying the extraction tax of the current cell.
    #[must_use]
    pub fn cargo_after_tax(&self, cargo: u32, resource: u32) -> i64 {
        i64::from(cargo) - i64::from(self.extraction_cost(resource))
    }

    /// Reports whether the endgame override applies on `turn`.
    #[must_use]
    pub fn endgame_active(&self, turn: u32, total_turns: u32) -> bool {
        f64::from(turn) >= f64::from(total_turns) * self.endgame_fraction
    }

    /// Reports whether production is still allowed on `turn`.
    #[must_use]
    pub fn production_open(&self, turn: u32, total_turns: u32) -> bool {
        f64::from(turn) < f64::from(total_turns) * self.production_cutoff
    }

    /// Resource level above which a harvesting unit stays in place.
    #[must_use]
    pub fn stay_level(&self, median: f64) -> f64 {
        median * self.stay_fraction
    }
}
