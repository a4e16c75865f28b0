//! Toroidal coordinate helpers shared by the grid and the systems.

use harvest_fleet_core::{CellCoord, Direction};

/// Shortest-route directions from `from` toward `to`, horizontal axis first.
///
/// Each axis contributes at most one direction. An axis whose coordinates
/// already match contributes nothing; otherwise the direct direction is used
/// while it is strictly shorter than half the axis, and the wrap-around
/// direction from there on.
pub fn axis_steps(
    from: CellCoord,
    to: CellCoord,
    columns: u32,
    rows: u32,
) -> impl Iterator<Item = Direction> {
    let horizontal = axis_step(
        from.column(),
        to.column(),
        columns,
        Direction::East,
        Direction::West,
    );
    let vertical = axis_step(
        from.row(),
        to.row(),
        rows,
        Direction::South,
        Direction::North,
    );

    [horizontal, vertical].into_iter().flatten()
}

/// Manhattan distance between two cells measured on the torus.
#[must_use]
pub fn toroidal_distance(a: CellCoord, b: CellCoord, columns: u32, rows: u32) -> u32 {
    wrapped_gap(a.column(), b.column(), columns) + wrapped_gap(a.row(), b.row(), rows)
}

pub(crate) fn offset(cell: CellCoord, direction: Direction, columns: u32, rows: u32) -> CellCoord {
    let (dx, dy) = direction.delta();
    CellCoord::new(
        wrap(i64::from(cell.column()) + dx, columns),
        wrap(i64::from(cell.row()) + dy, rows),
    )
}

fn axis_step(
    from: u32,
    to: u32,
    length: u32,
    increasing: Direction,
    decreasing: Direction,
) -> Option<Direction> {
    if from == to {
        return None;
    }

    let (direct, inverted) = if to > from {
        (increasing, decreasing)
    } else {
        (decreasing, increasing)
    };

    let distance = u64::from(from.abs_diff(to));
    if distance * 2 < u64::from(length) {
        Some(direct)
    } else {
        Some(inverted)
    }
}

fn wrapped_gap(a: u32, b: u32, length: u32) -> u32 {
    let direct = a.abs_diff(b);
    direct.min(length.saturating_sub(direct))
}

fn wrap(value: i64, length: u32) -> u32 {
    if length == 0 {
        return 0;
    }
    let wrapped = value.rem_euclid(i64::from(length));
    u32::try_from(wrapped).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(from: (u32, u32), to: (u32, u32), columns: u32, rows: u32) -> Vec<Direction> {
        axis_steps(
            CellCoord::new(from.0, from.1),
            CellCoord::new(to.0, to.1),
            columns,
            rows,
        )
        .collect()
    }

    #[test]
    fn offset_wraps_across_every_edge() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(offset(corner, Direction::West, 5, 4), CellCoord::new(4, 0));
        assert_eq!(offset(corner, Direction::North, 5, 4), CellCoord::new(0, 3));

        let far = CellCoord::new(4, 3);
        assert_eq!(offset(far, Direction::East, 5, 4), CellCoord::new(0, 3));
        assert_eq!(offset(far, Direction::South, 5, 4), CellCoord::new(4, 0));
    }

    #[test]
    fn wide_displacement_takes_the_wrap_around_route() {
        // Displacement of W-1 eastward is one step westward.
        assert_eq!(steps((0, 0), (19, 0), 20, 20), vec![Direction::West]);
        assert_eq!(steps((19, 0), (0, 0), 20, 20), vec![Direction::East]);
        assert_eq!(steps((0, 2), (0, 1), 20, 20), vec![Direction::North]);
    }

    #[test]
    fn horizontal_axis_comes_first() {
        assert_eq!(
            steps((5, 5), (7, 2), 20, 20),
            vec![Direction::East, Direction::North]
        );
        assert!(steps((5, 5), (5, 5), 20, 20).is_empty());
    }

    #[test]
    fn half_way_ties_take_the_wrap_around_direction() {
        assert_eq!(steps((0, 0), (10, 0), 20, 20), vec![Direction::West]);
        assert_eq!(steps((0, 0), (9, 0), 20, 20), vec![Direction::East]);
    }

    #[test]
    fn toroidal_distance_uses_the_shorter_gap() {
        let a = CellCoord::new(0, 0);
        assert_eq!(toroidal_distance(a, CellCoord::new(19, 18), 20, 20), 3);
        assert_eq!(toroidal_distance(a, CellCoord::new(3, 4), 20, 20), 7);
    }
}
