//! Flood fill over same-colored, orthogonally adjacent puyos.
//!
//! Used by the board for clear detection, and by evaluators for adjacency scoring and for
//! grouping leftover cells. The search uses an explicit stack so that deep groups cannot
//! exhaust the call stack.

use std::ops::Range;

use super::{
    board::{Board, Position},
    color::PuyoColor,
};

/// Axis-aligned rectangle of cells, half-open on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    xs: Range<usize>,
    ys: Range<usize>,
}

impl Region {
    #[must_use]
    pub fn new(xs: Range<usize>, ys: Range<usize>) -> Self {
        Self { xs, ys }
    }

    #[must_use]
    pub fn xs(&self) -> Range<usize> {
        self.xs.clone()
    }

    #[must_use]
    pub fn ys(&self) -> Range<usize> {
        self.ys.clone()
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.xs.contains(&pos.x) && self.ys.contains(&pos.y)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() || self.ys.is_empty()
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let xs = self.xs.start.max(other.xs.start)..self.xs.end.min(other.xs.end);
        let ys = self.ys.start.max(other.ys.start)..self.ys.end.min(other.ys.end);
        Self { xs, ys }
    }

    /// Iterates over the cells row by row, top to bottom and left to right.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let xs = self.xs();
        self.ys()
            .flat_map(move |y| xs.clone().map(move |x| Position::new(x, y)))
    }
}

/// Cells already reached by a flood fill.
#[derive(Debug, Clone)]
pub struct VisitedCells {
    cells: Vec<[bool; Board::WIDTH]>,
}

impl VisitedCells {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            cells: vec![[false; Board::WIDTH]; height],
        }
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells
            .get(pos.y)
            .and_then(|row| row.get(pos.x))
            .copied()
            .unwrap_or(false)
    }

    /// Marks `pos` as visited, returning `true` if it was not visited before.
    pub fn insert(&mut self, pos: Position) -> bool {
        match self.cells.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }
}

/// A maximal set of same-colored, orthogonally connected puyos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedGroup {
    color: PuyoColor,
    cells: Vec<Position>,
}

impl ConnectedGroup {
    #[must_use]
    pub fn color(&self) -> PuyoColor {
        self.color
    }

    #[must_use]
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Collects the group containing `start`, staying inside `region`.
///
/// Returns `None` when `start` is empty, outside the region or already visited. Every cell
/// of the returned group is marked in `visited`.
pub fn connected_group(
    board: &Board,
    start: Position,
    region: &Region,
    visited: &mut VisitedCells,
) -> Option<ConnectedGroup> {
    if !region.contains(start) || visited.contains(start) {
        return None;
    }
    let color = board.color_at_position(start)?;

    let mut cells = vec![];
    let mut stack = vec![start];
    visited.insert(start);
    while let Some(pos) = stack.pop() {
        cells.push(pos);
        for next in neighbors(pos) {
            if region.contains(next)
                && board.color_at_position(next) == Some(color)
                && visited.insert(next)
            {
                stack.push(next);
            }
        }
    }
    cells.sort_unstable_by_key(|pos| (pos.y, pos.x));
    Some(ConnectedGroup { color, cells })
}

/// Finds every group inside `region`, seeding in row-major order.
#[must_use]
pub fn connected_groups(board: &Board, region: &Region) -> Vec<ConnectedGroup> {
    let mut visited = VisitedCells::new(board.height());
    region
        .positions()
        .filter_map(|pos| connected_group(board, pos, region, &mut visited))
        .collect()
}

/// Size of the group containing `pos` on the whole board (0 for an empty cell).
#[must_use]
pub fn group_size_at(board: &Board, pos: Position) -> usize {
    let mut visited = VisitedCells::new(board.height());
    connected_group(board, pos, &board.region(), &mut visited).map_or(0, |g| g.len())
}

/// Orthogonal neighbors of `pos` that do not underflow.
///
/// Neighbors past the right or bottom edge are returned as well; callers bound them with a
/// [`Region`].
pub fn neighbors(pos: Position) -> impl Iterator<Item = Position> {
    let Position { x, y } = pos;
    [
        x.checked_sub(1).map(|x| Position::new(x, y)),
        Some(Position::new(x + 1, y)),
        y.checked_sub(1).map(|y| Position::new(x, y)),
        Some(Position::new(x, y + 1)),
    ]
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_group_follows_orthogonal_links() {
        let board = board(
            "
            RR....
            .R....
            .RRG..",
        );
        let group = group_size_at(&board, Position::new(0, 0));
        assert_eq!(group, 5);
        assert_eq!(group_size_at(&board, Position::new(3, 2)), 1);
        assert_eq!(group_size_at(&board, Position::new(5, 0)), 0);
    }

    #[test]
    fn test_group_confined_to_region() {
        let board = board(
            "
            RRRR..
            ......",
        );
        let region = Region::new(0..2, 0..2);
        let mut visited = VisitedCells::new(board.height());
        let group = connected_group(&board, Position::new(0, 0), &region, &mut visited).unwrap();
        assert_eq!(group.cells(), [Position::new(0, 0), Position::new(1, 0)]);
        assert_eq!(group.color(), PuyoColor::Red);

        // Already visited cells do not seed again
        assert!(connected_group(&board, Position::new(1, 0), &region, &mut visited).is_none());
        // Seeds outside the region are ignored
        assert!(connected_group(&board, Position::new(2, 0), &region, &mut visited).is_none());
    }

    #[test]
    fn test_connected_groups_row_major_order() {
        let board = board(
            "
            ...GG.
            RR....
            ....BB",
        );
        let groups = connected_groups(&board, &board.region());
        let colors: Vec<_> = groups.iter().map(ConnectedGroup::color).collect();
        assert_eq!(
            colors,
            [PuyoColor::Green, PuyoColor::Red, PuyoColor::Blue]
        );
        assert!(groups.iter().all(|g| g.len() == 2));
    }

    #[test]
    fn test_large_group_does_not_recurse() {
        let row = "RRRRRR\n";
        let board = board(&row.repeat(200));
        assert_eq!(group_size_at(&board, Position::new(0, 0)), 1200);
    }

    #[test]
    fn test_region_intersection_and_positions() {
        let a = Region::new(0..6, 9..13);
        let b = Region::new(4..10, 0..10);
        let c = a.intersection(&b);
        assert_eq!(c, Region::new(4..6, 9..10));
        assert_eq!(
            c.positions().collect::<Vec<_>>(),
            [Position::new(4, 9), Position::new(5, 9)]
        );
        assert!(Region::new(3..3, 0..4).is_empty());
    }
}
