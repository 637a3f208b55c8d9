use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    color::PuyoColor,
    connectivity::{Region, VisitedCells, connected_group},
};

/// Coordinates of a single board cell.
///
/// `x` grows rightward from the leftmost column, `y` grows downward from the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Puyo(PuyoColor),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<PuyoColor> {
        match self {
            Cell::Empty => None,
            Cell::Puyo(color) => Some(color),
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Puyo(color) => color.as_char(),
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        match PuyoColor::from_char(c) {
            Some(color) => Some(Cell::Puyo(color)),
            None => None,
        }
    }
}

impl From<PuyoColor> for Cell {
    fn from(color: PuyoColor) -> Self {
        Cell::Puyo(color)
    }
}

/// A single row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    cells: [Cell; Board::WIDTH],
}

impl BoardRow {
    const EMPTY: Self = Self {
        cells: [Cell::Empty; Board::WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Cell; Board::WIDTH] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("board has no rows")]
    NoRows,
    #[display("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[display("invalid cell '{found}' at row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        found: char,
    },
}

/// The playing field: six columns and (by default) thirteen rows.
///
/// Row 0 is the topmost row and the bottom row is `height() - 1`. Queries outside the
/// board treat the cell as occupied so that landing and collision checks stop at the walls.
///
/// All mutations are total: invalid writes are reported through a `bool` return value and
/// leave the board unchanged.
///
/// # Text format
///
/// One line per row from top to bottom, `.` for an empty cell and `R`/`G`/`B`/`Y` for puyos:
///
/// ```
/// use gtrcoach_engine::{Board, PuyoColor};
///
/// let board: Board = "......\n......\nBB....".parse().unwrap();
/// assert_eq!(board.height(), 3);
/// assert_eq!(board.color_at(1, 2), Some(PuyoColor::Blue));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<BoardRow>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const WIDTH: usize = 6;
    pub const DEFAULT_HEIGHT: usize = 13;
    /// Column in which new pairs appear. The board is lost once row 0 of this column fills.
    pub const SPAWN_COLUMN: usize = 2;
    /// Minimum size of a same-colored group that vanishes.
    pub const CLEAR_GROUP_SIZE: usize = 4;

    /// Creates an empty board with the standard dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_height(Self::DEFAULT_HEIGHT)
    }

    #[must_use]
    pub fn with_height(height: usize) -> Self {
        Self {
            rows: vec![BoardRow::EMPTY; height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        Self::WIDTH
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of the bottom row, or `None` for a board without rows.
    #[must_use]
    pub fn bottom(&self) -> Option<usize> {
        self.height().checked_sub(1)
    }

    /// Region covering the whole board.
    #[must_use]
    pub fn region(&self) -> Region {
        Region::new(0..Self::WIDTH, 0..self.height())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; Board::WIDTH]> {
        self.rows.iter().map(BoardRow::cells)
    }

    #[must_use]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < Self::WIDTH && y < self.height()
    }

    /// Returns the cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.cells.get(x)).copied()
    }

    #[must_use]
    pub fn color_at(&self, x: usize, y: usize) -> Option<PuyoColor> {
        self.get(x, y).and_then(Cell::color)
    }

    #[must_use]
    pub fn color_at_position(&self, pos: Position) -> Option<PuyoColor> {
        self.color_at(pos.x, pos.y)
    }

    /// Returns whether `(x, y)` holds a puyo. Out-of-bounds cells count as occupied.
    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_none_or(Cell::is_occupied)
    }

    /// Writes a puyo into an empty in-bounds cell.
    ///
    /// Returns `false` (and leaves the board untouched) when the cell is occupied or
    /// out of bounds.
    pub fn place(&mut self, x: usize, y: usize, color: PuyoColor) -> bool {
        if self.is_occupied(x, y) {
            return false;
        }
        self.rows[y].cells[x] = Cell::Puyo(color);
        true
    }

    /// Empties a cell, returning whether a puyo was removed.
    pub fn remove(&mut self, x: usize, y: usize) -> bool {
        let Some(cell) = self.rows.get_mut(y).and_then(|row| row.cells.get_mut(x)) else {
            return false;
        };
        if cell.is_empty() {
            return false;
        }
        *cell = Cell::Empty;
        true
    }

    /// Runs one compaction pass over the whole board.
    ///
    /// Scanning each column bottom-up, every puyo falls to the lowest empty cell below it.
    /// Returns whether anything moved.
    pub fn apply_gravity(&mut self) -> bool {
        let region = self.region();
        self.apply_gravity_within(&region)
    }

    /// Like [`Self::apply_gravity`], restricted to `region`.
    ///
    /// Only puyos inside the region move and they never fall past its bottom edge.
    pub fn apply_gravity_within(&mut self, region: &Region) -> bool {
        self.apply_gravity_within_observed(region, |_, _| {})
    }

    /// Like [`Self::apply_gravity_within`], reporting every `(from, to)` move to `on_move`.
    pub fn apply_gravity_within_observed<F>(&mut self, region: &Region, mut on_move: F) -> bool
    where
        F: FnMut(Position, Position),
    {
        let region = region.intersection(&self.region());
        let mut moved = false;
        for x in region.xs() {
            for y in region.ys().rev() {
                let Cell::Puyo(color) = self.rows[y].cells[x] else {
                    continue;
                };
                let mut target = y;
                while target + 1 < region.ys().end && self.rows[target + 1].cells[x].is_empty() {
                    target += 1;
                }
                if target != y {
                    self.rows[y].cells[x] = Cell::Empty;
                    self.rows[target].cells[x] = Cell::Puyo(color);
                    on_move(Position::new(x, y), Position::new(x, target));
                    moved = true;
                }
            }
        }
        moved
    }

    /// Applies gravity until nothing moves. Returns whether anything moved at all.
    pub fn settle(&mut self) -> bool {
        let region = self.region();
        self.settle_within(&region)
    }

    pub fn settle_within(&mut self, region: &Region) -> bool {
        let mut moved = false;
        while self.apply_gravity_within(region) {
            moved = true;
        }
        moved
    }

    /// Empties every group of [`Self::CLEAR_GROUP_SIZE`] or more same-colored,
    /// orthogonally connected puyos.
    ///
    /// Returns the cleared positions; an empty list means nothing cleared.
    pub fn clear_connected_groups(&mut self) -> Vec<Position> {
        let region = self.region();
        self.clear_groups_within(&region)
    }

    /// Like [`Self::clear_connected_groups`], with flood fill confined to `region`.
    pub fn clear_groups_within(&mut self, region: &Region) -> Vec<Position> {
        let region = region.intersection(&self.region());
        let mut visited = VisitedCells::new(self.height());
        let mut cleared = vec![];
        for pos in region.positions() {
            let Some(group) = connected_group(self, pos, &region, &mut visited) else {
                continue;
            };
            if group.len() < Self::CLEAR_GROUP_SIZE {
                continue;
            }
            for cell in group.cells() {
                self.rows[cell.y].cells[cell.x] = Cell::Empty;
            }
            cleared.extend_from_slice(group.cells());
        }
        cleared
    }

    /// Resolves a full chain reaction on the whole board.
    ///
    /// Repeats "settle, then clear" until a clear pass removes nothing and returns the
    /// number of passes that cleared something.
    pub fn resolve_chain(&mut self) -> usize {
        let mut chains = 0;
        loop {
            self.settle();
            if self.clear_connected_groups().is_empty() {
                break;
            }
            chains += 1;
        }
        chains
    }

    /// Returns whether the spawn cell (top row of the spawn column) is occupied.
    #[must_use]
    pub fn is_top_row_blocked(&self) -> bool {
        self.get(Self::SPAWN_COLUMN, 0)
            .is_some_and(Cell::is_occupied)
    }

    /// Stack height of column `x`: distance from the topmost puyo to below the bottom row.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        (0..self.height())
            .find(|&y| self.get(x, y).is_some_and(Cell::is_occupied))
            .map_or(0, |top| self.height() - top)
    }

    /// Row a puyo dropped into column `x` comes to rest on: directly above the topmost puyo,
    /// or the bottom row of an empty column. `None` if the column is full or out of bounds.
    ///
    /// Holes underneath floating puyos are never reached.
    #[must_use]
    pub fn rest_row(&self, x: usize) -> Option<usize> {
        if x >= Self::WIDTH {
            return None;
        }
        match (0..self.height()).find(|&y| self.rows[y].cells[x].is_occupied()) {
            Some(top) => top.checked_sub(1),
            None => self.height().checked_sub(1),
        }
    }

    /// Number of puyos inside `region`.
    #[must_use]
    pub fn count_occupied_within(&self, region: &Region) -> usize {
        region
            .intersection(&self.region())
            .positions()
            .filter(|pos| self.is_occupied(pos.x, pos.y))
            .count()
    }

    /// Builds a board from row strings, top row first.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, ParseBoardError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut board_rows = vec![];
        for (row, line) in rows.into_iter().enumerate() {
            let line = line.as_ref().trim();
            let found = line.chars().count();
            if found != Self::WIDTH {
                return Err(ParseBoardError::RowWidth {
                    row,
                    found,
                    expected: Self::WIDTH,
                });
            }
            let mut board_row = BoardRow::EMPTY;
            for (column, c) in line.chars().enumerate() {
                board_row.cells[column] = Cell::from_char(c).ok_or(ParseBoardError::InvalidCell {
                    row,
                    column,
                    found: c,
                })?;
            }
            board_rows.push(board_row);
        }
        if board_rows.is_empty() {
            return Err(ParseBoardError::NoRows);
        }
        Ok(Self { rows: board_rows })
    }

    fn row_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_strings() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_rows(s.lines().filter(|line| !line.trim().is_empty()))
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: array of row strings, top row first (e.g., ["......", "BB...."])
        serializer.collect_seq(self.row_strings())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Self::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.width(), 6);
        assert_eq!(board.height(), 13);
        assert_eq!(board.bottom(), Some(12));
        assert!(board.rows().flatten().all(|c| c.is_empty()));
    }

    #[test]
    fn test_out_of_bounds_is_occupied() {
        let board = Board::new();
        assert!(!board.is_occupied(0, 0));
        assert!(board.is_occupied(6, 0));
        assert!(board.is_occupied(0, 13));
    }

    #[test]
    fn test_place_and_remove() {
        let mut board = Board::new();
        assert!(board.place(1, 12, PuyoColor::Red));
        assert!(!board.place(1, 12, PuyoColor::Blue));
        assert!(!board.place(6, 12, PuyoColor::Blue));
        assert_eq!(board.color_at(1, 12), Some(PuyoColor::Red));

        assert!(board.remove(1, 12));
        assert!(!board.remove(1, 12));
        assert!(!board.remove(9, 9));
        assert_eq!(board.color_at(1, 12), None);
    }

    #[test]
    fn test_gravity_settles_in_one_pass() {
        let mut board = parse(
            "
            R.....
            ......
            G.....
            ......",
        );
        assert!(board.apply_gravity());
        assert_eq!(board.color_at(0, 3), Some(PuyoColor::Green));
        assert_eq!(board.color_at(0, 2), Some(PuyoColor::Red));
        assert!(!board.apply_gravity());
    }

    #[test]
    fn test_gravity_within_region_stops_at_region_edge() {
        let mut board = parse(
            "
            R.....
            ......
            ......
            ......",
        );
        let region = Region::new(0..6, 0..2);
        let mut moves = vec![];
        assert!(board.apply_gravity_within_observed(&region, |from, to| moves.push((from, to))));
        assert_eq!(board.color_at(0, 1), Some(PuyoColor::Red));
        assert_eq!(moves, [(Position::new(0, 0), Position::new(0, 1))]);

        // Puyos outside the region never fall into it
        let mut board = parse(
            "
            G.....
            ......
            ......",
        );
        assert!(!board.apply_gravity_within(&Region::new(0..6, 1..3)));
        assert_eq!(board.color_at(0, 0), Some(PuyoColor::Green));
    }

    #[test]
    fn test_clear_requires_four_connected() {
        let mut board = parse(
            "
            ......
            R.....
            RR....
            RGGG..",
        );
        let cleared = board.clear_connected_groups();
        assert_eq!(cleared.len(), 4);
        assert_eq!(board.color_at(0, 1), None);
        // Three greens remain
        assert_eq!(board.color_at(1, 3), Some(PuyoColor::Green));
        assert!(board.clear_connected_groups().is_empty());
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let mut board = parse(
            "
            R.R...
            .R.R..",
        );
        assert!(board.clear_connected_groups().is_empty());
    }

    #[test]
    fn test_resolve_chain_counts_links() {
        // Clearing the reds drops the blue on top into the blue group
        let mut board = parse(
            "
            B.....
            R.....
            R.....
            RR....
            BBB...",
        );
        assert_eq!(board.resolve_chain(), 2);
        assert!(board.rows().flatten().all(|c| c.is_empty()));
    }

    #[test]
    fn test_top_row_blocked() {
        let mut board = Board::new();
        assert!(!board.is_top_row_blocked());
        board.place(0, 0, PuyoColor::Red);
        assert!(!board.is_top_row_blocked());
        board.place(Board::SPAWN_COLUMN, 0, PuyoColor::Red);
        assert!(board.is_top_row_blocked());
    }

    #[test]
    fn test_column_height_and_rest_row() {
        let board = parse(
            "
            ......
            .B....
            .B....
            RB....",
        );
        assert_eq!(board.column_height(0), 1);
        assert_eq!(board.column_height(1), 3);
        assert_eq!(board.column_height(2), 0);
        assert_eq!(board.rest_row(0), Some(2));
        assert_eq!(board.rest_row(1), Some(0));
        assert_eq!(board.rest_row(2), Some(3));
        assert_eq!(board.rest_row(6), None);
    }

    #[test]
    fn test_rest_row_stops_above_floating_puyo() {
        let board = parse(
            "
            ......
            R.....
            ......
            ......",
        );
        assert_eq!(board.rest_row(0), Some(0));

        let full = parse("R.....\nR.....");
        assert_eq!(full.rest_row(0), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Board>(), Err(ParseBoardError::NoRows));
        assert_eq!(
            "......\n.....".parse::<Board>(),
            Err(ParseBoardError::RowWidth {
                row: 1,
                found: 5,
                expected: 6
            })
        );
        assert_eq!(
            "..X...".parse::<Board>(),
            Err(ParseBoardError::InvalidCell {
                row: 0,
                column: 2,
                found: 'X'
            })
        );
    }

    #[test]
    fn test_display_round_trip() {
        let text = "......\n.G....\nRBY...\n";
        let board = parse(text);
        assert_eq!(board.to_string(), text);
    }

    #[test]
    fn test_board_serialization() {
        let board = parse("......\nRB....");
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["......","RB...."]"#);
        let deserialized: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, board);

        assert!(serde_json::from_str::<Board>(r#"["RB"]"#).is_err());
    }
}
