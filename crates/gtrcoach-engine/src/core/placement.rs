//! Placement enumeration and landing calculation.
//!
//! A [`Placement`] is what the player chooses (a column for the primary puyo and a
//! rotation); the [`Landing`] is where both puyos come to rest once dropped. Each puyo of
//! a horizontal pair falls independently, so the two cells of a landing may sit on
//! different rows.

use std::ops::RangeInclusive;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    board::{Board, Position},
    color::PuyoColor,
    piece::{Piece, PieceRotation},
};

/// Upper bound on the number of placements on a six-column board
/// (6 + 5 + 6 + 5 over the four rotations).
pub const MAX_PLACEMENTS: usize = 22;

/// Column and rotation chosen for the current pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Placement {
    column: usize,
    rotation: PieceRotation,
}

/// Resting cells of both puyos of a dropped pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Landing {
    primary: Position,
    secondary: Position,
}

impl Placement {
    #[must_use]
    pub const fn new(column: usize, rotation: PieceRotation) -> Self {
        Self { column, rotation }
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Columns the primary puyo may occupy for `rotation` so that both puyos stay on the
    /// board.
    #[must_use]
    pub fn columns(rotation: PieceRotation) -> RangeInclusive<usize> {
        match rotation {
            PieceRotation::RIGHT => 0..=Board::WIDTH - 2,
            PieceRotation::LEFT => 1..=Board::WIDTH - 1,
            _ => 0..=Board::WIDTH - 1,
        }
    }

    /// Computes where the pair comes to rest, or `None` if it does not fit.
    ///
    /// Each puyo stops on top of the topmost puyo of its column, so a landing never reaches
    /// a hole under a floating puyo. A vertical pair needs two rows above its column's
    /// stack; a horizontal pair needs one in each of its two columns.
    #[must_use]
    pub fn landing(&self, board: &Board) -> Option<Landing> {
        if !Self::columns(self.rotation).contains(&self.column) {
            return None;
        }

        let x = self.column;
        let (dx, dy) = self.rotation.secondary_offset();
        if self.rotation.is_vertical() {
            let lower = board.rest_row(x).filter(|&y| y >= 1)?;
            let (primary_y, secondary_y) = if dy < 0 {
                (lower, lower - 1)
            } else {
                (lower - 1, lower)
            };
            return Some(Landing::new(
                Position::new(x, primary_y),
                Position::new(x, secondary_y),
            ));
        }

        let secondary_x = x.checked_add_signed(dx)?;
        Some(Landing::new(
            Position::new(x, board.rest_row(x)?),
            Position::new(secondary_x, board.rest_row(secondary_x)?),
        ))
    }
}

impl Landing {
    #[must_use]
    pub const fn new(primary: Position, secondary: Position) -> Self {
        Self { primary, secondary }
    }

    #[must_use]
    pub fn primary(&self) -> Position {
        self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> Position {
        self.secondary
    }

    /// Both cells, primary first.
    #[must_use]
    pub fn positions(&self) -> [Position; 2] {
        [self.primary, self.secondary]
    }

    /// Cells paired with the color each one receives from `piece`.
    #[must_use]
    pub fn cells(&self, piece: &Piece) -> [(Position, PuyoColor); 2] {
        [
            (self.primary, piece.primary()),
            (self.secondary, piece.secondary()),
        ]
    }

    /// First cell of the landing that is occupied or off `board`.
    #[must_use]
    pub fn blocked_cell(&self, board: &Board) -> Option<Position> {
        self.positions()
            .into_iter()
            .find(|pos| board.is_occupied(pos.x, pos.y))
    }

    /// Writes both puyos onto `board`, or neither if either cell is unavailable.
    ///
    /// Returns whether the puyos were written. No gravity or clearing is applied.
    pub fn place_on(&self, board: &mut Board, piece: &Piece) -> bool {
        if self.primary == self.secondary || self.blocked_cell(board).is_some() {
            return false;
        }
        for (pos, color) in self.cells(piece) {
            board.place(pos.x, pos.y, color);
        }
        true
    }

    /// Returns a copy of `board` with both puyos written in, or `None` if either cell is
    /// unavailable.
    #[must_use]
    pub fn apply_to(&self, board: &Board, piece: &Piece) -> Option<Board> {
        let mut board = board.clone();
        self.place_on(&mut board, piece).then_some(board)
    }
}

/// Enumerates every placement that fits, with its landing.
///
/// Order is rotation ascending, then column ascending; ranking ties keep this order.
#[must_use]
pub fn available_placements(board: &Board) -> ArrayVec<(Placement, Landing), MAX_PLACEMENTS> {
    PieceRotation::ALL
        .into_iter()
        .flat_map(|rotation| {
            Placement::columns(rotation).map(move |column| Placement::new(column, rotation))
        })
        .filter_map(|placement| Some((placement, placement.landing(board)?)))
        .collect()
}
