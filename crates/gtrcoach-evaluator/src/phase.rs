//! Build phase of a board.
//!
//! The phase is derived from the board on every call and never stored:
//!
//! ```text
//! FoldBuilding --(base complete)--> ChainTail --(tail filled)--> Completion
//! ```
//!
//! A board loses its phase as soon as the fold disappears (for example after a burst).

use gtrcoach_engine::Board;
use serde::{Deserialize, Serialize};

use crate::{pattern_detector::match_fold, template::FoldGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[display("fold building")]
    FoldBuilding,
    #[display("chain tail")]
    ChainTail,
    #[display("completion")]
    Completion,
}

impl Phase {
    /// Classifies `board`.
    ///
    /// With the base in place, the phase turns to completion once at least
    /// `completion_tail_cells` puyos sit in the tail columns' bottom four rows.
    #[must_use]
    pub fn detect(board: &Board, completion_tail_cells: usize) -> Self {
        if match_fold(board).is_none() {
            return Self::FoldBuilding;
        }
        let tail_cells = FoldGeometry::of(board)
            .map_or(0, |geometry| board.count_occupied_within(&geometry.tail_base_region()));
        if tail_cells >= completion_tail_cells {
            Self::Completion
        } else {
            Self::ChainTail
        }
    }

    /// Guidance shown with the advice.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::FoldBuilding => "Build the fold: stack puyos in the bottom-left corner",
            Self::ChainTail => "Extend the chain tail: stack puyos on the right side",
            Self::Completion => "Finish the fold pattern",
        }
    }
}
