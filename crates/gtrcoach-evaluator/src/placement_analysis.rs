//! Analysis of a single candidate placement.
//!
//! [`PlacementAnalysis`] holds the board before the placement, the hypothetical board after
//! it (both puyos written at their landing cells, no gravity and no clearing) and the phase
//! of the board before the placement. Score terms read whichever side they need.
//!
//! Running the pattern detector on the hypothetical board is the most expensive step of
//! scoring, so its result is computed on first use and cached.

use std::cell::OnceCell;

use gtrcoach_engine::{Board, Landing, Piece, Position, PuyoColor};

use crate::{
    pattern_detector::{PatternDetector, PatternScore},
    phase::Phase,
    template::FoldGeometry,
};

#[derive(Debug)]
pub struct PlacementAnalysis<'a> {
    before: &'a Board,
    phase: Phase,
    placed_cells: [(Position, PuyoColor); 2],
    after: Board,
    after_pattern: OnceCell<PatternScore>,
}

impl<'a> PlacementAnalysis<'a> {
    /// Analysis of `piece` written at `landing`, or `None` if either landing cell is taken.
    #[must_use]
    pub fn new(before: &'a Board, phase: Phase, piece: Piece, landing: Landing) -> Option<Self> {
        let after = landing.apply_to(before, &piece)?;
        Some(Self {
            before,
            phase,
            placed_cells: landing.cells(&piece),
            after,
            after_pattern: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn before(&self) -> &'a Board {
        self.before
    }

    #[must_use]
    pub fn after(&self) -> &Board {
        &self.after
    }

    /// Phase of the board before the placement.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The two placed puyos with their landing cells.
    #[must_use]
    pub fn placed_cells(&self) -> [(Position, PuyoColor); 2] {
        self.placed_cells
    }

    #[must_use]
    pub fn geometry(&self) -> Option<FoldGeometry> {
        FoldGeometry::of(&self.after)
    }

    /// Detector result for the board after the placement.
    pub fn after_pattern(&self, detector: &PatternDetector) -> &PatternScore {
        self.after_pattern
            .get_or_init(|| detector.detect(&self.after))
    }
}

#[cfg(test)]
mod tests {
    use gtrcoach_engine::{PieceRotation, Placement};

    use super::*;

    #[test]
    fn test_after_board_has_both_puyos() {
        let before = Board::new();
        let piece = Piece::new(PuyoColor::Red, PuyoColor::Blue);
        let placement = Placement::new(4, PieceRotation::UP);
        let landing = placement.landing(&before).unwrap();
        let analysis = PlacementAnalysis::new(&before, Phase::FoldBuilding, piece, landing).unwrap();

        assert_eq!(analysis.after().color_at(4, 12), Some(PuyoColor::Red));
        assert_eq!(analysis.after().color_at(4, 11), Some(PuyoColor::Blue));
        assert_eq!(analysis.before(), &Board::new());
        assert_eq!(
            analysis.placed_cells(),
            [
                (Position::new(4, 12), PuyoColor::Red),
                (Position::new(4, 11), PuyoColor::Blue)
            ]
        );
    }

    #[test]
    fn test_no_clearing_on_hypothetical_board() {
        let before: Board = "......\n......\nRRR...".parse().unwrap();
        let piece = Piece::new(PuyoColor::Red, PuyoColor::Red);
        let placement = Placement::new(3, PieceRotation::UP);
        let landing = placement.landing(&before).unwrap();
        let analysis = PlacementAnalysis::new(&before, Phase::FoldBuilding, piece, landing).unwrap();
        assert_eq!(analysis.after().color_at(0, 2), Some(PuyoColor::Red));
        assert_eq!(analysis.after().color_at(3, 1), Some(PuyoColor::Red));
    }

    #[test]
    fn test_after_pattern_is_cached() {
        let before: Board = "......\nGR....\nGG....\nRR....".parse().unwrap();
        let piece = Piece::new(PuyoColor::Red, PuyoColor::Yellow);
        let placement = Placement::new(2, PieceRotation::UP);
        let landing = placement.landing(&before).unwrap();
        let analysis = PlacementAnalysis::new(&before, Phase::FoldBuilding, piece, landing).unwrap();

        let detector = PatternDetector::default();
        // Red lands on (2, 3), yellow on (2, 2): the base needs red at (2, 2)
        assert!(!analysis.after_pattern(&detector).has_basic_pattern);
        assert!(std::ptr::eq(
            analysis.after_pattern(&detector),
            analysis.after_pattern(&detector)
        ));
    }

    #[test]
    fn test_blocked_landing_has_no_analysis() {
        let before: Board = "......\nR.....".parse().unwrap();
        let piece = Piece::new(PuyoColor::Blue, PuyoColor::Green);
        let landing = Landing::new(Position::new(0, 1), Position::new(0, 0));
        assert!(PlacementAnalysis::new(&before, Phase::FoldBuilding, piece, landing).is_none());
    }
}
