//! Score terms for candidate placements.
//!
//! Each term measures one aspect of a placement from its [`PlacementAnalysis`] and returns
//! an unweighted score (higher is better). The placement evaluator weights the terms by
//! phase.
//!
//! | Term | Measures |
//! |---|---|
//! | [`FoldProgress`] | new puyos on fold template slots, best color assignment |
//! | [`ChainTailShape`] | puyos in the tail columns and the shape of the tail stacks |
//! | [`Connectivity`] | size of the groups the new puyos join |
//! | [`HeightPenalty`] | puyos placed near the top of the board |
//! | [`ChainSimulation`] | fold detected on the resulting board and its chain length |

use std::fmt;

use arrayvec::ArrayVec;
use gtrcoach_engine::{Board, Position, PuyoColor, VisitedCells, connected_group, neighbors};

use crate::{
    config::{
        ChainSimulationScoring, ConnectivityScoring, FoldScoring, HeightScoring, TailScoring,
    },
    pattern_detector::PatternDetector,
    placement_analysis::PlacementAnalysis,
    template::{FOLD_COLUMNS, FoldColors, FoldGeometry, TAIL_COLUMNS, Tier},
};

pub trait ScoreTerm: fmt::Debug + Send + Sync {
    /// Key of this term in the advice breakdown ([`TermScores`](crate::placement_evaluator::TermScores)).
    #[must_use]
    fn id(&self) -> &'static str;
    #[must_use]
    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32;
}

/// Fold-area cells off the template that are exempt from the off-template penalty once the
/// tier they rest against is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldAreaException {
    /// `(2, bottom)`: support under the tier-two `B` slot.
    SteppingStone,
    /// `(2, bottom-2)`: links the fold to the chain tail.
    TailConnector,
}

impl FoldAreaException {
    #[must_use]
    pub fn at(pos: Position, geometry: &FoldGeometry) -> Option<Self> {
        if pos.x != 2 {
            return None;
        }
        if pos.y == geometry.bottom() {
            Some(Self::SteppingStone)
        } else if pos.y == geometry.top() {
            Some(Self::TailConnector)
        } else {
            None
        }
    }

    #[must_use]
    pub fn prerequisite(self) -> Tier {
        match self {
            Self::SteppingStone => Tier::First,
            Self::TailConnector => Tier::Second,
        }
    }

    /// Whether every slot of the prerequisite tier is occupied on `board`.
    #[must_use]
    pub fn applies(self, board: &Board, geometry: &FoldGeometry) -> bool {
        geometry
            .tier_slots(self.prerequisite())
            .all(|(_, pos)| board.is_occupied(pos.x, pos.y))
    }
}

/// Progress toward the fold template.
///
/// Every ordered color pair is tried as the template's `(A, B)`. A pair is rejected when a
/// slot that was already occupied before the placement holds the wrong color; otherwise
/// each placed puyo on a slot scores its tier bonus (scaled down while the tier below is
/// incomplete) or the wrong-color penalty. The best pair wins, and 0 when every pair is
/// rejected. The area penalty is added on top:
///
/// - fold-column puyo above the template rows: `too_high`
/// - fold-column puyo inside the template rows but off the template: `off_template`, unless
///   a [`FoldAreaException`] applies
#[derive(Debug, Clone)]
pub struct FoldProgress {
    config: FoldScoring,
}

impl FoldProgress {
    #[must_use]
    pub fn new(config: FoldScoring) -> Self {
        Self { config }
    }

    fn template_score(
        &self,
        analysis: &PlacementAnalysis<'_>,
        geometry: &FoldGeometry,
        colors: FoldColors,
    ) -> Option<f32> {
        let before = analysis.before();
        let contradicted = geometry.slots().any(|(slot, pos)| {
            before
                .color_at_position(pos)
                .is_some_and(|color| color != colors.color_of(slot.color))
        });
        if contradicted {
            return None;
        }

        let mut score = 0.0;
        for (pos, color) in analysis.placed_cells() {
            let Some(slot) = geometry.slot_at(pos) else {
                continue;
            };
            if color != colors.color_of(slot.color) {
                score += self.config.wrong_color;
                continue;
            }
            let prerequisite_met = slot
                .tier
                .prerequisite()
                .is_none_or(|tier| geometry.is_tier_complete(before, tier, colors));
            let multiplier = if prerequisite_met {
                1.0
            } else {
                self.config.prerequisite_multiplier
            };
            score += self.config.tier_bonus[slot.tier.index()] * multiplier;
        }
        Some(score)
    }

    fn area_penalty(&self, analysis: &PlacementAnalysis<'_>, geometry: &FoldGeometry) -> f32 {
        analysis
            .placed_cells()
            .into_iter()
            .map(|(pos, _)| {
                if !FOLD_COLUMNS.contains(&pos.x) {
                    return 0.0;
                }
                if pos.y < geometry.top() {
                    return self.config.too_high;
                }
                if geometry.slot_at(pos).is_some() {
                    return 0.0;
                }
                match FoldAreaException::at(pos, geometry) {
                    Some(exception) if exception.applies(analysis.before(), geometry) => 0.0,
                    _ => self.config.off_template,
                }
            })
            .sum()
    }
}

impl ScoreTerm for FoldProgress {
    fn id(&self) -> &'static str {
        "fold_progress"
    }

    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32 {
        let Some(geometry) = analysis.geometry() else {
            return 0.0;
        };
        let template = FoldColors::all()
            .into_iter()
            .filter_map(|colors| self.template_score(analysis, &geometry, colors))
            .max_by(f32::total_cmp)
            .unwrap_or(0.0);
        template + self.area_penalty(analysis, &geometry)
    }
}

/// Shape of the chain tail in columns 3-5.
///
/// Per placed puyo in a tail column: a base bonus, a bonus for a same-colored orthogonal
/// neighbor within the tail columns and a bonus for landing in the bottom two rows. Per
/// placement: a bonus when the tail stack heights differ by at most one, a bonus per touched
/// tail column holding two or more colors and a penalty per touched tail column standing
/// more than one row above every adjacent tail column. Any puyo above row `bottom-3` is
/// penalized regardless of column.
#[derive(Debug, Clone)]
pub struct ChainTailShape {
    config: TailScoring,
}

impl ChainTailShape {
    #[must_use]
    pub fn new(config: TailScoring) -> Self {
        Self { config }
    }

    fn column_score(&self, board: &Board, x: usize) -> f32 {
        let mut score = 0.0;

        let mut colors: ArrayVec<PuyoColor, { PuyoColor::LEN }> = ArrayVec::new();
        for color in (0..board.height()).filter_map(|y| board.color_at(x, y)) {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
        if colors.len() >= 2 {
            score += self.config.layered_column;
        }

        let height = board.column_height(x);
        let mut adjacent = [x - 1, x + 1]
            .into_iter()
            .filter(|ax| TAIL_COLUMNS.contains(ax))
            .map(|ax| board.column_height(ax))
            .peekable();
        if adjacent.peek().is_some() && adjacent.all(|h| height > h + 1) {
            score += self.config.tower;
        }
        score
    }
}

impl ScoreTerm for ChainTailShape {
    fn id(&self) -> &'static str {
        "chain_tail"
    }

    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32 {
        let Some(geometry) = analysis.geometry() else {
            return 0.0;
        };
        let board = analysis.after();
        let bottom = geometry.bottom();

        let mut score = 0.0;
        let mut touched: ArrayVec<usize, 2> = ArrayVec::new();
        for (pos, color) in analysis.placed_cells() {
            if pos.y + 3 < bottom {
                score += self.config.too_high;
            }
            if !TAIL_COLUMNS.contains(&pos.x) {
                continue;
            }
            score += self.config.tail_column;
            let has_neighbor = neighbors(pos).any(|n| {
                TAIL_COLUMNS.contains(&n.x) && board.color_at_position(n) == Some(color)
            });
            if has_neighbor {
                score += self.config.same_color_neighbor;
            }
            if pos.y + 1 >= bottom {
                score += self.config.bottom_rows;
            }
            if !touched.contains(&pos.x) {
                touched.push(pos.x);
            }
        }

        if touched.is_empty() {
            return score;
        }

        let heights: ArrayVec<usize, 3> = TAIL_COLUMNS.map(|x| board.column_height(x)).collect();
        let max = heights.iter().max().copied().unwrap_or(0);
        let min = heights.iter().min().copied().unwrap_or(0);
        if max - min <= 1 {
            score += self.config.balanced_heights;
        }

        score
            + touched
                .iter()
                .map(|&x| self.column_score(board, x))
                .sum::<f32>()
    }
}

/// Groups formed by the placed puyos on the hypothetical board.
///
/// Each group is counted once even when both puyos belong to it. Groups of two and three
/// are rewarded and groups of four or more (a burst) are penalized. A group of three also
/// loses points when it is a straight vertical stack or when it reaches into the fold area
/// off the template.
#[derive(Debug, Clone)]
pub struct Connectivity {
    config: ConnectivityScoring,
}

impl Connectivity {
    #[must_use]
    pub fn new(config: ConnectivityScoring) -> Self {
        Self { config }
    }
}

impl ScoreTerm for Connectivity {
    fn id(&self) -> &'static str {
        "connectivity"
    }

    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32 {
        let board = analysis.after();
        let geometry = analysis.geometry();
        let region = board.region();
        let mut visited = VisitedCells::new(board.height());

        let mut score = 0.0;
        for (pos, _) in analysis.placed_cells() {
            let Some(group) = connected_group(board, pos, &region, &mut visited) else {
                continue;
            };
            score += match group.len() {
                2 => self.config.pair,
                3 => {
                    let mut triple = self.config.triple;
                    let cells = group.cells();
                    if cells.iter().all(|c| c.x == cells[0].x) {
                        triple += self.config.vertical_triple;
                    }
                    let misplaced = geometry.is_some_and(|geometry| {
                        cells
                            .iter()
                            .any(|&c| geometry.in_fold_area(c) && geometry.slot_at(c).is_none())
                    });
                    if misplaced {
                        triple += self.config.misplaced_triple;
                    }
                    triple
                }
                n if n >= Board::CLEAR_GROUP_SIZE => self.config.burst,
                _ => 0.0,
            };
        }
        score
    }
}

/// Puyos placed close to the top of the board.
#[derive(Debug, Clone)]
pub struct HeightPenalty {
    config: HeightScoring,
}

impl HeightPenalty {
    #[must_use]
    pub fn new(config: HeightScoring) -> Self {
        Self { config }
    }
}

impl ScoreTerm for HeightPenalty {
    fn id(&self) -> &'static str {
        "height"
    }

    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32 {
        analysis
            .placed_cells()
            .into_iter()
            .map(|(pos, _)| {
                if pos.y <= self.config.critical_row {
                    self.config.critical
                } else if pos.y <= self.config.warning_row {
                    self.config.warning
                } else {
                    0.0
                }
            })
            .sum()
    }
}

/// Runs the pattern detector on the hypothetical board.
#[derive(Debug, Clone)]
pub struct ChainSimulation {
    config: ChainSimulationScoring,
    detector: PatternDetector,
}

impl ChainSimulation {
    #[must_use]
    pub fn new(config: ChainSimulationScoring, detector: PatternDetector) -> Self {
        Self { config, detector }
    }
}

impl ScoreTerm for ChainSimulation {
    fn id(&self) -> &'static str {
        "chain_simulation"
    }

    fn score(&self, analysis: &PlacementAnalysis<'_>) -> f32 {
        let pattern = analysis.after_pattern(&self.detector);
        if !pattern.has_basic_pattern {
            return 0.0;
        }
        #[expect(clippy::cast_precision_loss)]
        let chains = pattern.chain_count as f32;
        self.config.pattern_bonus + chains * self.config.per_chain
    }
}

#[cfg(test)]
mod tests {
    use gtrcoach_engine::{Piece, PieceRotation, Placement};

    use super::*;
    use crate::phase::Phase;

    fn with_rows(rows: &[&str]) -> Board {
        let mut all = vec!["......"; Board::DEFAULT_HEIGHT - rows.len()];
        all.extend_from_slice(rows);
        Board::from_rows(all).unwrap()
    }

    fn score_of(
        term: &dyn ScoreTerm,
        board: &Board,
        piece: &str,
        column: usize,
        rotation: PieceRotation,
    ) -> f32 {
        let piece: Piece = piece.parse().unwrap();
        let placement = Placement::new(column, rotation);
        let landing = placement.landing(board).unwrap();
        let analysis = PlacementAnalysis::new(board, Phase::FoldBuilding, piece, landing).unwrap();
        term.score(&analysis)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_fold_progress_on_empty_board() {
        let term = FoldProgress::new(FoldScoring::default());
        let board = Board::new();
        // Both puyos on tier-one slots
        assert_close(score_of(&term, &board, "RR", 0, PieceRotation::RIGHT), 40.0);
        // Tier one plus a wrong color on the tier-two slot above it
        assert_close(score_of(&term, &board, "RR", 0, PieceRotation::UP), -5.0);
        // Tail columns carry no fold penalty
        assert_close(score_of(&term, &board, "RG", 4, PieceRotation::UP), 0.0);
    }

    #[test]
    fn test_fold_progress_prerequisite_halves_bonus() {
        let term = FoldProgress::new(FoldScoring::default());
        // Tier one is only half built
        let board = with_rows(&["R....."]);
        // G on (1, 12) is wrong for B = R; G on (1, 11) would be tier two at half bonus
        let score = score_of(&term, &board, "GG", 1, PieceRotation::UP);
        assert_close(score, -25.0 + 9.0);

        let board = with_rows(&["RR...."]);
        // Tier one complete: tier-two slots earn their full bonus
        assert_close(score_of(&term, &board, "GG", 0, PieceRotation::RIGHT), 36.0);
    }

    #[test]
    fn test_fold_progress_rejected_pairs_fall_back_to_area_penalty() {
        let term = FoldProgress::new(FoldScoring::default());
        // Tier one holds two different colors: no assignment is consistent
        let board = with_rows(&["RG...."]);
        assert_close(score_of(&term, &board, "YY", 4, PieceRotation::UP), 0.0);
        // Column 2 is off the template on the bottom row and tier one is filled
        assert_close(score_of(&term, &board, "YB", 2, PieceRotation::UP), 0.0);
    }

    #[test]
    fn test_fold_area_penalties() {
        let term = FoldProgress::new(FoldScoring::default());
        // Stepping stone before tier one exists is off the template
        let board = Board::new();
        let score = score_of(&term, &board, "YB", 2, PieceRotation::UP);
        // (2, 12) off template: -5; (2, 11) is tier two B with prerequisite missing
        assert_close(score, -5.0 + 9.0);

        // Puyos stacked above the template rows
        let board = with_rows(&["GR....", "GGR...", "RR...."]);
        let score = score_of(&term, &board, "YB", 0, PieceRotation::UP);
        assert_close(score, -40.0);
    }

    #[test]
    fn test_fold_area_exceptions() {
        let geometry = FoldGeometry::of(&Board::new()).unwrap();
        assert_eq!(
            FoldAreaException::at(Position::new(2, 12), &geometry),
            Some(FoldAreaException::SteppingStone)
        );
        assert_eq!(
            FoldAreaException::at(Position::new(2, 10), &geometry),
            Some(FoldAreaException::TailConnector)
        );
        assert_eq!(FoldAreaException::at(Position::new(2, 11), &geometry), None);

        let board = with_rows(&["GGR...", "RR...."]);
        assert!(FoldAreaException::TailConnector.applies(&board, &geometry));
        assert!(!FoldAreaException::TailConnector.applies(&with_rows(&["RR...."]), &geometry));
    }

    #[test]
    fn test_chain_tail_vertical_pair() {
        let term = ChainTailShape::new(TailScoring::default());
        // Two tail puyos with a same-colored neighbor in the bottom rows, one lone tower
        let score = score_of(&term, &Board::new(), "RR", 4, PieceRotation::UP);
        assert_close(score, 2.0 * (10.0 + 6.0 + 5.0) - 15.0);
    }

    #[test]
    fn test_chain_tail_balanced_layers() {
        let term = ChainTailShape::new(TailScoring::default());
        let board = with_rows(&["...GBY"]);
        let score = score_of(&term, &board, "RY", 3, PieceRotation::RIGHT);
        // Two tail cells, no same-colored neighbor (Y at (4, 11) sits on B), both in the
        // bottom two rows, balanced heights, two layered columns
        assert_close(score, 2.0 * (10.0 + 5.0) + 8.0 + 2.0 * 3.0);
    }

    #[test]
    fn test_chain_tail_ignores_fold_columns() {
        let term = ChainTailShape::new(TailScoring::default());
        assert_close(score_of(&term, &Board::new(), "RG", 0, PieceRotation::RIGHT), 0.0);
    }

    #[test]
    fn test_connectivity_groups() {
        let term = Connectivity::new(ConnectivityScoring::default());
        // One shared pair group
        assert_close(score_of(&term, &Board::new(), "RR", 4, PieceRotation::RIGHT), 10.0);

        // Vertical triple in a tail column
        let board = with_rows(&["....R."]);
        assert_close(score_of(&term, &board, "RR", 4, PieceRotation::UP), 25.0 - 10.0);

        // Burst
        let board = with_rows(&["RRR..."]);
        assert_close(score_of(&term, &board, "RB", 3, PieceRotation::UP), -50.0);
    }

    #[test]
    fn test_connectivity_misplaced_triple() {
        let term = Connectivity::new(ConnectivityScoring::default());
        // Triple reaching the stepping-stone cell (2, 12)
        let board = with_rows(&["..R..."]);
        let score = score_of(&term, &board, "RR", 3, PieceRotation::RIGHT);
        assert_close(score, 25.0 - 10.0);
    }

    #[test]
    fn test_height_penalty() {
        let term = HeightPenalty::new(HeightScoring::default());
        assert_close(score_of(&term, &Board::new(), "RG", 0, PieceRotation::UP), 0.0);

        let mut rows = vec!["......"; 3];
        rows.extend(vec!["R....."; 10]);
        let board = Board::from_rows(rows).unwrap();
        // Lands on rows 2 and 1
        assert_close(score_of(&term, &board, "GB", 0, PieceRotation::UP), -60.0);

        let mut rows = vec!["......"; 5];
        rows.extend(vec!["R....."; 8]);
        let board = Board::from_rows(rows).unwrap();
        // Lands on rows 4 and 3
        assert_close(score_of(&term, &board, "GB", 0, PieceRotation::UP), -30.0);
    }

    #[test]
    fn test_chain_simulation_term() {
        let term = ChainSimulation::new(ChainSimulationScoring::default(), PatternDetector::default());
        let board = with_rows(&["G.....", "GGR...", "RR...."]);
        // Completes the fold with R at (1, 10); the trigger then fires two links
        let score = score_of(&term, &board, "RY", 1, PieceRotation::UP);
        assert_close(score, 10.0 + 2.0 * 15.0);
        assert_close(score_of(&term, &Board::new(), "RR", 0, PieceRotation::UP), 0.0);
    }
}
