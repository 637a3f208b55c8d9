//! Fold detection and quality scoring.
//!
//! [`PatternDetector::detect`] first checks the seven-cell base. Without it the board gets
//! a zero [`PatternScore`] and nothing else is evaluated. With it, the detector fires the
//! trigger ([`chain_simulator`](crate::chain_simulator)) and combines four measurements:
//!
//! 1. **Base quality**: plain or extended fold
//! 2. **Chain length**: capped number of clear passes
//! 3. **Auxiliary row**: which right-side cells of the row above the fold the chain used
//! 4. **Leftovers**: evaluation-region puyos the chain did not consume
//!
//! The chain, auxiliary row and leftover bonuses are summed into the chain-tail score, which
//! is scaled by a multiplier for the shape of the stacks right of the fold:
//!
//! ```text
//! total = round(base × base_weight + chain_tail × tail_weight × shape_multiplier)
//! ```

use std::{collections::BTreeMap, fmt};

use arrayvec::ArrayVec;
use gtrcoach_engine::{Board, Position, PuyoColor, connected_groups};
use serde::{Deserialize, Serialize};

use crate::{
    chain_simulator::{self, ChainOutcome},
    config::PatternScoringConfig,
    template::{FoldColors, FoldGeometry, TAIL_COLUMNS},
};

/// Message for boards without the fold base.
pub const NO_FOLD_MESSAGE: &str = "No fold base in the bottom-left corner";

/// The base shape found on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldMatch {
    pub colors: FoldColors,
    /// Something sits on columns 0-1 of the row above the template.
    pub extended: bool,
}

/// Looks for the seven-cell base.
///
/// `A` and `B` are read from the template's top row and the remaining cells are verified
/// against them.
#[must_use]
pub fn match_fold(board: &Board) -> Option<FoldMatch> {
    let geometry = FoldGeometry::of(board)?;
    let a = board.color_at(0, geometry.top())?;
    let b = board.color_at(1, geometry.top())?;
    if a == b {
        return None;
    }
    let colors = FoldColors { a, b };
    let matches = geometry
        .slots()
        .all(|(slot, pos)| board.color_at_position(pos) == Some(colors.color_of(slot.color)));
    if !matches {
        return None;
    }
    let extended = geometry
        .row_above()
        .is_some_and(|y| board.is_occupied(0, y) || board.is_occupied(1, y));
    Some(FoldMatch { colors, extended })
}

/// Named stack shapes right of the fold, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum TailShape {
    #[display("Y")]
    Y,
    #[display("broad")]
    Broad,
    #[display("corner")]
    Corner,
    #[display("staircase")]
    Staircase,
}

impl TailShape {
    /// Classifies the stack heights of columns 2 through 5.
    #[must_use]
    pub fn classify(heights: [usize; 4]) -> Option<Self> {
        let [h2, h3, h4, h5] = heights;
        let near = |a: usize, b: usize| a.abs_diff(b) <= 1;

        if h2 >= 3 && h3 >= 3 && h4 >= 3 && near(h2, h3) && near(h3, h4) {
            return Some(Self::Y);
        }
        if heights.iter().all(|&h| h >= 2) && near(h3, h4) && near(h4, h5) {
            return Some(Self::Broad);
        }
        if h2 >= 3 && h3 >= 3 && h4 <= 2 {
            return Some(Self::Corner);
        }
        if (h2 < h3 && h3 < h4) || (h2 > h3 && h3 > h4) {
            return Some(Self::Staircase);
        }
        None
    }

    #[must_use]
    pub fn of_board(board: &Board) -> Option<Self> {
        Self::classify([2, 3, 4, 5].map(|x| board.column_height(x)))
    }
}

/// How the chain used the row above the fold in columns 3-5.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum AuxRowUsage {
    #[display("rightmost only")]
    RightmostOnly,
    #[display("rightmost two")]
    RightmostTwo,
    #[display("partial")]
    Partial,
    #[default]
    #[display("unused")]
    Unused,
}

impl AuxRowUsage {
    /// Classifies by the columns whose original puyo the chain consumed.
    #[must_use]
    pub fn from_columns(columns: &[usize]) -> Self {
        match columns {
            [] => Self::Unused,
            [5] => Self::RightmostOnly,
            [4, 5] => Self::RightmostTwo,
            _ => Self::Partial,
        }
    }
}

/// Detector output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternScore {
    pub has_basic_pattern: bool,
    pub colors: Option<FoldColors>,
    pub extended: bool,
    /// Base score of the fold shape.
    pub quality: u32,
    pub chain_count: usize,
    pub leftover_count: usize,
    pub leftover_connected: bool,
    pub tail_shape: Option<TailShape>,
    pub aux_row_usage: AuxRowUsage,
    /// Sum of the chain, auxiliary row and leftover bonuses.
    pub chain_tail_score: u32,
    pub total_score: u32,
    pub message: String,
}

impl PatternScore {
    #[must_use]
    pub fn no_fold() -> Self {
        Self {
            message: NO_FOLD_MESSAGE.to_owned(),
            ..Self::default()
        }
    }
}

impl fmt::Display for PatternScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_basic_pattern {
            return write!(f, "{}", self.message);
        }
        writeln!(f, "{}", self.message)?;
        writeln!(
            f,
            "  fold: {}{}",
            self.quality,
            if self.extended { " (extended)" } else { "" }
        )?;
        writeln!(f, "  chains: {}", self.chain_count)?;
        writeln!(
            f,
            "  leftovers: {}{}",
            self.leftover_count,
            if self.leftover_connected {
                " (connected)"
            } else {
                ""
            }
        )?;
        writeln!(f, "  aux row: {}", self.aux_row_usage)?;
        match self.tail_shape {
            Some(shape) => writeln!(f, "  tail shape: {shape}")?,
            None => writeln!(f, "  tail shape: -")?,
        }
        write!(f, "  total: {}", self.total_score)
    }
}

/// Summary of the puyos the chain left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Leftovers {
    count: usize,
    colors: usize,
    /// Group sizes of the only color, when there is exactly one.
    single_color_groups: Vec<usize>,
    connected: bool,
}

impl Leftovers {
    fn collect(board: &Board, geometry: &FoldGeometry, outcome: &ChainOutcome) -> Self {
        let mut leftover_board = Board::with_height(board.height());
        let mut by_color: BTreeMap<PuyoColor, usize> = BTreeMap::new();
        for pos in geometry.evaluation_positions() {
            let Some(color) = board.color_at_position(pos) else {
                continue;
            };
            if outcome.is_consumed(pos) {
                continue;
            }
            leftover_board.place(pos.x, pos.y, color);
            *by_color.entry(color).or_default() += 1;
        }

        let groups = connected_groups(&leftover_board, &geometry.simulation_region());
        let connected = by_color.iter().any(|(&color, &count)| {
            count >= 2
                && groups
                    .iter()
                    .any(|g| g.color() == color && g.len() == count)
        });
        let single_color_groups = if by_color.len() == 1 {
            groups.iter().map(|g| g.len()).collect()
        } else {
            vec![]
        };

        Self {
            count: by_color.values().sum(),
            colors: by_color.len(),
            single_color_groups,
            connected,
        }
    }

    fn bonus(&self, config: &PatternScoringConfig) -> u32 {
        let bonus = &config.leftover;
        if self.count == 0 {
            return bonus.none;
        }
        if self.colors > 1 {
            return bonus.multiple_colors;
        }
        match self.single_color_groups.as_slice() {
            [3] => bonus.connected_three,
            [2] => bonus.connected_two,
            [_] => 0,
            _ => bonus.separated,
        }
    }
}

/// Scores how well a board realizes the fold.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: PatternScoringConfig,
}

impl PatternDetector {
    #[must_use]
    pub fn new(config: PatternScoringConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PatternScoringConfig {
        &self.config
    }

    #[must_use]
    pub fn detect(&self, board: &Board) -> PatternScore {
        let (Some(fold), Some(geometry)) = (match_fold(board), FoldGeometry::of(board)) else {
            return PatternScore::no_fold();
        };
        let config = &self.config;

        let quality = if fold.extended {
            config.extended_fold
        } else {
            config.basic_fold
        };

        let outcome = chain_simulator::simulate_trigger(board, &geometry);
        let chain_count = outcome.chain_count();
        let scored_chains = u32::try_from(chain_count.min(config.max_scored_chains)).unwrap_or(0);
        let chain_bonus = scored_chains * config.points_per_chain;

        let aux_row_usage = aux_row_usage(board, &geometry, &outcome);
        let aux_bonus = match aux_row_usage {
            AuxRowUsage::RightmostOnly => config.aux_row.rightmost_only,
            AuxRowUsage::RightmostTwo => config.aux_row.rightmost_two,
            AuxRowUsage::Partial => config.aux_row.partial,
            AuxRowUsage::Unused => config.aux_row.unused,
        };

        let leftovers = Leftovers::collect(board, &geometry, &outcome);
        let leftover_bonus = leftovers.bonus(config);

        let tail_shape = TailShape::of_board(board);
        let multiplier = match tail_shape {
            Some(TailShape::Y) => config.tail_shape.y,
            Some(TailShape::Broad) => config.tail_shape.broad,
            Some(TailShape::Corner) => config.tail_shape.corner,
            Some(TailShape::Staircase) => config.tail_shape.staircase,
            None => config.tail_shape.unclassified,
        };

        let chain_tail_score = chain_bonus + aux_bonus + leftover_bonus;
        #[expect(clippy::cast_precision_loss)]
        let total = quality as f32 * config.base_weight
            + chain_tail_score as f32 * config.tail_weight * multiplier;
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_score = total.round().max(0.0) as u32;

        PatternScore {
            has_basic_pattern: true,
            colors: Some(fold.colors),
            extended: fold.extended,
            quality,
            chain_count,
            leftover_count: leftovers.count,
            leftover_connected: leftovers.connected,
            tail_shape,
            aux_row_usage,
            chain_tail_score,
            total_score,
            message: chain_message(chain_count),
        }
    }
}

fn aux_row_usage(board: &Board, geometry: &FoldGeometry, outcome: &ChainOutcome) -> AuxRowUsage {
    let Some(y) = geometry.row_above() else {
        return AuxRowUsage::Unused;
    };
    let columns: ArrayVec<usize, 3> = TAIL_COLUMNS
        .filter(|&x| board.is_occupied(x, y) && outcome.is_consumed(Position::new(x, y)))
        .collect();
    AuxRowUsage::from_columns(&columns)
}

fn chain_message(chain_count: usize) -> String {
    match chain_count {
        5.. => format!("Excellent! A {chain_count}-chain fold"),
        4 => "Good fold! 4-chain reached".to_owned(),
        3 => "Fold complete with a 3-chain".to_owned(),
        1 | 2 => format!("Fold shape confirmed, {chain_count}-chain so far"),
        0 => "Fold shape confirmed, but the trigger fires no chain".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn with_rows(rows: &[&str]) -> Board {
        let mut all = vec!["......"; Board::DEFAULT_HEIGHT - rows.len()];
        all.extend_from_slice(rows);
        Board::from_rows(all).unwrap()
    }

    #[test]
    fn test_empty_board_is_zero_record() {
        let score = PatternDetector::default().detect(&Board::new());
        assert_eq!(score, PatternScore::no_fold());
        assert_eq!(score.total_score, 0);
        assert_eq!(score.message, NO_FOLD_MESSAGE);
    }

    #[test]
    fn test_inconsistent_colors_are_rejected() {
        // Middle-left cell breaks the A assignment
        let board = with_rows(&["GR....", "RGR...", "RR...."]);
        assert!(match_fold(&board).is_none());
        // A == B
        let board = with_rows(&["RR....", "RRR...", "RR...."]);
        assert!(match_fold(&board).is_none());
        // Missing slot
        let board = with_rows(&["GR....", "GG....", "RR...."]);
        assert!(match_fold(&board).is_none());
    }

    #[test]
    fn test_short_boards_are_zero_record() {
        let detector = PatternDetector::default();
        assert_eq!(detector.detect(&parse("GR....\nGG....")), PatternScore::no_fold());
        assert_eq!(detector.detect(&Board::with_height(0)), PatternScore::no_fold());
    }

    #[test]
    fn test_complete_fold_with_trigger_chain() {
        let board = with_rows(&["GR....", "GGR...", "RR...."]);
        let score = PatternDetector::default().detect(&board);
        assert!(score.has_basic_pattern);
        assert!(!score.extended);
        assert_eq!(score.quality, 100);
        assert_eq!(
            score.colors,
            Some(FoldColors {
                a: PuyoColor::Green,
                b: PuyoColor::Red
            })
        );
        assert_eq!(score.chain_count, 2);
        assert_eq!(score.leftover_count, 0);
        assert_eq!(score.aux_row_usage, AuxRowUsage::Unused);
        assert_eq!(score.tail_shape, None);
        // 2 chains (20) + no leftovers (20)
        assert_eq!(score.chain_tail_score, 40);
        assert_eq!(score.total_score, 70);
        assert!(score.total_score >= 50);
    }

    #[test]
    fn test_extended_fold_scores_higher_base() {
        let board = with_rows(&["Y.....", "GR....", "GGR...", "RR...."]);
        let score = PatternDetector::default().detect(&board);
        assert!(score.extended);
        assert_eq!(score.quality, 120);
        assert!(score.total_score >= 60);
    }

    #[test]
    fn test_leftovers_and_aux_row() {
        // Yellows at (2, 12) and (3, 12) are never touched by the chain; the blue on the
        // row above the fold sits in column 5 and falls without being consumed
        let board = with_rows(&[".....B", "GR....", "GGR...", "RRYY.."]);
        let score = PatternDetector::default().detect(&board);
        assert!(score.has_basic_pattern);
        assert_eq!(score.chain_count, 2);
        assert_eq!(score.leftover_count, 3);
        assert!(score.leftover_connected);
        assert_eq!(score.aux_row_usage, AuxRowUsage::Unused);
        // 2 chains (20) + two leftover colors (0)
        assert_eq!(score.chain_tail_score, 20);
    }

    #[test]
    fn test_single_color_leftover_group() {
        let board = with_rows(&["GR....", "GGR...", "RRYY.."]);
        let score = PatternDetector::default().detect(&board);
        assert_eq!(score.leftover_count, 2);
        assert!(score.leftover_connected);
        // 2 chains (20) + connected pair (15)
        assert_eq!(score.chain_tail_score, 35);
    }

    #[test]
    fn test_aux_row_usage_classification() {
        assert_eq!(AuxRowUsage::from_columns(&[]), AuxRowUsage::Unused);
        assert_eq!(AuxRowUsage::from_columns(&[5]), AuxRowUsage::RightmostOnly);
        assert_eq!(AuxRowUsage::from_columns(&[4, 5]), AuxRowUsage::RightmostTwo);
        assert_eq!(AuxRowUsage::from_columns(&[3]), AuxRowUsage::Partial);
        assert_eq!(AuxRowUsage::from_columns(&[3, 4, 5]), AuxRowUsage::Partial);
    }

    #[test]
    fn test_consumed_aux_cell_counts() {
        // A second green group through (3, 9) clears alongside the trigger's group
        let board = with_rows(&["...G..", "GRGG..", "GGRG..", "RRYY.."]);
        let fold = match_fold(&board).unwrap();
        assert!(!fold.extended);
        let score = PatternDetector::default().detect(&board);
        assert_eq!(score.chain_count, 2);
        assert_eq!(score.aux_row_usage, AuxRowUsage::Partial);
    }

    #[test]
    fn test_tail_shape_classification() {
        assert_eq!(TailShape::classify([3, 4, 3, 0]), Some(TailShape::Y));
        assert_eq!(TailShape::classify([2, 2, 3, 2]), Some(TailShape::Broad));
        assert_eq!(TailShape::classify([4, 3, 1, 0]), Some(TailShape::Corner));
        assert_eq!(TailShape::classify([1, 2, 5, 0]), Some(TailShape::Staircase));
        assert_eq!(TailShape::classify([0, 0, 0, 0]), None);
        // Y requires at least three rows in each column
        assert_eq!(TailShape::classify([2, 3, 3, 0]), None);
    }

    #[test]
    fn test_shape_multiplier_applies() {
        // Columns 2-4 all stand three or more tall: Y shape
        let board = with_rows(&["..BYB.", "..GYB.", "GRBGY.", "GGRYB.", "RRBGY."]);
        let score = PatternDetector::default().detect(&board);
        assert!(score.has_basic_pattern);
        assert_eq!(score.tail_shape, Some(TailShape::Y));
    }
}
