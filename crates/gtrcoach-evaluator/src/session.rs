//! Outcome of an advised play session and classification of failed sessions.
//!
//! A session succeeds when the fold is detected before the turn limit. A failed session is
//! classified from its final board by how far the fold template got:
//!
//! | Category | Condition (checked in order) |
//! |---|---|
//! | `burst` | a chain fired during the session |
//! | `fold_empty` | at most 4 puyos in the fold columns, at least 10 in the tail columns |
//! | `wrong_colors` | 3 or more template slots hold a wrong color |
//! | `first_tier_incomplete` | fewer than 2 correct tier-one slots |
//! | `second_tier_incomplete` | fewer than 3 correct tier-two slots |
//! | `third_tier_incomplete` | fewer than 2 correct tier-three slots |
//! | `too_high` | a fold column stands 6 or more puyos tall |
//! | `other` | none of the above |
//!
//! Slot counts use the color assignment that matches the board best
//! (`3·tier1 + 2·tier2 + tier3 - 2·wrong`).

use gtrcoach_engine::{Board, Landing, Region};
use serde::{Deserialize, Serialize};

use crate::template::{FOLD_COLUMNS, FoldColors, FoldGeometry, TAIL_COLUMNS, Tier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    turns: usize,
    fold_completed_at: Option<usize>,
    first_burst_at: Option<usize>,
    burst_count: usize,
    fold_turns: usize,
    tail_turns: usize,
    game_over: bool,
    final_board: Board,
}

impl Default for SessionOutcome {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOutcome {
    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: 0,
            fold_completed_at: None,
            first_burst_at: None,
            burst_count: 0,
            fold_turns: 0,
            tail_turns: 0,
            game_over: false,
            final_board: Board::new(),
        }
    }

    /// Records a committed placement and the chains it resolved.
    pub fn record_turn(&mut self, turn: usize, landing: &Landing, chains: usize) {
        self.turns = turn;
        if landing
            .positions()
            .iter()
            .any(|pos| FOLD_COLUMNS.contains(&pos.x))
        {
            self.fold_turns += 1;
        } else {
            self.tail_turns += 1;
        }
        if chains > 0 {
            self.burst_count += 1;
            self.first_burst_at.get_or_insert(turn);
        }
    }

    pub fn record_fold_completed(&mut self, turn: usize) {
        self.fold_completed_at = Some(turn);
    }

    pub fn record_game_over(&mut self) {
        self.game_over = true;
    }

    pub fn finish(&mut self, board: &Board) {
        self.final_board = board.clone();
    }

    /// Number of pairs placed.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Turn on which the fold was first detected.
    #[must_use]
    pub fn fold_completed_at(&self) -> Option<usize> {
        self.fold_completed_at
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.fold_completed_at.is_some()
    }

    #[must_use]
    pub fn first_burst_at(&self) -> Option<usize> {
        self.first_burst_at
    }

    #[must_use]
    pub fn burst_count(&self) -> usize {
        self.burst_count
    }

    /// Turns that put at least one puyo in the fold columns.
    #[must_use]
    pub fn fold_turns(&self) -> usize {
        self.fold_turns
    }

    #[must_use]
    pub fn tail_turns(&self) -> usize {
        self.tail_turns
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn final_board(&self) -> &Board {
        &self.final_board
    }

    /// Diagnosis of a failed session, `None` on success.
    #[must_use]
    pub fn failure(&self) -> Option<FailureReport> {
        if self.is_success() {
            return None;
        }
        Some(FailureReport::new(&self.final_board, self.burst_count > 0))
    }
}

/// How the template slots of a board line up with one color assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTally {
    pub colors: Option<FoldColors>,
    /// Occupied slots per tier.
    pub filled: [usize; 3],
    /// Slots holding their assigned color, per tier.
    pub correct: [usize; 3],
    /// Occupied slots holding the other color.
    pub wrong: usize,
}

impl TemplateTally {
    fn of(board: &Board, geometry: &FoldGeometry, colors: FoldColors) -> Self {
        let mut tally = Self {
            colors: Some(colors),
            ..Self::default()
        };
        for (slot, pos) in geometry.slots() {
            let Some(color) = board.color_at_position(pos) else {
                continue;
            };
            let tier = slot.tier.index();
            tally.filled[tier] += 1;
            if color == colors.color_of(slot.color) {
                tally.correct[tier] += 1;
            } else {
                tally.wrong += 1;
            }
        }
        tally
    }

    /// Tally for the assignment that matches `board` best.
    ///
    /// Ties go to the first assignment in enumeration order. Assignments scoring below zero
    /// never win; when every assignment does, the tally is empty and has no colors.
    #[must_use]
    pub fn best(board: &Board) -> Self {
        let Some(geometry) = FoldGeometry::of(board) else {
            return Self::default();
        };
        let mut best = Self::default();
        let mut best_score = -1;
        for colors in FoldColors::all() {
            let tally = Self::of(board, &geometry, colors);
            let score = tally.match_score();
            if score > best_score {
                best = tally;
                best_score = score;
            }
        }
        best
    }

    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn match_score(&self) -> isize {
        let [first, second, third] = self.correct.map(|n| n as isize);
        first * 3 + second * 2 + third - self.wrong as isize * 2
    }

    #[must_use]
    pub fn correct_in(&self, tier: Tier) -> usize {
        self.correct[tier.index()]
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    #[display("burst")]
    Burst,
    #[display("fold empty")]
    FoldEmpty,
    #[display("wrong colors")]
    WrongColors,
    #[display("first tier incomplete")]
    FirstTierIncomplete,
    #[display("second tier incomplete")]
    SecondTierIncomplete,
    #[display("third tier incomplete")]
    ThirdTierIncomplete,
    #[display("too high")]
    TooHigh,
    #[display("other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub category: FailureCategory,
    pub tally: TemplateTally,
    /// Tallest fold column.
    pub fold_height: usize,
    /// Tallest tail column.
    pub tail_height: usize,
    pub fold_puyos: usize,
    pub tail_puyos: usize,
}

impl FailureReport {
    #[must_use]
    pub fn new(board: &Board, burst: bool) -> Self {
        let tally = TemplateTally::best(board);
        let fold_height = FOLD_COLUMNS
            .map(|x| board.column_height(x))
            .max()
            .unwrap_or(0);
        let tail_height = TAIL_COLUMNS
            .map(|x| board.column_height(x))
            .max()
            .unwrap_or(0);
        let rows = 0..board.height();
        let fold_puyos = board.count_occupied_within(&Region::new(FOLD_COLUMNS, rows.clone()));
        let tail_puyos = board.count_occupied_within(&Region::new(TAIL_COLUMNS, rows));

        let category = if burst {
            FailureCategory::Burst
        } else if fold_puyos <= 4 && tail_puyos >= 10 {
            FailureCategory::FoldEmpty
        } else if tally.wrong >= 3 {
            FailureCategory::WrongColors
        } else if tally.correct_in(Tier::First) < 2 {
            FailureCategory::FirstTierIncomplete
        } else if tally.correct_in(Tier::Second) < 3 {
            FailureCategory::SecondTierIncomplete
        } else if tally.correct_in(Tier::Third) < 2 {
            FailureCategory::ThirdTierIncomplete
        } else if fold_height >= 6 {
            FailureCategory::TooHigh
        } else {
            FailureCategory::Other
        };

        Self {
            category,
            tally,
            fold_height,
            tail_height,
            fold_puyos,
            tail_puyos,
        }
    }
}

#[cfg(test)]
mod tests {
    use gtrcoach_engine::{Position, PuyoColor};

    use super::*;

    fn with_rows(rows: &[&str]) -> Board {
        let mut all = vec!["......"; Board::DEFAULT_HEIGHT - rows.len()];
        all.extend_from_slice(rows);
        Board::from_rows(all).unwrap()
    }

    #[test]
    fn test_record_turns() {
        let mut outcome = SessionOutcome::new();
        outcome.record_turn(
            1,
            &Landing::new(Position::new(0, 12), Position::new(1, 12)),
            0,
        );
        outcome.record_turn(
            2,
            &Landing::new(Position::new(4, 12), Position::new(4, 11)),
            1,
        );
        outcome.record_turn(
            3,
            &Landing::new(Position::new(3, 12), Position::new(2, 12)),
            2,
        );
        assert_eq!(outcome.turns(), 3);
        assert_eq!(outcome.fold_turns(), 2);
        assert_eq!(outcome.tail_turns(), 1);
        assert_eq!(outcome.burst_count(), 2);
        assert_eq!(outcome.first_burst_at(), Some(2));
        assert!(!outcome.is_success());

        outcome.record_fold_completed(3);
        assert!(outcome.is_success());
        assert_eq!(outcome.failure(), None);
    }

    #[test]
    fn test_best_tally() {
        let board = with_rows(&["GGR...", "RR...."]);
        let tally = TemplateTally::best(&board);
        assert_eq!(
            tally.colors,
            Some(FoldColors {
                a: PuyoColor::Green,
                b: PuyoColor::Red
            })
        );
        assert_eq!(tally.filled, [2, 3, 0]);
        assert_eq!(tally.correct, [2, 3, 0]);
        assert_eq!(tally.wrong, 0);
        assert_eq!(tally.match_score(), 12);

        let empty = TemplateTally::best(&Board::new());
        assert_eq!(empty.filled, [0; 3]);
        assert_eq!(empty.match_score(), 0);
    }

    #[test]
    fn test_failure_categories() {
        let classify = |rows: &[&str], burst: bool| FailureReport::new(&with_rows(rows), burst);

        assert_eq!(classify(&["RR...."], true).category, FailureCategory::Burst);
        assert_eq!(
            classify(&["...YYB", "...BBY", "...YGB", "R..GYR"], false).category,
            FailureCategory::FoldEmpty
        );
        assert_eq!(
            classify(&["BY....", "YBY...", "GR...."], false).category,
            FailureCategory::WrongColors
        );
        assert_eq!(
            classify(&["R....."], false).category,
            FailureCategory::FirstTierIncomplete
        );
        assert_eq!(
            classify(&["GG....", "RR...."], false).category,
            FailureCategory::SecondTierIncomplete
        );
        assert_eq!(
            classify(&["GGR...", "RR...."], false).category,
            FailureCategory::ThirdTierIncomplete
        );
        assert_eq!(
            classify(&["Y.....", "B.....", "Y.....", "GR....", "GGR...", "RR...."], false)
                .category,
            FailureCategory::TooHigh
        );
    }

    #[test]
    fn test_failure_report_counts() {
        let report = FailureReport::new(&with_rows(&["...Y..", "GGRB..", "RR.BY."]), false);
        assert_eq!(report.fold_height, 2);
        assert_eq!(report.tail_height, 3);
        assert_eq!(report.fold_puyos, 5);
        assert_eq!(report.tail_puyos, 4);
    }
}
