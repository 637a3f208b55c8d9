//! Placement evaluation: combining score terms into one placement score.
//!
//! [`HeuristicPlacementEvaluator`] scores a placement as a phase-weighted sum of its
//! [`ScoreTerm`]s:
//!
//! ```text
//! score = w_fold·fold + w_tail·tail + w_conn·connectivity + w_height·height
//!       + w_chain·chain_simulation + w_look·lookahead
//! ```
//!
//! The weights come from the phase of the board before the placement. Two terms only run at
//! [`EvaluationDepth::Full`] and only when their weight is positive:
//!
//! - **chain simulation**, the pattern detector on the resulting board
//! - **lookahead**, the best shallow score the next pair can reach on the resulting board
//!
//! Lookahead scores the follow-up placements at [`EvaluationDepth::Shallow`], so the search
//! never goes deeper than one pair.

use std::fmt;

use gtrcoach_engine::{Board, Piece, available_placements};
use serde::{Deserialize, Serialize};

use crate::{
    config::{PhaseWeightTable, ScoringConfig},
    pattern_detector::PatternDetector,
    phase::Phase,
    placement_analysis::PlacementAnalysis,
    score_term::{
        ChainSimulation, ChainTailShape, Connectivity, FoldProgress, HeightPenalty, ScoreTerm,
    },
};

/// How much of the scoring to run for a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationDepth {
    /// Every term, including chain simulation and lookahead.
    Full,
    /// The four base terms only.
    Shallow,
}

/// Weighted contribution of each term to a placement's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TermScores {
    pub fold_progress: f32,
    pub chain_tail: f32,
    pub connectivity: f32,
    pub height: f32,
    pub chain_simulation: f32,
    pub lookahead: f32,
}

impl TermScores {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.fold_progress
            + self.chain_tail
            + self.connectivity
            + self.height
            + self.chain_simulation
            + self.lookahead
    }
}

/// Evaluates placements by assigning term scores (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores the placement described by `analysis`.
    ///
    /// `next` is the pair that follows; it is only used for lookahead at
    /// [`EvaluationDepth::Full`].
    fn evaluate_placement(
        &self,
        analysis: &PlacementAnalysis<'_>,
        next: Option<&Piece>,
        depth: EvaluationDepth,
    ) -> TermScores;

    /// Phase of `board` as this evaluator classifies it.
    fn phase_of(&self, board: &Board) -> Phase;
}

#[derive(Debug, Clone)]
pub struct HeuristicPlacementEvaluator {
    fold_progress: FoldProgress,
    chain_tail: ChainTailShape,
    connectivity: Connectivity,
    height: HeightPenalty,
    chain_simulation: ChainSimulation,
    weights: PhaseWeightTable,
    completion_tail_cells: usize,
}

impl HeuristicPlacementEvaluator {
    #[must_use]
    pub fn new(config: &ScoringConfig) -> Self {
        let advisor = &config.advisor;
        Self {
            fold_progress: FoldProgress::new(advisor.fold.clone()),
            chain_tail: ChainTailShape::new(advisor.tail.clone()),
            connectivity: Connectivity::new(advisor.connectivity.clone()),
            height: HeightPenalty::new(advisor.height.clone()),
            chain_simulation: ChainSimulation::new(
                advisor.chain_simulation.clone(),
                PatternDetector::new(config.pattern.clone()),
            ),
            weights: advisor.weights.clone(),
            completion_tail_cells: advisor.completion_tail_cells,
        }
    }

    /// Best shallow score `next` can reach on `board`, or `None` if it fits nowhere.
    fn best_follow_up(&self, board: &Board, next: &Piece) -> Option<f32> {
        let phase = self.phase_of(board);
        available_placements(board)
            .into_iter()
            .filter_map(|(_, landing)| PlacementAnalysis::new(board, phase, *next, landing))
            .map(|follow_up| {
                self.evaluate_placement(&follow_up, None, EvaluationDepth::Shallow)
                    .total()
            })
            .max_by(f32::total_cmp)
    }
}

impl Default for HeuristicPlacementEvaluator {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl PlacementEvaluator for HeuristicPlacementEvaluator {
    fn evaluate_placement(
        &self,
        analysis: &PlacementAnalysis<'_>,
        next: Option<&Piece>,
        depth: EvaluationDepth,
    ) -> TermScores {
        let weights = self.weights.get(analysis.phase());
        let mut scores = TermScores {
            fold_progress: weighted(&self.fold_progress, weights.fold_progress, analysis),
            chain_tail: weighted(&self.chain_tail, weights.chain_tail, analysis),
            connectivity: weighted(&self.connectivity, weights.connectivity, analysis),
            height: weighted(&self.height, weights.height, analysis),
            ..TermScores::default()
        };

        if depth == EvaluationDepth::Shallow {
            return scores;
        }

        if weights.chain_simulation > 0.0 {
            scores.chain_simulation =
                weighted(&self.chain_simulation, weights.chain_simulation, analysis);
        }
        if let Some(next) = next.filter(|_| weights.lookahead > 0.0) {
            let best = self.best_follow_up(analysis.after(), next).unwrap_or(0.0);
            scores.lookahead = weights.lookahead * best;
        }
        scores
    }

    fn phase_of(&self, board: &Board) -> Phase {
        Phase::detect(board, self.completion_tail_cells)
    }
}

fn weighted(term: &dyn ScoreTerm, weight: f32, analysis: &PlacementAnalysis<'_>) -> f32 {
    let raw = term.score(analysis);
    log::trace!("  {}: {raw:.2} x {weight}", term.id());
    weight * raw
}
