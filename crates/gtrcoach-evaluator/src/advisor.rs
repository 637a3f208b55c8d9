//! Placement advice: ranking every placement of the current pair.
//!
//! [`PlacementAdvisor::advise`] enumerates the placements of the current pair, scores each
//! with the placement evaluator (lookahead with the next pair included) and returns them
//! ranked best first together with the board's phase.
//!
//! Ranking is a stable sort by total score, so placements with equal scores keep their
//! enumeration order (rotation ascending, then column ascending).
//!
//! [`PlacementAdvisor::play_session`] follows the advice on a [`GameField`] until the fold is
//! built, the game ends or the turn limit runs out.

use gtrcoach_engine::{Board, GameField, Landing, Piece, Placement, available_placements};
use serde::Serialize;

use crate::{
    config::ScoringConfig,
    pattern_detector::match_fold,
    phase::Phase,
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{
        EvaluationDepth, HeuristicPlacementEvaluator, PlacementEvaluator, TermScores,
    },
    session::SessionOutcome,
};

/// A scored placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementCandidate {
    pub placement: Placement,
    pub landing: Landing,
    pub terms: TermScores,
    pub total_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementAdvice {
    /// Highest-ranked candidate, `None` when the pair fits nowhere.
    pub best: Option<PlacementCandidate>,
    /// Every candidate, best first.
    pub ranked: Vec<PlacementCandidate>,
    pub phase: Phase,
    pub phase_message: &'static str,
}

#[derive(Debug)]
pub struct PlacementAdvisor<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> PlacementAdvisor<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Advisor backed by the heuristic evaluator with `config`.
    #[must_use]
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(Box::new(HeuristicPlacementEvaluator::new(config)))
    }

    /// Ranks every placement of `current` on `board`.
    ///
    /// `next` enables lookahead. `board` is only read.
    #[must_use]
    pub fn advise(&self, board: &Board, current: &Piece, next: Option<&Piece>) -> PlacementAdvice {
        let phase = self.placement_evaluator.phase_of(board);

        let mut ranked: Vec<PlacementCandidate> = available_placements(board)
            .into_iter()
            .filter_map(|(placement, landing)| {
                let analysis = PlacementAnalysis::new(board, phase, *current, landing)?;
                let terms = self.placement_evaluator.evaluate_placement(
                    &analysis,
                    next,
                    EvaluationDepth::Full,
                );
                let candidate = PlacementCandidate {
                    placement,
                    landing,
                    terms,
                    total_score: terms.total(),
                };
                log::trace!(
                    "candidate column={} rotation={}: {:.1}",
                    placement.column(),
                    placement.rotation().as_u8(),
                    candidate.total_score
                );
                Some(candidate)
            })
            .collect();
        ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        let best = ranked.first().copied();
        log::debug!("phase: {phase}");
        match &best {
            Some(best) => log::debug!(
                "best placement: column={} rotation={} score={:.1}",
                best.placement.column(),
                best.placement.rotation().as_u8(),
                best.total_score
            ),
            None => log::debug!("no placement fits the current pair"),
        }

        PlacementAdvice {
            best,
            ranked,
            phase,
            phase_message: phase.message(),
        }
    }

    /// Plays up to `turn_limit` pairs from `field`, always taking the best placement.
    ///
    /// Chains resolve on the real board. Play stops as soon as the fold is detected, when
    /// the game is over or when no placement fits.
    pub fn play_session(&self, field: &mut GameField, turn_limit: usize) -> SessionOutcome {
        let mut outcome = SessionOutcome::new();
        for turn in 1..=turn_limit {
            let current = field.current_pair();
            let next = (turn < turn_limit).then(|| field.next_pair());
            let advice = self.advise(field.board(), &current, next.as_ref());
            let Some(best) = advice.best else {
                log::debug!("turn {turn}: no placement fits");
                break;
            };

            let (chains, result) = field.complete_placement(&best.landing);
            outcome.record_turn(turn, &best.landing, chains);
            if chains > 0 {
                log::debug!("turn {turn}: burst with {chains} chain(s)");
            }

            if match_fold(field.board()).is_some() {
                log::debug!("turn {turn}: fold completed");
                outcome.record_fold_completed(turn);
                break;
            }
            if let Err(err) = result {
                log::debug!("turn {turn}: {err}");
                outcome.record_game_over();
                break;
            }
        }
        outcome.finish(field.board());
        outcome
    }
}

impl Default for PlacementAdvisor<'_> {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}
