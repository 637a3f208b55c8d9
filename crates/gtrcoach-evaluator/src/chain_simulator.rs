//! Trigger-and-resolve simulation of the fold's chain.
//!
//! The simulator drops a puyo matching `(0, bottom-2)` onto the trigger cell above the fold
//! and resolves chains inside the simulation region only. Every puyo is tracked back to the
//! cell it started in, so the caller learns exactly which original cells the chain consumed
//! even after they have fallen.

use std::array;

use gtrcoach_engine::{Board, Position};

use crate::template::FoldGeometry;

/// Result of a triggered chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    chain_count: usize,
    consumed: Vec<Position>,
    resolved: Option<Board>,
}

impl ChainOutcome {
    /// Number of clear passes.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chain_count
    }

    /// Original positions of every cleared puyo, excluding the trigger.
    #[must_use]
    pub fn consumed(&self) -> &[Position] {
        &self.consumed
    }

    #[must_use]
    pub fn is_consumed(&self, pos: Position) -> bool {
        self.consumed.contains(&pos)
    }

    /// Board once the chain has settled, or `None` if the trigger was never dropped.
    #[must_use]
    pub fn resolved_board(&self) -> Option<&Board> {
        self.resolved.as_ref()
    }
}

/// Fires the fold's trigger on a copy of `board`.
///
/// Returns an empty outcome when the board has no row above the fold or when
/// `(0, bottom-2)` is empty.
#[must_use]
pub fn simulate_trigger(board: &Board, geometry: &FoldGeometry) -> ChainOutcome {
    let Some(trigger) = geometry.trigger_position() else {
        return ChainOutcome::default();
    };
    let Some(color) = board.color_at(0, geometry.top()) else {
        return ChainOutcome::default();
    };

    let mut board = board.clone();
    let mut origins: Vec<[Option<Position>; Board::WIDTH]> = (0..board.height())
        .map(|y| {
            array::from_fn(|x| board.is_occupied(x, y).then_some(Position::new(x, y)))
        })
        .collect();

    board.remove(trigger.x, trigger.y);
    board.place(trigger.x, trigger.y, color);
    origins[trigger.y][trigger.x] = None;

    let region = geometry.simulation_region();
    let mut outcome = ChainOutcome::default();
    loop {
        while board.apply_gravity_within_observed(&region, |from, to| {
            origins[to.y][to.x] = origins[from.y][from.x].take();
        }) {}

        let cleared = board.clear_groups_within(&region);
        if cleared.is_empty() {
            break;
        }
        outcome.chain_count += 1;
        outcome.consumed.extend(
            cleared
                .iter()
                .filter_map(|pos| origins[pos.y][pos.x].take()),
        );
    }
    outcome.resolved = Some(board);
    outcome
}
