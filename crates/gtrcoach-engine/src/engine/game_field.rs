use crate::{
    CompletePlacementError,
    core::{board::Board, piece::Piece, placement::Landing},
};

use super::pair_buffer::{PairBuffer, PairSeed};

/// Single-game state: the board, the pair in play and the pair queue.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    current_pair: Piece,
    pair_buffer: PairBuffer,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::from_buffer(Board::new(), PairBuffer::new())
    }

    #[must_use]
    pub fn with_seed(seed: PairSeed) -> Self {
        Self::from_buffer(Board::new(), PairBuffer::with_seed(seed))
    }

    /// Starts from an existing board, drawing pairs from `pair_buffer`.
    #[must_use]
    pub fn from_buffer(board: Board, mut pair_buffer: PairBuffer) -> Self {
        let current_pair = pair_buffer.pop_next();
        Self {
            board,
            current_pair,
            pair_buffer,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_pair(&self) -> Piece {
        self.current_pair
    }

    /// The pair that will follow the current one.
    #[must_use]
    pub fn next_pair(&self) -> Piece {
        self.pair_buffer.peek_next()
    }

    /// Commits the current pair at `landing` and resolves the resulting chain.
    ///
    /// Returns the number of chain links together with the outcome. On
    /// [`CompletePlacementError::OccupiedLanding`] the board is unchanged; on
    /// [`CompletePlacementError::GameOver`] the placement and chain were applied but the next
    /// pair has nowhere to spawn.
    pub fn complete_placement(
        &mut self,
        landing: &Landing,
    ) -> (usize, Result<(), CompletePlacementError>) {
        if let Some(position) = landing.blocked_cell(&self.board) {
            return (0, Err(CompletePlacementError::OccupiedLanding { position }));
        }

        landing.place_on(&mut self.board, &self.current_pair.landed());
        let chains = self.board.resolve_chain();

        self.current_pair = self.pair_buffer.pop_next();
        if self.board.is_top_row_blocked() {
            return (chains, Err(CompletePlacementError::GameOver));
        }

        (chains, Ok(()))
    }
}
