//! Live game state built on the core data structures.
//!
//! - [`GameField`] - Board, current pair and upcoming pairs for a single game
//! - [`PairBuffer`] - Seeded pair generation with the two-hand color constraint
//! - [`PairSeed`] - Seed for deterministic pair generation
//!
//! # Game Flow
//!
//! 1. Initialize [`GameField`] with a random or fixed seed
//! 2. Choose a placement for the current pair (for instance with an advisor)
//! 3. Commit it with [`GameField::complete_placement`]; chains resolve on the whole board
//! 4. Repeat until the spawn cell is blocked
//!
//! # Example
//!
//! ```
//! use gtrcoach_engine::{GameField, Placement, PieceRotation};
//!
//! let mut field = GameField::new();
//! let landing = Placement::new(0, PieceRotation::RIGHT)
//!     .landing(field.board())
//!     .unwrap();
//! let (chains, result) = field.complete_placement(&landing);
//! assert_eq!(chains, 0);
//! assert!(result.is_ok());
//! ```

pub use self::{game_field::*, pair_buffer::*};

mod game_field;
mod pair_buffer;
