//! Fold detection and placement advice for a 6×13 falling-pair board.
//!
//! This crate answers two questions about a board:
//!
//! 1. **Does it hold the fold?** ([`pattern_detector`]) - Matches the seven-cell two-color
//!    base under every color assignment, fires the fold with a simulated trigger
//!    ([`chain_simulator`]) and scores the result.
//!
//! 2. **Where should the current pair go?** ([`advisor`]) - Scores every placement of the
//!    current pair and ranks them, steering the board toward the fold.
//!
//! # Architecture
//!
//! ```text
//! Session Play (follow the advice on a live game field)
//!     ↓ uses
//! Placement Advice (rank every placement of the current pair)
//!     ↓ uses
//! Placement Evaluation (phase-weighted score terms, one-pair lookahead)
//!     ↓ uses
//! Score Terms / Pattern Detection (fold template, chain simulation)
//! ```
//!
//! # Supporting Modules
//!
//! - [`template`] - The fold template, its tiers and the board regions anchored to it
//! - [`phase`] - Build phase derived from the board; selects the weight row
//! - [`placement_analysis`] - Boards before and after a hypothetical placement
//! - [`score_term`] - Individual placement terms (fold progress, tail shape, connectivity,
//!   height, chain simulation)
//! - [`config`] - Every scoring constant, with defaults, loadable from JSON
//! - [`session`] - Outcome of an advised session and classification of failures
//!
//! # Determinism
//!
//! Nothing in this crate draws random numbers or mutates the boards it is given. The same
//! board and pairs always produce the same advice, in the same order.
//!
//! # Example
//!
//! ```rust
//! use gtrcoach_engine::{Board, Piece, PuyoColor};
//! use gtrcoach_evaluator::advisor::PlacementAdvisor;
//!
//! let advisor = PlacementAdvisor::default();
//! let current = Piece::new(PuyoColor::Red, PuyoColor::Red);
//! let advice = advisor.advise(&Board::new(), &current, None);
//! assert!(advice.best.is_some());
//! ```

pub mod advisor;
pub mod chain_simulator;
pub mod config;
pub mod pattern_detector;
pub mod phase;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod score_term;
pub mod session;
pub mod template;
