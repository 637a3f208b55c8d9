pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum CompletePlacementError {
    #[display("landing cell {position} is already occupied")]
    OccupiedLanding { position: Position },
    #[display("spawn cell blocked after placement")]
    GameOver,
}
