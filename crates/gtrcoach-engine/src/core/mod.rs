pub use self::{board::*, color::*, connectivity::*, piece::*, placement::*};

pub(crate) mod board;
pub(crate) mod color;
pub(crate) mod connectivity;
pub(crate) mod piece;
pub(crate) mod placement;
