use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Color of a single puyo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PuyoColor {
    Red = 0,
    Green = 1,
    Blue = 2,
    Yellow = 3,
}

impl Distribution<PuyoColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PuyoColor {
        match rng.random_range(0..=3) {
            0 => PuyoColor::Red,
            1 => PuyoColor::Green,
            2 => PuyoColor::Blue,
            _ => PuyoColor::Yellow,
        }
    }
}

impl PuyoColor {
    /// Number of colors in play (4).
    pub const LEN: usize = 4;

    pub const ALL: [Self; Self::LEN] = [
        PuyoColor::Red,
        PuyoColor::Green,
        PuyoColor::Blue,
        PuyoColor::Yellow,
    ];

    /// Returns the single character representation of this color.
    ///
    /// # Examples
    ///
    /// ```
    /// use gtrcoach_engine::PuyoColor;
    ///
    /// assert_eq!(PuyoColor::Red.as_char(), 'R');
    /// assert_eq!(PuyoColor::Yellow.as_char(), 'Y');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PuyoColor::Red => 'R',
            PuyoColor::Green => 'G',
            PuyoColor::Blue => 'B',
            PuyoColor::Yellow => 'Y',
        }
    }

    /// Parses a color from a single character (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use gtrcoach_engine::PuyoColor;
    ///
    /// assert_eq!(PuyoColor::from_char('G'), Some(PuyoColor::Green));
    /// assert_eq!(PuyoColor::from_char('b'), Some(PuyoColor::Blue));
    /// assert_eq!(PuyoColor::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(PuyoColor::Red),
            'G' => Some(PuyoColor::Green),
            'B' => Some(PuyoColor::Blue),
            'Y' => Some(PuyoColor::Yellow),
            _ => None,
        }
    }

    /// Returns the colors other than `self`, in declaration order.
    pub fn others(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |&c| c != self)
    }
}
