use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::color::PuyoColor;

/// A falling pair of puyos: a primary (pivot) puyo and a secondary puyo attached to it.
///
/// The rotation selects which side of the primary the secondary sits on
/// (0 = up, 1 = right, 2 = down, 3 = left). Where the pair ends up is decided by a
/// [`Placement`](crate::Placement), not by the pair itself.
///
/// # Example
///
/// ```
/// use gtrcoach_engine::{Piece, PieceRotation, PuyoColor};
///
/// let piece: Piece = "RG#1".parse().unwrap();
/// assert_eq!(piece.primary(), PuyoColor::Red);
/// assert_eq!(piece.rotation(), PieceRotation::RIGHT);
/// assert!(piece.is_falling());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    primary: PuyoColor,
    secondary: PuyoColor,
    rotation: PieceRotation,
    falling: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceError {
    #[display("expected format 'PS' or 'PS#rotation', got '{input}'")]
    Format { input: String },
    #[display("invalid puyo color: {found}")]
    InvalidColor { found: char },
    #[display("invalid rotation: {found}")]
    InvalidRotation { found: String },
}

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Format: "PS" or "PS#rotation" (e.g., "RG", "RG#1")
        let (colors, rotation) = match s.split_once('#') {
            Some((colors, rotation)) => (colors, Some(rotation)),
            None => (s, None),
        };

        let mut chars = colors.chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParsePieceError::Format {
                input: s.to_owned(),
            });
        };
        let primary =
            PuyoColor::from_char(first).ok_or(ParsePieceError::InvalidColor { found: first })?;
        let secondary =
            PuyoColor::from_char(second).ok_or(ParsePieceError::InvalidColor { found: second })?;

        let rotation = match rotation {
            Some(r) => r
                .parse::<u8>()
                .ok()
                .and_then(PieceRotation::new)
                .ok_or_else(|| ParsePieceError::InvalidRotation {
                    found: r.to_owned(),
                })?,
            None => PieceRotation::default(),
        };

        Ok(Self::new(primary, secondary).with_rotation(rotation))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}#{}",
            self.primary.as_char(),
            self.secondary.as_char(),
            self.rotation.0
        )
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Piece {
    /// Creates a pair in spawn orientation (secondary on top), still falling.
    #[must_use]
    pub fn new(primary: PuyoColor, secondary: PuyoColor) -> Self {
        Self {
            primary,
            secondary,
            rotation: PieceRotation::default(),
            falling: true,
        }
    }

    #[must_use]
    pub fn with_rotation(self, rotation: PieceRotation) -> Self {
        Self { rotation, ..self }
    }

    #[must_use]
    pub fn primary(&self) -> PuyoColor {
        self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> PuyoColor {
        self.secondary
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Returns the pair with the falling flag cleared.
    #[must_use]
    pub fn landed(self) -> Self {
        Self {
            falling: false,
            ..self
        }
    }
}

/// Rotation state of a pair: the side of the primary puyo the secondary sits on.
///
/// - `0`: up (spawn orientation)
/// - `1`: right
/// - `2`: down
/// - `3`: left
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PieceRotation(u8);

impl TryFrom<u8> for PieceRotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("rotation must be 0-3, got {value}"))
    }
}

impl From<PieceRotation> for u8 {
    fn from(rotation: PieceRotation) -> Self {
        rotation.0
    }
}

impl PieceRotation {
    pub const UP: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const DOWN: Self = Self(2);
    pub const LEFT: Self = Self(3);

    pub const ALL: [Self; 4] = [Self::UP, Self::RIGHT, Self::DOWN, Self::LEFT];

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < 4 { Some(Self(value)) } else { None }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns whether the two puyos share a column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        self.0 % 2 == 0
    }

    /// Offset `(dx, dy)` of the secondary puyo from the primary.
    #[must_use]
    pub const fn secondary_offset(self) -> (isize, isize) {
        match self.0 {
            0 => (0, -1),
            1 => (1, 0),
            2 => (0, 1),
            _ => (-1, 0),
        }
    }
}
