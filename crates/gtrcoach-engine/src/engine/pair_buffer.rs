use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Piece, PuyoColor};

/// Generates pairs two at a time under the two-hand color constraint.
///
/// # Two-Hand Constraint
///
/// Every block of two consecutive pairs uses at most three colors and follows one of these
/// shapes (A, B, C are distinct colors):
///
/// | Pattern | Pairs | Weight |
/// |---|---|---|
/// | `AAAB` | three A and one B, B in any of the four slots | 1/4 |
/// | `ABAB` | (A, B) (A, B) | 1/8 |
/// | `AABB` | (A, A) (B, B) | 1/8 |
/// | `ABAC` | (A, B) (A, C) | 1/4 |
/// | `AABC` | (A, A) (B, C) | 1/4 |
///
/// This keeps early hands realistic without the long single-color runs a uniform generator
/// would produce.
///
/// # Example
///
/// ```
/// use gtrcoach_engine::engine::PairBuffer;
///
/// let mut buffer = PairBuffer::new();
///
/// let _first = buffer.pop_next();
/// let upcoming = buffer.peek_next();
/// assert_eq!(buffer.pop_next(), upcoming);
/// ```
#[derive(Debug, Clone)]
pub struct PairBuffer {
    rng: Pcg32,
    queue: VecDeque<Piece>,
}

impl Default for PairBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic pair generation.
///
/// This is a 128-bit (16-byte) seed; the same seed always yields the same pair sequence.
/// Serialized (and parsed) as a 32-character hex string.
///
/// # Example
///
/// ```
/// use gtrcoach_engine::{PairBuffer, PairSeed};
/// use rand::Rng as _;
///
/// let seed: PairSeed = rand::rng().random();
/// let mut a = PairBuffer::with_seed(seed);
/// let mut b = PairBuffer::with_seed(seed);
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex: {reason}")]
pub struct ParseSeedError {
    reason: String,
}

impl FromStr for PairSeed {
    type Err = ParseSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParseSeedError {
                reason: format!("expected 32 characters, got {}", hex_str.len()),
            });
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| ParseSeedError {
            reason: format!("{hex_str} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl PairSeed {
    /// Generator seeded with this seed.
    ///
    /// Hosts use it to derive a reproducible sequence of per-game seeds.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for PairSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PairSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PairSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PairSeed` values with `rng.random()`.
impl Distribution<PairSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PairSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PairSeed(seed)
    }
}

/// Color shape of a block of two consecutive pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoHandPattern {
    Aaab,
    Abab,
    Aabb,
    Abac,
    Aabc,
}

impl Distribution<TwoHandPattern> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TwoHandPattern {
        match rng.random_range(0..8) {
            0 | 1 => TwoHandPattern::Aaab,
            2 => TwoHandPattern::Abab,
            3 => TwoHandPattern::Aabb,
            4 | 5 => TwoHandPattern::Abac,
            _ => TwoHandPattern::Aabc,
        }
    }
}

impl TwoHandPattern {
    /// Draws colors for the pattern and returns the two pairs' `(primary, secondary)` colors.
    fn sample_colors<R: Rng + ?Sized>(self, rng: &mut R) -> [(PuyoColor, PuyoColor); 2] {
        let a: PuyoColor = rng.random();
        let others: Vec<_> = a.others().collect();
        let b = others[rng.random_range(0..others.len())];
        let rest: Vec<_> = others.into_iter().filter(|&c| c != b).collect();
        let c = rest[rng.random_range(0..rest.len())];

        match self {
            TwoHandPattern::Aaab => {
                let mut colors = [a; 4];
                colors[rng.random_range(0..4)] = b;
                [(colors[0], colors[1]), (colors[2], colors[3])]
            }
            TwoHandPattern::Abab => [(a, b), (a, b)],
            TwoHandPattern::Aabb => [(a, a), (b, b)],
            TwoHandPattern::Abac => [(a, b), (a, c)],
            TwoHandPattern::Aabc => [(a, a), (b, c)],
        }
    }
}

impl PairBuffer {
    /// Creates a new pair buffer with a random seed.
    ///
    /// For deterministic pair generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic pair generation.
    #[must_use]
    pub fn with_seed(seed: PairSeed) -> Self {
        let mut this = Self {
            rng: seed.rng(),
            queue: VecDeque::with_capacity(4),
        };
        this.fill_queue();
        this
    }

    /// Refills so that at least one pair remains queued after the next pop.
    fn fill_queue(&mut self) {
        while self.queue.len() <= 2 {
            let pattern: TwoHandPattern = self.rng.random();
            for (primary, secondary) in pattern.sample_colors(&mut self.rng) {
                self.queue.push_back(Piece::new(primary, secondary));
            }
        }
    }

    /// Draws the next pair, spawned and falling.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (should never happen with proper refill logic).
    pub fn pop_next(&mut self) -> Piece {
        self.fill_queue();
        self.queue
            .pop_front()
            .expect("Pair queue should never be empty")
    }

    /// Returns the pair [`Self::pop_next`] would return.
    #[must_use]
    pub fn peek_next(&self) -> Piece {
        self.queue[0]
    }
}

impl Iterator for PairBuffer {
    type Item = Piece;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.pop_next())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PairSeed {
        PairSeed(bytes)
    }

    #[test]
    fn test_seed_known_value() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

        let deserialized: PairSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_parse_errors() {
        let err = "0123".parse::<PairSeed>().unwrap_err();
        assert!(err.to_string().contains("invalid hex"));
        let err = "ghijklmnopqrstuvwxyzghijklmnopqr"
            .parse::<PairSeed>()
            .unwrap_err();
        assert!(err.to_string().contains("invalid hex"));
        assert!(serde_json::from_str::<PairSeed>("\"\"").is_err());
    }

    #[test]
    fn test_deterministic_pair_generation() {
        let seed = seed_from_bytes([0x5A; 16]);
        let a: Vec<_> = PairBuffer::with_seed(seed).take(40).collect();
        let b: Vec<_> = PairBuffer::with_seed(seed).take(40).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_hand_blocks_use_at_most_three_colors() {
        let seed: PairSeed = rand::rng().random();
        let pairs: Vec<_> = PairBuffer::with_seed(seed).take(200).collect();
        for block in pairs.chunks(2) {
            let colors: HashSet<_> = block
                .iter()
                .flat_map(|p| [p.primary(), p.secondary()])
                .collect();
            assert!((2..=3).contains(&colors.len()), "{block:?}");
        }
    }

    #[test]
    fn test_peek_matches_pop() {
        let mut buffer = PairBuffer::new();
        for _ in 0..10 {
            let peeked = buffer.peek_next();
            assert_eq!(buffer.pop_next(), peeked);
        }
    }

    #[test]
    fn test_pattern_colors() {
        let mut rng = Pcg32::from_seed([7; 16]);
        let [(a1, b1), (a2, b2)] = TwoHandPattern::Aabb.sample_colors(&mut rng);
        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
        assert_ne!(a1, a2);

        let [(a1, b1), (a2, c2)] = TwoHandPattern::Abac.sample_colors(&mut rng);
        assert_eq!(a1, a2);
        assert_ne!(b1, c2);
        assert_ne!(a1, b1);
        assert_ne!(a1, c2);
    }
}
