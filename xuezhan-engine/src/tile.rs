//! Tile representation for the three-suit blood-war set.
//!
//! 27 kinds (3 numeral suits x ranks 1-9), four physical copies each,
//! no honors. Kinds are indexed `suit * 9 + rank - 1` so that every
//! frequency vector in the crate is a plain `[u8; 27]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{MahjongError, MahjongResult};

/// Total number of distinct tile kinds.
pub const NUM_TILE_TYPES: usize = 27;

/// Ranks per suit.
pub const NUM_SUIT_TILES: usize = 9;

/// Physical copies of each kind.
pub const NUM_COPIES: u8 = 4;

/// Physical tiles in the set.
pub const NUM_TILES: usize = NUM_TILE_TYPES * NUM_COPIES as usize;

/// The three numeral suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "m")]
    Manzu = 0,
    #[serde(rename = "p")]
    Pinzu = 1,
    #[serde(rename = "s")]
    Souzu = 2,
}

impl Suit {
    pub const ALL: [Suit; 3] = [Suit::Manzu, Suit::Pinzu, Suit::Souzu];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// First kind index of this suit.
    #[inline]
    pub const fn start(self) -> usize {
        self.index() * NUM_SUIT_TILES
    }

    /// Bit used in suit masks (`Hand::suits`).
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    #[inline]
    pub const fn from_index(idx: usize) -> Option<Suit> {
        match idx {
            0 => Some(Suit::Manzu),
            1 => Some(Suit::Pinzu),
            2 => Some(Suit::Souzu),
            _ => None,
        }
    }

    pub const fn from_char(c: char) -> Option<Suit> {
        match c {
            'm' => Some(Suit::Manzu),
            'p' => Some(Suit::Pinzu),
            's' => Some(Suit::Souzu),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Suit::Manzu => 'm',
            Suit::Pinzu => 'p',
            Suit::Souzu => 's',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tile kind in the range 0-26.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(u8);

impl Tile {
    /// Creates a `Tile` if `id` is in range 0..27.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < NUM_TILE_TYPES {
            Some(Tile(id))
        } else {
            None
        }
    }

    pub fn from_parts(suit: Suit, rank: u8) -> MahjongResult<Self> {
        if !(1..=9).contains(&rank) {
            return Err(MahjongError::invalid_tile(
                format!("{}{}", rank, suit.as_char()),
                "rank must be within 1..=9",
            ));
        }
        Ok(Tile((suit.start() as u8) + rank - 1))
    }

    /// Raw kind index (0-26).
    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn suit(self) -> Suit {
        match self.0 {
            0..9 => Suit::Manzu,
            9..18 => Suit::Pinzu,
            _ => Suit::Souzu,
        }
    }

    /// 1-based rank within the suit.
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 % NUM_SUIT_TILES as u8 + 1
    }

    /// True for 1 or 9.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        let r = self.rank();
        r == 1 || r == 9
    }

    /// True for 2, 5 or 8.
    #[inline]
    pub const fn is_258(self) -> bool {
        matches!(self.rank(), 2 | 5 | 8)
    }

    /// All 27 kinds in canonical order.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..NUM_TILE_TYPES as u8).map(Tile)
    }

    /// Kinds of one suit, rank 1 first.
    pub fn of_suit(suit: Suit) -> impl Iterator<Item = Tile> {
        let start = suit.start() as u8;
        (start..start + NUM_SUIT_TILES as u8).map(Tile)
    }
}

/// Text names indexed by kind.
const TILE_NAMES: [&str; NUM_TILE_TYPES] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", "1p", "2p", "3p", "4p", "5p", "6p", "7p",
    "8p", "9p", "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s",
];

impl Tile {
    pub fn as_str(self) -> &'static str {
        TILE_NAMES[self.index()]
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile({}={})", self.0, self.as_str())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tile {
    type Err = MahjongError;

    /// Parses a single `"<rank><suit>"` token such as `"7p"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(r), Some(c), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(MahjongError::invalid_tile(s, "expected <rank><suit>, e.g. 7p"));
        };
        let rank = r
            .to_digit(10)
            .ok_or_else(|| MahjongError::invalid_tile(s, format!("invalid rank '{}'", r)))?;
        let suit = Suit::from_char(c)
            .ok_or_else(|| MahjongError::invalid_tile(s, format!("invalid suit '{}'", c)))?;
        Tile::from_parts(suit, rank as u8).map_err(|_| MahjongError::invalid_tile(s, "rank must be within 1..=9"))
    }
}

impl TryFrom<u8> for Tile {
    type Error = MahjongError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Tile::new(id).ok_or_else(|| {
            MahjongError::invalid_tile(id.to_string(), "kind index must be within 0..27")
        })
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Frequency vectors
// ---------------------------------------------------------------------------

/// Builds a 27-length frequency vector. More than four copies of a kind is
/// rejected.
pub fn tiles_to_counts(tiles: &[Tile]) -> MahjongResult<[u8; NUM_TILE_TYPES]> {
    let mut counts = [0u8; NUM_TILE_TYPES];
    for &t in tiles {
        let c = &mut counts[t.index()];
        if *c >= NUM_COPIES {
            return Err(MahjongError::invalid_tile(
                t.as_str(),
                "more than four copies of one kind",
            ));
        }
        *c += 1;
    }
    Ok(counts)
}

/// Expands a frequency vector back into tiles, canonical order.
pub fn counts_to_tiles(counts: &[u8; NUM_TILE_TYPES]) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(counts.iter().map(|&c| c as usize).sum());
    for t in Tile::all() {
        for _ in 0..counts[t.index()] {
            tiles.push(t);
        }
    }
    tiles
}
