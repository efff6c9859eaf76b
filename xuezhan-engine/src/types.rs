use serde::{Deserialize, Serialize};

use crate::errors::{MahjongError, MahjongResult};
use crate::tile::{counts_to_tiles, tiles_to_counts, Suit, Tile, NUM_COPIES, NUM_TILE_TYPES};

/// Seat index, 0-3.
pub type Seat = u8;

pub const NUM_PLAYERS: usize = 4;

/// Concealed tiles as a histogram of kinds (0-26).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hand {
    counts: [u8; NUM_TILE_TYPES],
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: [u8; NUM_TILE_TYPES]) -> MahjongResult<Self> {
        if let Some(i) = counts.iter().position(|&c| c > NUM_COPIES) {
            return Err(MahjongError::invalid_tile(
                Tile::new(i as u8).map(|t| t.to_string()).unwrap_or_default(),
                "more than four copies of one kind",
            ));
        }
        Ok(Self { counts })
    }

    pub fn from_tiles(tiles: &[Tile]) -> MahjongResult<Self> {
        Ok(Self {
            counts: tiles_to_counts(tiles)?,
        })
    }

    pub fn to_tiles(&self) -> Vec<Tile> {
        counts_to_tiles(&self.counts)
    }

    #[inline]
    pub fn counts(&self) -> &[u8; NUM_TILE_TYPES] {
        &self.counts
    }

    #[inline]
    pub fn count(&self, tile: Tile) -> u8 {
        self.counts[tile.index()]
    }

    /// Total concealed tiles.
    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn add(&mut self, tile: Tile) -> MahjongResult<()> {
        let c = &mut self.counts[tile.index()];
        if *c >= NUM_COPIES {
            return Err(MahjongError::invalid_state(format!(
                "cannot hold a fifth {}",
                tile
            )));
        }
        *c += 1;
        Ok(())
    }

    pub fn remove(&mut self, tile: Tile) -> MahjongResult<()> {
        let c = &mut self.counts[tile.index()];
        if *c == 0 {
            return Err(MahjongError::invalid_state(format!("{} is not in hand", tile)));
        }
        *c -= 1;
        Ok(())
    }

    /// Copy with one more `tile`, or `None` if four are already held.
    pub fn with(&self, tile: Tile) -> Option<Hand> {
        let mut h = *self;
        h.add(tile).ok().map(|_| h)
    }

    /// Copy with one `tile` removed, or `None` if none is held.
    pub fn without(&self, tile: Tile) -> Option<Hand> {
        let mut h = *self;
        h.remove(tile).ok().map(|_| h)
    }

    /// Number of tiles of one suit.
    pub fn count_suit(&self, suit: Suit) -> usize {
        self.counts[suit.start()..suit.start() + 9]
            .iter()
            .map(|&c| c as usize)
            .sum()
    }

    /// Bitmask of suits present (see `Suit::bit`).
    pub fn suits(&self) -> u8 {
        Suit::ALL
            .iter()
            .filter(|&&s| self.count_suit(s) > 0)
            .fold(0, |mask, s| mask | s.bit())
    }

    /// Distinct kinds held, canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = Tile> + '_ {
        Tile::all().filter(move |t| self.counts[t.index()] > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    Triplet,
    ExposedKong,
    ConcealedKong,
    /// A triplet later extended with the fourth tile.
    UpgradedKong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tile: Tile,
    /// Seat the claimed tile came from; `None` for concealed kongs.
    pub from: Option<Seat>,
}

impl Meld {
    pub fn new(kind: MeldKind, tile: Tile, from: Option<Seat>) -> Self {
        Self { kind, tile, from }
    }

    pub fn triplet(tile: Tile, from: Seat) -> Self {
        Self::new(MeldKind::Triplet, tile, Some(from))
    }

    pub fn exposed_kong(tile: Tile, from: Seat) -> Self {
        Self::new(MeldKind::ExposedKong, tile, Some(from))
    }

    pub fn concealed_kong(tile: Tile) -> Self {
        Self::new(MeldKind::ConcealedKong, tile, None)
    }

    pub fn is_kong(&self) -> bool {
        !matches!(self.kind, MeldKind::Triplet)
    }

    /// Physical tiles in the meld.
    pub fn len(&self) -> u8 {
        if self.is_kong() {
            4
        } else {
            3
        }
    }
}

/// Concealed tiles plus every meld tile, as one histogram.
pub fn combined_counts(hand: &Hand, melds: &[Meld]) -> [u8; NUM_TILE_TYPES] {
    let mut counts = *hand.counts();
    for m in melds {
        counts[m.tile.index()] += m.len();
    }
    counts
}

/// Suits present across hand and melds, as a bitmask.
pub fn combined_suits(hand: &Hand, melds: &[Meld]) -> u8 {
    melds.iter().fold(hand.suits(), |mask, m| mask | m.tile.suit().bit())
}

/// Total tiles across hand and melds, kongs counted as 3 (the size the
/// 13/14-tile invariants are stated in).
pub fn effective_len(hand: &Hand, melds: &[Meld]) -> usize {
    hand.len() + melds.len() * 3
}

/// How a win happened. Every flag is an independent x2 modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoringContext {
    pub self_drawn: bool,
    pub robbed_kong: bool,
    pub last_tile: bool,
    pub after_kong: bool,
    /// Dealer wins on the very first draw.
    pub heavenly: bool,
    /// Non-dealer wins on their first draw.
    pub earthly: bool,
    /// Four melds declared; the winning tile completes the lone pair.
    pub bare_pair: bool,
    pub kong_count: u8,
    pub root_count: u8,
}

impl ScoringContext {
    /// Context used when pricing a hypothetical self-drawn win.
    pub fn self_drawn() -> Self {
        Self {
            self_drawn: true,
            ..Self::default()
        }
    }

    /// Fills the descriptive counters and `bare_pair` from a completed hand.
    pub fn for_hand(hand: &Hand, melds: &[Meld]) -> Self {
        let combined = combined_counts(hand, melds);
        Self {
            bare_pair: melds.len() == 4 && hand.len() == 2,
            kong_count: melds.iter().filter(|m| m.is_kong()).count() as u8,
            root_count: combined.iter().filter(|&&c| c == NUM_COPIES).count() as u8,
            ..Self::default()
        }
    }
}
