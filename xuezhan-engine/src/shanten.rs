//! Distance-to-win and waiting tiles.
//!
//! Standard-shape shanten is computed the way the lookup-table engines do
//! it: every suit gets a small table `[u8; 10]` where entry `j` is the
//! fewest tiles that must be drawn for the suit to hold `j` groups and
//! entry `5 + j` the same plus a pair, and the suit tables are then merged.
//! Here the per-suit tables come from an exact block DP memoized on the
//! packed 9-rank vector instead of precomputed binaries.
//!
//! Void-suit tiles are dead weight: they are dropped from the count vector
//! while the target stays sized by the full hand, so each one costs at least
//! one exchange.

use ahash::AHashMap;

use crate::agari::{suit_key, WinChecker, GROUPS_PER_HAND};
use crate::errors::{MahjongError, MahjongResult};
use crate::tile::{Suit, Tile, NUM_COPIES, NUM_SUIT_TILES, NUM_TILE_TYPES};
use crate::types::{combined_counts, combined_suits, Hand, Meld};

/// Shanten of a complete hand.
pub const COMPLETE: i8 = -1;

/// Per-suit deficiency table: `[j]` = tiles missing for `j` groups,
/// `[5 + j]` = tiles missing for `j` groups plus a pair.
type SuitTable = [u8; 10];

const PAIR: usize = 5;

/// Table for a suit holding nothing: groups cost 3, the pair 2.
const EMPTY_TABLE: SuitTable = [0, 3, 6, 9, 12, 2, 5, 8, 11, 14];

/// Groups still needed in the concealed part.
fn groups_needed(melds: &[Meld]) -> MahjongResult<usize> {
    GROUPS_PER_HAND.checked_sub(melds.len()).ok_or_else(|| {
        MahjongError::invalid_state(format!("{} melds declared, at most 4 allowed", melds.len()))
    })
}

/// Validates a 3k+1 or 3k+2 concealed count against the melds.
fn check_len(hand: &Hand, melds: &[Meld], allow_full: bool) -> MahjongResult<usize> {
    let m = groups_needed(melds)?;
    let len = hand.len();
    let waiting = 3 * m + 1;
    if len == waiting || (allow_full && len == waiting + 1) {
        return Ok(m);
    }
    Err(MahjongError::InvalidHandSize {
        expected: if allow_full {
            format!("{} or {}", waiting, waiting + 1)
        } else {
            waiting.to_string()
        },
        actual: len,
    })
}

/// The suit a player must clear.
///
/// A declared void wins; otherwise, when hand and melds span all three
/// suits, the meld-free suit with the fewest concealed tiles is implied
/// (ties go to the later suit). A meld in the void suit makes the hand
/// unwinnable and is rejected.
pub fn effective_void(hand: &Hand, melds: &[Meld], declared: Option<Suit>) -> MahjongResult<Option<Suit>> {
    if let Some(v) = declared {
        if melds.iter().any(|m| m.tile.suit() == v) {
            return Err(MahjongError::invalid_state(format!(
                "meld declared in void suit {}",
                v
            )));
        }
        return Ok(Some(v));
    }
    if combined_suits(hand, melds).count_ones() < 3 {
        return Ok(None);
    }
    Suit::ALL
        .iter()
        .rev()
        .filter(|&&s| melds.iter().all(|m| m.tile.suit() != s))
        .min_by_key(|&&s| hand.count_suit(s))
        .copied()
        .map(Some)
        .ok_or_else(|| MahjongError::invalid_state("melds already span three suits"))
}

/// Concealed tiles belonging to `void`.
pub fn void_tile_count(hand: &Hand, void: Option<Suit>) -> usize {
    void.map_or(0, |v| hand.count_suit(v))
}

/// Shanten/ting calculator carrying its memo tables.
///
/// Results are pure functions of the input, so one calculator may be reused
/// for any number of hands (the analyzer evaluates every discard with one).
#[derive(Debug, Default)]
pub struct ShantenCalculator {
    tables: AHashMap<u32, SuitTable>,
    win: WinChecker,
}

impl ShantenCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn suit_table(&mut self, counts: &[u8; NUM_SUIT_TILES]) -> SuitTable {
        let key = suit_key(counts);
        if key == 0 {
            return EMPTY_TABLE;
        }
        if let Some(table) = self.tables.get(&key) {
            return *table;
        }

        let i = counts.iter().position(|&c| c > 0).unwrap_or(0);
        let rank = i + 1;
        let mut best = [u8::MAX; 10];

        let mut relax = |sub: &SuitTable, groups: usize, pair: bool, cost: u8| {
            for j in groups..=GROUPS_PER_HAND {
                let plain = sub[j - groups].saturating_add(cost);
                if pair {
                    best[PAIR + j] = best[PAIR + j].min(plain);
                } else {
                    best[j] = best[j].min(plain);
                    let with_pair = sub[PAIR + j - groups].saturating_add(cost);
                    best[PAIR + j] = best[PAIR + j].min(with_pair);
                }
            }
        };

        // Each option takes copies starting at rank i (the lowest held) and
        // charges the tiles still missing from the block they seed.
        let take = |this: &mut Self, used: &[(usize, u8)]| -> SuitTable {
            let mut rest = *counts;
            for &(at, n) in used {
                rest[at] -= n;
            }
            this.suit_table(&rest)
        };

        // Unused copy.
        let sub = take(self, &[(i, 1)]);
        relax(&sub, 0, false, 0);
        // Seeds a group or the pair on its own.
        relax(&sub, 1, false, 2);
        relax(&sub, 0, true, 1);

        if counts[i] >= 2 {
            let sub = take(self, &[(i, 2)]);
            relax(&sub, 0, true, 0);
            relax(&sub, 1, false, 1);
        }
        if counts[i] >= 3 {
            let sub = take(self, &[(i, 3)]);
            relax(&sub, 1, false, 0);
        }
        if rank <= 8 && counts[i + 1] > 0 {
            let sub = take(self, &[(i, 1), (i + 1, 1)]);
            relax(&sub, 1, false, 1);
        }
        if rank <= 7 && counts[i + 2] > 0 {
            let sub = take(self, &[(i, 1), (i + 2, 1)]);
            relax(&sub, 1, false, 1);
            if counts[i + 1] > 0 {
                let sub = take(self, &[(i, 1), (i + 1, 1), (i + 2, 1)]);
                relax(&sub, 1, false, 0);
            }
        }

        self.tables.insert(key, best);
        best
    }

    /// Standard-shape deficiency over the non-void suits.
    fn standard_missing(&mut self, counts: &[u8; NUM_TILE_TYPES], void: Option<Suit>, m: usize) -> u8 {
        let mut merged: Option<SuitTable> = None;
        for suit in Suit::ALL {
            if Some(suit) == void {
                continue;
            }
            let mut part = [0u8; NUM_SUIT_TILES];
            part.copy_from_slice(&counts[suit.start()..suit.start() + NUM_SUIT_TILES]);
            let table = self.suit_table(&part);
            merged = Some(match merged {
                None => table,
                Some(acc) => merge_tables(&acc, &table),
            });
        }
        merged.unwrap_or(EMPTY_TABLE)[PAIR + m]
    }

    /// Shanten with void tiles as dead weight. `-1` means complete.
    pub fn shanten(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<i8> {
        let m = check_len(hand, melds, true)?;
        let void = effective_void(hand, melds, void)?;
        let counts = hand.counts();

        let mut best = self.standard_missing(counts, void, m) as i8 - 1;
        if melds.is_empty() {
            best = best.min(seven_pairs_missing(counts, void) as i8 - 1);
        }

        // A wait that only a fifth copy would complete is not a wait.
        if best == 0 && hand.len() % 3 == 1 && self.winning_tiles_unchecked(hand, melds, void).is_empty() {
            best = 1;
        }
        Ok(best)
    }

    fn winning_tiles_unchecked(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> Vec<Tile> {
        let combined = combined_counts(hand, melds);
        Tile::all()
            .filter(|t| combined[t.index()] < NUM_COPIES)
            .filter(|&t| {
                hand.with(t)
                    .is_some_and(|full| self.win.can_win(&full, melds, void))
            })
            .collect()
    }

    /// Kinds that complete the hand, canonical order.
    pub fn winning_tiles(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<Vec<Tile>> {
        check_len(hand, melds, false)?;
        Ok(self.winning_tiles_unchecked(hand, melds, void))
    }

    pub fn is_ting(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> bool {
        let Ok(void) = effective_void(hand, melds, void) else {
            return false;
        };
        if void.is_some_and(|v| combined_suits(hand, melds) & v.bit() != 0) {
            return false;
        }
        self.winning_tiles(hand, melds, void)
            .is_ok_and(|waits| !waits.is_empty())
    }

    /// Kinds whose draw lowers shanten, canonical order.
    pub fn acceptance(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<Vec<Tile>> {
        check_len(hand, melds, false)?;
        let void = effective_void(hand, melds, void)?;
        let current = self.shanten(hand, melds, void)?;
        let combined = combined_counts(hand, melds);

        let mut accepted = Vec::new();
        for t in Tile::all() {
            if combined[t.index()] >= NUM_COPIES || Some(t.suit()) == void {
                continue;
            }
            let Some(drawn) = hand.with(t) else { continue };
            if self.shanten(&drawn, melds, void)? < current {
                accepted.push(t);
            }
        }
        Ok(accepted)
    }
}

fn merge_tables(a: &SuitTable, b: &SuitTable) -> SuitTable {
    let mut out = [u8::MAX; 10];
    for j in 0..=GROUPS_PER_HAND {
        for k in 0..=j {
            out[j] = out[j].min(a[k].saturating_add(b[j - k]));
            out[PAIR + j] = out[PAIR + j]
                .min(a[PAIR + k].saturating_add(b[j - k]))
                .min(a[k].saturating_add(b[PAIR + j - k]));
        }
    }
    out
}

/// Tiles missing for seven pairs; a quad supplies two pairs.
fn seven_pairs_missing(counts: &[u8; NUM_TILE_TYPES], void: Option<Suit>) -> u8 {
    let (pairs, singles) = Tile::all()
        .filter(|t| Some(t.suit()) != void)
        .map(|t| counts[t.index()])
        .fold((0u8, 0u8), |(p, s), c| (p + c / 2, s + c % 2));
    let short = 7u8.saturating_sub(pairs);
    short + short.saturating_sub(singles)
}

/// Shanten of a 3k+1 or 3k+2 hand (`-1` = complete).
pub fn shanten(hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<i8> {
    ShantenCalculator::new().shanten(hand, melds, void)
}

/// Kinds that complete a 3k+1 hand for a player with `void` declared.
pub fn winning_tiles(hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<Vec<Tile>> {
    ShantenCalculator::new().winning_tiles(hand, melds, void)
}

/// Ting: some kind completes the hand and the void suit is already clear.
pub fn is_ting(hand: &Hand, melds: &[Meld], void: Option<Suit>) -> bool {
    ShantenCalculator::new().is_ting(hand, melds, void)
}

pub fn acceptance(hand: &Hand, melds: &[Meld], void: Option<Suit>) -> MahjongResult<Vec<Tile>> {
    ShantenCalculator::new().acceptance(hand, melds, void)
}
