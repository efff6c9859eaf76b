//! Win validation and tile grouping.
//!
//! A hand wins when it spans at most two suits and either forms seven pairs
//! (concealed, quads allowed as two pairs) or splits into one pair plus
//! `4 - melds` triplets/runs. The standard check works suit by suit: once a
//! pair is fixed, every suit's 9-rank vector must break into groups on its
//! own, and that per-suit verdict is memoized on the packed vector.

use ahash::AHashMap;

use crate::tile::{Suit, Tile, NUM_SUIT_TILES};
use crate::types::{combined_suits, Hand, Meld};

/// Number of groups (triplets, runs, kongs) in a complete hand.
pub const GROUPS_PER_HAND: usize = 4;

/// Maximum suits a winning hand may use.
pub const MAX_WIN_SUITS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Triplet(Tile),
    /// Run starting at the given tile.
    Sequence(Tile),
}

impl Group {
    pub fn first(&self) -> Tile {
        match *self {
            Group::Triplet(t) | Group::Sequence(t) => t,
        }
    }

    /// True when any tile of the group is a 1 or 9.
    pub fn has_terminal(&self) -> bool {
        match *self {
            Group::Triplet(t) => t.is_terminal(),
            Group::Sequence(t) => t.rank() == 1 || t.rank() == 7,
        }
    }
}

/// One way of reading the concealed tiles as pair + groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    pub pair: Tile,
    pub groups: Vec<Group>,
}

/// Packs a suit's 9 counts into a key, 3 bits per rank.
#[inline]
pub(crate) fn suit_key(counts: &[u8]) -> u32 {
    counts
        .iter()
        .enumerate()
        .fold(0u32, |key, (i, &c)| key | ((c as u32) << (i * 3)))
}

/// Win checker carrying the per-suit decomposition memo.
///
/// The memo only stores facts about suit shapes, so one checker can be
/// reused across any number of hands; the free functions build a fresh one
/// per call.
#[derive(Debug, Default)]
pub struct WinChecker {
    memo: AHashMap<u32, bool>,
}

impl WinChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the 9-rank vector splits fully into triplets and runs.
    pub fn suit_decomposes(&mut self, counts: &[u8; NUM_SUIT_TILES]) -> bool {
        let total: u32 = counts.iter().map(|&c| c as u32).sum();
        if total == 0 {
            return true;
        }
        if total % 3 != 0 {
            return false;
        }
        let key = suit_key(counts);
        if let Some(&known) = self.memo.get(&key) {
            return known;
        }

        let mut work = *counts;
        let i = work.iter().position(|&c| c > 0).unwrap_or(NUM_SUIT_TILES);
        let mut ok = false;

        if work[i] >= 3 {
            work[i] -= 3;
            ok = self.suit_decomposes(&work);
            work[i] += 3;
        }
        if !ok && i + 2 < NUM_SUIT_TILES && work[i + 1] > 0 && work[i + 2] > 0 {
            work[i] -= 1;
            work[i + 1] -= 1;
            work[i + 2] -= 1;
            ok = self.suit_decomposes(&work);
        }

        self.memo.insert(key, ok);
        ok
    }

    /// Pair + `4 - melds` groups over the concealed tiles.
    pub fn is_standard(&mut self, hand: &Hand, melds: &[Meld]) -> bool {
        if melds.len() > GROUPS_PER_HAND {
            return false;
        }
        let needed = GROUPS_PER_HAND - melds.len();
        if hand.len() != needed * 3 + 2 {
            return false;
        }

        let counts = hand.counts();
        for pair in hand.kinds() {
            if counts[pair.index()] < 2 {
                continue;
            }
            let mut rest = *counts;
            rest[pair.index()] -= 2;
            if Suit::ALL.iter().all(|s| {
                let mut suit = [0u8; NUM_SUIT_TILES];
                suit.copy_from_slice(&rest[s.start()..s.start() + NUM_SUIT_TILES]);
                self.suit_decomposes(&suit)
            }) {
                return true;
            }
        }
        false
    }

    pub fn is_winning_hand(&mut self, hand: &Hand, melds: &[Meld]) -> bool {
        if combined_suits(hand, melds).count_ones() > MAX_WIN_SUITS {
            return false;
        }
        is_seven_pairs(hand, melds) || self.is_standard(hand, melds)
    }

    /// `is_winning_hand` plus the declared void suit fully cleared.
    pub fn can_win(&mut self, hand: &Hand, melds: &[Meld], void: Option<Suit>) -> bool {
        if let Some(v) = void {
            if combined_suits(hand, melds) & v.bit() != 0 {
                return false;
            }
        }
        self.is_winning_hand(hand, melds)
    }
}

/// Seven pairs: no melds, 14 concealed tiles, every count even (a quad is
/// two pairs).
pub fn is_seven_pairs(hand: &Hand, melds: &[Meld]) -> bool {
    melds.is_empty() && hand.len() == 14 && hand.counts().iter().all(|&c| c % 2 == 0)
}

/// Whether `hand` + `melds` is a complete, legal winning hand.
pub fn is_winning_hand(hand: &Hand, melds: &[Meld]) -> bool {
    WinChecker::new().is_winning_hand(hand, melds)
}

/// Whether the hand wins for a player who declared `void`.
pub fn can_win(hand: &Hand, melds: &[Meld], void: Option<Suit>) -> bool {
    WinChecker::new().can_win(hand, melds, void)
}

/// Every pair + groups reading of the concealed tiles.
pub fn find_divisions(hand: &Hand) -> Vec<Division> {
    let mut divisions = Vec::new();
    if hand.len() % 3 != 2 {
        return divisions;
    }
    for pair in hand.kinds() {
        if hand.count(pair) < 2 {
            continue;
        }
        let mut rest = *hand.counts();
        rest[pair.index()] -= 2;
        let mut current = Vec::new();
        let mut bodies = Vec::new();
        decompose_all(&mut rest, 0, &mut current, &mut bodies);
        divisions.extend(bodies.into_iter().map(|groups| Division { pair, groups }));
    }
    divisions
}

fn decompose_all(
    counts: &mut [u8; 27],
    start: usize,
    current: &mut Vec<Group>,
    results: &mut Vec<Vec<Group>>,
) {
    let Some(i) = (start..counts.len()).find(|&i| counts[i] > 0) else {
        results.push(current.clone());
        return;
    };
    let Some(tile) = Tile::new(i as u8) else {
        return;
    };

    if counts[i] >= 3 {
        counts[i] -= 3;
        current.push(Group::Triplet(tile));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 3;
    }

    // Runs stay inside one suit: start rank at most 7.
    if tile.rank() <= 7 && counts[i + 1] > 0 && counts[i + 2] > 0 {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        current.push(Group::Sequence(tile));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
    }
}
