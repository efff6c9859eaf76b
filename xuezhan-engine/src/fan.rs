//! Base-pattern table.
//!
//! Entries are ordered by descending multiplier and the first entry whose
//! predicate accepts the hand is the only base pattern. Exclusions between
//! patterns ("pure seven pairs does not also count as pure suit") follow from
//! that order alone.

use serde::{Deserialize, Serialize};

use crate::agari::{find_divisions, is_seven_pairs, Division, Group};
use crate::tile::{NUM_COPIES, NUM_TILE_TYPES};
use crate::types::{combined_counts, combined_suits, Hand, Meld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FanKind {
    PureDragonSevenPairs,
    PureSevenPairs,
    DragonSevenPairs,
    PureAllTriplets,
    AllTwoFiveEight,
    PureSuit,
    SevenPairs,
    OutsideHand,
    AllTriplets,
    Basic,
}

/// A completed hand, pre-digested for the pattern predicates.
#[derive(Debug, Clone)]
pub struct WinShape<'a> {
    pub hand: &'a Hand,
    pub melds: &'a [Meld],
    /// Hand plus meld tiles.
    pub combined: [u8; NUM_TILE_TYPES],
    pub suit_count: u32,
    pub seven_pairs: bool,
    /// Standard readings of the concealed part.
    pub divisions: Vec<Division>,
}

impl<'a> WinShape<'a> {
    pub fn new(hand: &'a Hand, melds: &'a [Meld]) -> Self {
        Self {
            hand,
            melds,
            combined: combined_counts(hand, melds),
            suit_count: combined_suits(hand, melds).count_ones(),
            seven_pairs: is_seven_pairs(hand, melds),
            divisions: find_divisions(hand),
        }
    }

    pub fn is_pure(&self) -> bool {
        self.suit_count == 1
    }

    /// Kinds held four times across hand and melds.
    pub fn quads(&self) -> u8 {
        self.combined.iter().filter(|&&c| c == NUM_COPIES).count() as u8
    }

    /// Some standard reading uses triplets only.
    pub fn all_triplets(&self) -> bool {
        self.divisions
            .iter()
            .any(|d| d.groups.iter().all(|g| matches!(g, Group::Triplet(_))))
    }

    fn every_tile(&self, pred: impl Fn(usize) -> bool) -> bool {
        self.combined
            .iter()
            .enumerate()
            .all(|(i, &c)| c == 0 || pred(i))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FanPattern {
    pub kind: FanKind,
    pub name: &'static str,
    pub multiplier: u32,
    /// Roots the pattern already requires; they are not counted again as
    /// x2 factors.
    pub embedded_roots: u8,
    pub matches: fn(&WinShape) -> bool,
}

fn pure_dragon_seven_pairs(s: &WinShape) -> bool {
    s.seven_pairs && s.is_pure() && s.quads() > 0
}

fn pure_seven_pairs(s: &WinShape) -> bool {
    s.seven_pairs && s.is_pure()
}

fn dragon_seven_pairs(s: &WinShape) -> bool {
    s.seven_pairs && s.quads() > 0
}

fn pure_all_triplets(s: &WinShape) -> bool {
    s.is_pure() && s.all_triplets()
}

fn all_two_five_eight(s: &WinShape) -> bool {
    s.all_triplets() && s.every_tile(|i| matches!(i % 9, 1 | 4 | 7))
}

fn pure_suit(s: &WinShape) -> bool {
    s.is_pure()
}

fn seven_pairs(s: &WinShape) -> bool {
    s.seven_pairs
}

fn outside_hand(s: &WinShape) -> bool {
    s.melds.iter().all(|m| m.tile.is_terminal())
        && s.divisions
            .iter()
            .any(|d| d.pair.is_terminal() && d.groups.iter().all(Group::has_terminal))
}

fn all_triplets(s: &WinShape) -> bool {
    s.all_triplets()
}

fn basic(_: &WinShape) -> bool {
    true
}

/// The blood-war pattern table, highest priority first. `Basic` is the
/// catch-all and must stay last.
pub static FAN_TABLE: &[FanPattern] = &[
    FanPattern {
        kind: FanKind::PureDragonSevenPairs,
        name: "pure dragon seven pairs",
        multiplier: 32,
        embedded_roots: 1,
        matches: pure_dragon_seven_pairs,
    },
    FanPattern {
        kind: FanKind::PureSevenPairs,
        name: "pure seven pairs",
        multiplier: 16,
        embedded_roots: 0,
        matches: pure_seven_pairs,
    },
    FanPattern {
        kind: FanKind::DragonSevenPairs,
        name: "dragon seven pairs",
        multiplier: 8,
        embedded_roots: 1,
        matches: dragon_seven_pairs,
    },
    FanPattern {
        kind: FanKind::PureAllTriplets,
        name: "pure all triplets",
        multiplier: 8,
        embedded_roots: 0,
        matches: pure_all_triplets,
    },
    FanPattern {
        kind: FanKind::AllTwoFiveEight,
        name: "all 2-5-8 triplets",
        multiplier: 8,
        embedded_roots: 0,
        matches: all_two_five_eight,
    },
    FanPattern {
        kind: FanKind::PureSuit,
        name: "pure suit",
        multiplier: 4,
        embedded_roots: 0,
        matches: pure_suit,
    },
    FanPattern {
        kind: FanKind::SevenPairs,
        name: "seven pairs",
        multiplier: 4,
        embedded_roots: 0,
        matches: seven_pairs,
    },
    FanPattern {
        kind: FanKind::OutsideHand,
        name: "terminals in every set",
        multiplier: 4,
        embedded_roots: 0,
        matches: outside_hand,
    },
    FanPattern {
        kind: FanKind::AllTriplets,
        name: "all triplets",
        multiplier: 2,
        embedded_roots: 0,
        matches: all_triplets,
    },
    FanPattern {
        kind: FanKind::Basic,
        name: "basic hand",
        multiplier: 1,
        embedded_roots: 0,
        matches: basic,
    },
];

/// First entry of `table` accepting `shape`.
pub fn match_pattern<'t>(table: &'t [FanPattern], shape: &WinShape) -> Option<&'t FanPattern> {
    table.iter().find(|p| (p.matches)(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_hand;

    fn kind_of(text: &str) -> FanKind {
        let (hand, melds) = parse_hand(text).unwrap();
        let shape = WinShape::new(&hand, &melds);
        match_pattern(FAN_TABLE, &shape).unwrap().kind
    }

    #[test]
    fn table_is_ordered_with_catch_all_last() {
        assert!(FAN_TABLE.windows(2).all(|w| w[0].multiplier >= w[1].multiplier));
        assert_eq!(FAN_TABLE.last().map(|p| p.kind), Some(FanKind::Basic));
    }

    #[test]
    fn seven_pairs_family() {
        assert_eq!(kind_of("11223344556677m"), FanKind::PureSevenPairs);
        assert_eq!(kind_of("11112233445566m"), FanKind::PureDragonSevenPairs);
        assert_eq!(kind_of("1111m223344p5566p"), FanKind::DragonSevenPairs);
        assert_eq!(kind_of("113355m224466p99p"), FanKind::SevenPairs);
    }

    #[test]
    fn triplet_family() {
        assert_eq!(kind_of("111333555777m99m"), FanKind::PureAllTriplets);
        assert_eq!(kind_of("222555m888p55p (p2p)"), FanKind::AllTwoFiveEight);
        assert_eq!(kind_of("111333m555777p99p"), FanKind::AllTriplets);
    }

    #[test]
    fn suit_and_terminal_patterns() {
        assert_eq!(kind_of("123456789m11m789m"), FanKind::PureSuit);
        assert_eq!(kind_of("123m789m11p123p (p9m)"), FanKind::OutsideHand);
        assert_eq!(kind_of("112233m456789p55p"), FanKind::Basic);
    }
}
