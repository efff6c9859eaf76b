//! Property-based invariant tests for the rules core.
//!
//! Hands are drawn from the 108-tile wall without replacement, so every
//! generated hand respects the four-copy limit.

use proptest::prelude::*;
use proptest::sample::subsequence;
use xuezhan_core::analyzer::analyze_discards;
use xuezhan_engine::agari::is_winning_hand;
use xuezhan_engine::rule::GameRule;
use xuezhan_engine::score::score;
use xuezhan_engine::settlement::{settle, TransferReason};
use xuezhan_engine::shanten::{shanten, winning_tiles, COMPLETE};
use xuezhan_engine::tile::{NUM_COPIES, NUM_TILE_TYPES};
use xuezhan_engine::types::{ScoringContext, NUM_PLAYERS};
use xuezhan_engine::{Hand, PlayerState, Suit, Tile};

/// Physical tile ids 0..108; kind = id / 4.
fn wall(suits: &[Suit]) -> Vec<u8> {
    suits
        .iter()
        .flat_map(|s| {
            let start = (s.start() * NUM_COPIES as usize) as u8;
            start..start + 36
        })
        .collect()
}

fn to_hand(ids: &[u8]) -> Hand {
    let tiles: Vec<Tile> = ids
        .iter()
        .map(|&id| Tile::new(id / NUM_COPIES).unwrap())
        .collect();
    Hand::from_tiles(&tiles).unwrap()
}

fn any_hand(len: usize) -> impl Strategy<Value = Hand> {
    subsequence(wall(&Suit::ALL), len).prop_map(|ids| to_hand(&ids))
}

/// Manzu and pinzu only.
fn two_suit_hand(len: usize) -> impl Strategy<Value = Hand> {
    subsequence(wall(&[Suit::Manzu, Suit::Pinzu]), len).prop_map(|ids| to_hand(&ids))
}

/// Pair plus four groups over manzu and pinzu.
fn winning_hand() -> impl Strategy<Value = Hand> {
    (
        any::<bool>(),
        1usize..=9,
        prop::collection::vec((any::<bool>(), any::<bool>(), 1usize..=9), 4),
    )
        .prop_filter_map("more than four copies", |(pair_in_p, pair_rank, groups)| {
            let base = |in_p: bool| if in_p { 9 } else { 0 };
            let mut counts = [0u8; NUM_TILE_TYPES];
            counts[base(pair_in_p) + pair_rank - 1] += 2;
            for (sequence, in_p, rank) in groups {
                if sequence {
                    let start = base(in_p) + rank.min(7) - 1;
                    for k in 0..3 {
                        counts[start + k] += 1;
                    }
                } else {
                    counts[base(in_p) + rank - 1] += 3;
                }
            }
            Hand::from_counts(counts).ok()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn three_suit_hands_never_win(hand in any_hand(14)) {
        if hand.suits().count_ones() == 3 {
            prop_assert!(!is_winning_hand(&hand, &[]));
        }
    }

    #[test]
    fn generated_wins_are_wins(hand in winning_hand()) {
        prop_assert!(is_winning_hand(&hand, &[]));
        prop_assert_eq!(shanten(&hand, &[], None).unwrap(), COMPLETE);
    }

    #[test]
    fn removing_any_tile_breaks_a_win(hand in winning_hand()) {
        for t in hand.kinds() {
            let less = hand.without(t).unwrap();
            prop_assert!(!is_winning_hand(&less, &[]), "still wins without {}", t);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn waits_are_exactly_the_completing_kinds(hand in two_suit_hand(13)) {
        let waits = winning_tiles(&hand, &[], None).unwrap();
        let expected: Vec<Tile> = Tile::all()
            .filter(|&t| hand.count(t) < NUM_COPIES)
            .filter(|&t| hand.with(t).is_some_and(|full| is_winning_hand(&full, &[])))
            .collect();
        prop_assert_eq!(&waits, &expected);

        for &w in &waits {
            let full = hand.with(w).unwrap();
            prop_assert_eq!(shanten(&full, &[], None).unwrap(), COMPLETE);
        }
    }

    #[test]
    fn ready_means_a_real_wait_exists(hand in two_suit_hand(13)) {
        let sh = shanten(&hand, &[], None).unwrap();
        prop_assert!((0..=6).contains(&sh), "shanten {} out of range", sh);
        let waits = winning_tiles(&hand, &[], None).unwrap();
        prop_assert_eq!(sh == 0, !waits.is_empty());
    }

    #[test]
    fn one_draw_improves_by_at_most_one(hand in any_hand(13)) {
        let void = Some(Suit::Souzu);
        let before = shanten(&hand, &[], void).unwrap();
        for t in Tile::all() {
            if let Some(drawn) = hand.with(t) {
                let after = shanten(&drawn, &[], void).unwrap();
                prop_assert!(after >= before - 1, "drew {}: {} -> {}", t, before, after);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn multiplier_is_base_times_doublings(
        hand in winning_hand(),
        flags in prop::collection::vec(any::<bool>(), 7),
    ) {
        let ctx = ScoringContext {
            self_drawn: flags[0],
            robbed_kong: flags[1],
            last_tile: flags[2],
            after_kong: flags[3],
            heavenly: flags[4],
            earthly: flags[5],
            bare_pair: flags[6],
            ..ScoringContext::default()
        };
        let win = hand.kinds().next().unwrap();
        let first = score(&hand, &[], win, &ctx).unwrap();
        let again = score(&hand, &[], win, &ctx).unwrap();
        prop_assert_eq!(&first, &again);

        let set = flags.iter().filter(|&&f| f).count();
        prop_assert_eq!(first.modifiers.len(), set);
        prop_assert_eq!(
            first.multiplier,
            first.base << (set as u32 + first.roots as u32)
        );
    }

    #[test]
    fn suggestion_has_minimal_shanten(hand in two_suit_hand(14)) {
        let state = PlayerState {
            hand,
            void_suit: Some(Suit::Souzu),
            ..PlayerState::new(0)
        };
        let all = analyze_discards(&state, None).unwrap();
        prop_assert!(!all.is_empty());
        prop_assert!(all.iter().all(|c| !c.forced));
        prop_assert!(state.hand.count(all[0].tile) > 0);
        prop_assert!(all.iter().all(|c| c.shanten >= all[0].shanten));
    }

    #[test]
    fn settlement_is_zero_sum(
        ids in subsequence(wall(&Suit::ALL), 13 * NUM_PLAYERS).prop_shuffle(),
        voids in prop::collection::vec(0usize..3, NUM_PLAYERS),
        won in prop::collection::vec(any::<bool>(), NUM_PLAYERS),
    ) {
        let players: [PlayerState; NUM_PLAYERS] = std::array::from_fn(|i| PlayerState {
            hand: to_hand(&ids[i * 13..(i + 1) * 13]),
            void_suit: Some(Suit::ALL[voids[i]]),
            won: won[i],
            ..PlayerState::new(i as u8)
        });
        let rule = GameRule::default();
        let r = settle(&players, &rule).unwrap();
        prop_assert_eq!(r.deltas.iter().sum::<i64>(), 0);

        let pigs = r.flowery_pig.iter().filter(|&&p| p).count() as i64;
        let penalty = rule.flowery_pig_penalty * rule.base_point;
        for (i, p) in players.iter().enumerate() {
            prop_assert_eq!(r.flowery_pig[i], !p.won && p.hand.suits().count_ones() > 2);
            prop_assert!(!(r.tenpai[i] && r.flowery_pig[i]));

            let paid: i64 = r
                .transfers
                .iter()
                .filter(|t| t.reason == TransferReason::FloweryPig && t.from as usize == i)
                .map(|t| t.amount)
                .sum();
            let expected = if r.flowery_pig[i] { penalty * (NUM_PLAYERS as i64 - pigs) } else { 0 };
            prop_assert_eq!(paid, expected);
        }
    }
}
