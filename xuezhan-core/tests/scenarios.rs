//! Round scenarios played through the public API.
//!
//! Each test drives PlayerState through deal, void declaration, claims and
//! kongs, then checks analyzer output and the settlement ledger.

use xuezhan_core::{evaluate_table, suggest_discard, VisibleTiles};
use xuezhan_engine::parser::{parse_hand, parse_tile, parse_tiles};
use xuezhan_engine::player::kong_charges;
use xuezhan_engine::settlement::TransferReason;
use xuezhan_engine::types::NUM_PLAYERS;
use xuezhan_engine::{settle, GameRule, MeldKind, PlayerState, Suit, Tile};

fn tile(s: &str) -> Tile {
    parse_tile(s).unwrap()
}

fn dealt(seat: u8, text: &str, void: Suit) -> PlayerState {
    let mut p = PlayerState::deal(seat, &parse_tiles(text).unwrap()).unwrap();
    p.declare_void(void).unwrap();
    p
}

/// Seat 0 wins, seat 1 waits behind a concealed kong, seat 2 ends as a
/// flowery pig and seat 3 is stuck with an exposed kong it cannot keep.
fn finished_round(rule: &GameRule) -> ([PlayerState; NUM_PLAYERS], VisibleTiles) {
    let mut visible = VisibleTiles::new();

    let mut winner = dealt(0, "112233m456789p5p", Suit::Souzu);
    winner.draw(tile("5p")).unwrap();
    winner.declare_win().unwrap();

    let mut kong = dealt(1, "1111s123p456789s", Suit::Manzu);
    kong.draw(tile("9m")).unwrap();
    kong.concealed_kong(tile("1s")).unwrap();
    visible.on_meld(&kong.melds[0]);
    let charges = kong_charges(MeldKind::ConcealedKong, tile("1s"), 1, None, &[true; NUM_PLAYERS], rule).unwrap();
    kong.record_kong_income(charges);
    kong.draw(tile("1p")).unwrap();
    let forced = suggest_discard(&kong).unwrap();
    assert_eq!(forced, tile("9m"));
    kong.discard(forced).unwrap();
    visible.on_discard(forced);
    assert!(kong.tenpai);

    let mut pig = dealt(2, "123m456p789s1234m", Suit::Manzu);
    pig.hand.add(tile("5m")).unwrap();
    pig.discard(tile("5m")).unwrap();
    visible.on_discard(tile("5m"));

    let mut stuck = dealt(3, "4679m2378p99p555m", Suit::Souzu);
    stuck.exposed_kong(tile("5m"), 2).unwrap();
    visible.on_meld(&stuck.melds[0]);
    let charges = kong_charges(MeldKind::ExposedKong, tile("5m"), 3, Some(2), &[true; NUM_PLAYERS], rule).unwrap();
    stuck.record_kong_income(charges);

    ([winner, kong, pig, stuck], visible)
}

#[test]
fn full_round_settles_in_three_phases() {
    let rule = GameRule::default();
    let (players, _) = finished_round(&rule);
    let r = settle(&players, &rule).unwrap();

    assert_eq!(r.flowery_pig, [false, false, true, false]);
    assert_eq!(r.tenpai, [false, true, false, false]);
    // 11p + 23p or 1p tanki over 456789s: self-drawn x2, the 1s root x2.
    assert_eq!(r.best_multiplier[1], Some(4));

    let reasons: Vec<TransferReason> = r.transfers.iter().map(|t| t.reason).collect();
    let first_refund = reasons.iter().position(|&x| x == TransferReason::KongRefund).unwrap();
    let first_call = reasons.iter().position(|&x| x == TransferReason::BigCall).unwrap();
    assert!(reasons[..first_refund].iter().all(|&x| x == TransferReason::FloweryPig));
    assert!(first_refund < first_call);

    // Pig 3 x 16, stuck refunds 2 to the pig, pig and stuck pay 4 each.
    assert_eq!(r.deltas, [16, 24, -50, 10]);
    assert_eq!(r.deltas.iter().sum::<i64>(), 0);
    assert_eq!(r.refunded().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn base_point_scales_every_payment() {
    let rule = GameRule {
        base_point: 10,
        ..GameRule::default()
    };
    let (players, _) = finished_round(&rule);
    let r = settle(&players, &rule).unwrap();
    assert_eq!(r.deltas, [160, 240, -500, 100]);
}

#[test]
fn capped_rule_from_json() {
    let json = GameRule {
        multiplier_cap: Some(2),
        flowery_pig_pays_big_call: false,
        ..GameRule::default()
    }
    .to_json()
    .unwrap();
    let rule = GameRule::from_json(&json).unwrap();
    let (players, _) = finished_round(&rule);
    let r = settle(&players, &rule).unwrap();
    assert_eq!(r.best_multiplier[1], Some(2));
    // Only seat 3 pays the big call now.
    let calls: Vec<u8> = r
        .transfers
        .iter()
        .filter(|t| t.reason == TransferReason::BigCall)
        .map(|t| t.from)
        .collect();
    assert_eq!(calls, vec![3]);
}

#[test]
fn settlement_flags_write_back() {
    let rule = GameRule::default();
    let (mut players, _) = finished_round(&rule);
    let r = settle(&players, &rule).unwrap();
    r.apply_flags(&mut players);
    assert!(players[2].flowery_pig);
    assert!(players[1].tenpai);
    assert!(players[3].kong_income.is_empty());
    assert_eq!(players[1].kong_income_total(), 3 * rule.concealed_kong_charge);
}

#[test]
fn table_outlook_and_visible_copies() {
    let (players, visible) = finished_round(&GameRule::default());
    let out = evaluate_table(&players).unwrap();
    assert!(out[0].won);
    assert!(out[1].tenpai);
    assert_eq!(out[1].waits, parse_tiles("14p").unwrap());
    assert!(!out[3].tenpai);

    // Discarded 5m then all four copies shown in the exposed kong.
    assert_eq!(visible.count(tile("5m")), 4);
    assert_eq!(visible.count(tile("1s")), 0);
    assert_eq!(visible.unseen(tile("1p"), &players[1]), 2);
    assert_eq!(visible.unseen(tile("9m"), &players[1]), 3);
}

#[test]
fn void_clearance_follows_suggestions() {
    let mut p = dealt(0, "112233m456s5678p", Suit::Souzu);
    for (drawn, expected) in [("5p", "4s"), ("7p", "5s"), ("8p", "6s")] {
        p.draw(tile(drawn)).unwrap();
        let pick = suggest_discard(&p).unwrap();
        assert_eq!(pick, tile(expected));
        p.discard(pick).unwrap();
    }
    assert!(p.tenpai);
    assert_eq!(p.hand, parse_hand("112233m5567788p").unwrap().0);
}
