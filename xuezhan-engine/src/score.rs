//! Multiplier calculator.
//!
//! `multiplier = base x 2^modifiers x 2^roots`, where the base comes from the
//! first matching `FAN_TABLE` entry, each modifier is a context flag, and
//! roots are kinds held four times across hand and melds less the roots the
//! matched pattern already embeds.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::agari::{is_winning_hand, GROUPS_PER_HAND};
use crate::errors::{MahjongError, MahjongResult};
use crate::fan::{match_pattern, FanKind, FanPattern, WinShape, FAN_TABLE};
use crate::rule::GameRule;
use crate::shanten::ShantenCalculator;
use crate::tile::{Suit, Tile};
use crate::types::{Hand, Meld, ScoringContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    SelfDrawn,
    RobbedKong,
    LastTile,
    AfterKong,
    Heavenly,
    Earthly,
    BarePair,
}

impl Modifier {
    /// Evaluation order.
    pub const ALL: [Modifier; 7] = [
        Modifier::SelfDrawn,
        Modifier::RobbedKong,
        Modifier::LastTile,
        Modifier::AfterKong,
        Modifier::Heavenly,
        Modifier::Earthly,
        Modifier::BarePair,
    ];

    pub fn applies(self, ctx: &ScoringContext) -> bool {
        match self {
            Modifier::SelfDrawn => ctx.self_drawn,
            Modifier::RobbedKong => ctx.robbed_kong,
            Modifier::LastTile => ctx.last_tile,
            Modifier::AfterKong => ctx.after_kong,
            Modifier::Heavenly => ctx.heavenly,
            Modifier::Earthly => ctx.earthly,
            Modifier::BarePair => ctx.bare_pair,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::SelfDrawn => "self drawn",
            Modifier::RobbedKong => "robbing the kong",
            Modifier::LastTile => "last tile",
            Modifier::AfterKong => "win after kong",
            Modifier::Heavenly => "heavenly hand",
            Modifier::Earthly => "earthly hand",
            Modifier::BarePair => "bare pair",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub multiplier: u32,
    pub pattern: FanKind,
    pub pattern_name: String,
    /// Base multiplier of the matched pattern.
    pub base: u32,
    pub modifiers: Vec<Modifier>,
    /// Roots counted as x2 factors.
    pub roots: u8,
}

fn doubled(base: u32, times: u32) -> u32 {
    (0..times).fold(base, |m, _| m.saturating_mul(2))
}

/// Scores a completed hand against `FAN_TABLE`.
///
/// `hand` is the concealed part including `winning_tile`.
pub fn score(
    hand: &Hand,
    melds: &[Meld],
    winning_tile: Tile,
    ctx: &ScoringContext,
) -> MahjongResult<ScoreResult> {
    score_with_table(FAN_TABLE, hand, melds, winning_tile, ctx)
}

pub fn score_with_table(
    table: &[FanPattern],
    hand: &Hand,
    melds: &[Meld],
    winning_tile: Tile,
    ctx: &ScoringContext,
) -> MahjongResult<ScoreResult> {
    let expected = GROUPS_PER_HAND
        .checked_sub(melds.len())
        .map(|m| 3 * m + 2)
        .ok_or_else(|| MahjongError::invalid_state(format!("{} melds declared", melds.len())))?;
    if hand.len() != expected {
        return Err(MahjongError::InvalidHandSize {
            expected: expected.to_string(),
            actual: hand.len(),
        });
    }
    if hand.count(winning_tile) == 0 || !is_winning_hand(hand, melds) {
        return Err(MahjongError::IncompleteHand);
    }

    let shape = WinShape::new(hand, melds);
    let pattern = match_pattern(table, &shape).ok_or(MahjongError::NoPatternMatched)?;

    let modifiers: Vec<Modifier> = Modifier::ALL
        .into_iter()
        .filter(|m| m.applies(ctx))
        .collect();
    let roots = shape.quads().saturating_sub(pattern.embedded_roots);
    let multiplier = doubled(pattern.multiplier, modifiers.len() as u32 + roots as u32);

    debug!(
        "score: {} on {} -> {} (base {}, {} modifiers, {} roots)",
        pattern.name,
        winning_tile,
        multiplier,
        pattern.multiplier,
        modifiers.len(),
        roots
    );

    Ok(ScoreResult {
        multiplier,
        pattern: pattern.kind,
        pattern_name: pattern.name.to_string(),
        base: pattern.multiplier,
        modifiers,
        roots,
    })
}

/// `score` with the rule's multiplier cap applied.
pub fn score_with_rule(
    hand: &Hand,
    melds: &[Meld],
    winning_tile: Tile,
    ctx: &ScoringContext,
    rule: &GameRule,
) -> MahjongResult<ScoreResult> {
    let mut result = score(hand, melds, winning_tile, ctx)?;
    result.multiplier = rule.cap(result.multiplier);
    Ok(result)
}

/// Highest self-drawn score over every winning tile of a waiting hand, or
/// `None` when nothing completes it.
pub fn best_self_drawn(
    hand: &Hand,
    melds: &[Meld],
    void: Option<Suit>,
) -> MahjongResult<Option<(Tile, ScoreResult)>> {
    let mut calc = ShantenCalculator::new();
    let mut best: Option<(Tile, ScoreResult)> = None;
    for tile in calc.winning_tiles(hand, melds, void)? {
        let Some(full) = hand.with(tile) else { continue };
        let ctx = ScoringContext {
            self_drawn: true,
            ..ScoringContext::for_hand(&full, melds)
        };
        let result = score(&full, melds, tile, &ctx)?;
        if best.as_ref().map_or(true, |(_, b)| result.multiplier > b.multiplier) {
            best = Some((tile, result));
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_hand, parse_tile};

    fn score_text(text: &str, win: &str, ctx: ScoringContext) -> MahjongResult<ScoreResult> {
        let (hand, melds) = parse_hand(text).unwrap();
        score(&hand, &melds, parse_tile(win).unwrap(), &ctx)
    }

    #[test]
    fn basic_self_drawn_is_two() {
        let r = score_text("112233m456789p55p", "9p", ScoringContext::self_drawn()).unwrap();
        assert_eq!(r.pattern, FanKind::Basic);
        assert_eq!(r.multiplier, 2);
        assert_eq!(r.modifiers, vec![Modifier::SelfDrawn]);
    }

    #[test]
    fn roots_double_and_dragon_pairs_embed_one() {
        // Concealed quad inside a standard hand: one root.
        let r = score_text("111123m456p789p55p", "5p", ScoringContext::default()).unwrap();
        assert_eq!(r.pattern, FanKind::Basic);
        assert_eq!(r.roots, 1);
        assert_eq!(r.multiplier, 2);

        let r = score_text("11112233445566m", "6m", ScoringContext::default()).unwrap();
        assert_eq!(r.pattern, FanKind::PureDragonSevenPairs);
        assert_eq!(r.roots, 0);
        assert_eq!(r.multiplier, 32);

        let r = score_text("11m (a2m) (p3m) (p5p) (p7p)", "1m", ScoringContext::default()).unwrap();
        assert_eq!(r.roots, 1);
        assert_eq!(r.multiplier, 2 * 2);
        assert_eq!(r.pattern, FanKind::AllTriplets);
    }

    #[test]
    fn modifiers_stack() {
        let ctx = ScoringContext {
            self_drawn: true,
            after_kong: true,
            last_tile: true,
            ..ScoringContext::default()
        };
        let r = score_text("112233m456789p55p", "9p", ctx).unwrap();
        assert_eq!(r.multiplier, 8);
        assert_eq!(
            r.modifiers,
            vec![Modifier::SelfDrawn, Modifier::LastTile, Modifier::AfterKong]
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            score_text("112233m456789p5p6p", "6p", ScoringContext::default()),
            Err(MahjongError::IncompleteHand)
        );
        assert_eq!(
            score_text("112233m456789p55p", "1s", ScoringContext::default()),
            Err(MahjongError::IncompleteHand)
        );
        assert!(matches!(
            score_text("112233m456789p5p", "5p", ScoringContext::default()),
            Err(MahjongError::InvalidHandSize { .. })
        ));
        let (hand, melds) = parse_hand("112233m456789p55p").unwrap();
        assert_eq!(
            score_with_table(&[], &hand, &melds, parse_tile("9p").unwrap(), &ScoringContext::default()),
            Err(MahjongError::NoPatternMatched)
        );
    }

    #[test]
    fn cap_applies() {
        let ctx = ScoringContext {
            self_drawn: true,
            heavenly: true,
            ..ScoringContext::default()
        };
        let (hand, melds) = parse_hand("11112233445566m").unwrap();
        let tile = parse_tile("6m").unwrap();
        assert_eq!(score(&hand, &melds, tile, &ctx).unwrap().multiplier, 128);
        let capped = score_with_rule(&hand, &melds, tile, &ctx, &GameRule::default_capped()).unwrap();
        assert_eq!(capped.multiplier, 64);
    }

    #[test]
    fn best_self_drawn_picks_highest() {
        // Nine gates: every completion is at least a self-drawn pure suit.
        let (hand, melds) = parse_hand("1112345678999m").unwrap();
        let (_, best) = best_self_drawn(&hand, &melds, Some(Suit::Souzu)).unwrap().unwrap();
        assert!(best.multiplier >= 8);
        let (hand, melds) = parse_hand("1234m5678p9s1357s").unwrap();
        assert!(best_self_drawn(&hand, &melds, None).unwrap().is_none());
    }
}
