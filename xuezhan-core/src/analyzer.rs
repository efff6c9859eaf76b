//! Discard recommendation.
//!
//! A tile of the void suit is always thrown first (lowest kind). Otherwise
//! every distinct concealed kind is tried: the remaining hand is ranked by
//! shanten, then by how many ways it waits, then by canonical kind order.
//! Waits are counted as kinds, or as live copies when a [`VisibleTiles`]
//! view is supplied.

use std::cmp::{Ordering, Reverse};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use xuezhan_engine::agari::GROUPS_PER_HAND;
use xuezhan_engine::shanten::ShantenCalculator;
use xuezhan_engine::{MahjongError, MahjongResult, PlayerState, Tile};

use crate::visible::VisibleTiles;

/// Outcome of throwing one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardCandidate {
    pub tile: Tile,
    /// Void-suit tile that has to go before anything else.
    pub forced: bool,
    /// Shanten of the hand left behind.
    pub shanten: i8,
    /// Kinds that would complete the hand left behind.
    pub waits: Vec<Tile>,
    /// Unseen copies over `waits`.
    pub live_waits: u32,
    /// Kinds whose draw would lower `shanten`.
    pub acceptance: Vec<Tile>,
}

impl DiscardCandidate {
    fn wait_score(&self, weighted: bool) -> u32 {
        if weighted {
            self.live_waits
        } else {
            self.waits.len() as u32
        }
    }
}

fn check_discard_due(state: &PlayerState) -> MahjongResult<()> {
    if state.won {
        return Err(MahjongError::invalid_state(format!(
            "seat {} has already won",
            state.seat
        )));
    }
    let groups = GROUPS_PER_HAND.checked_sub(state.melds.len()).ok_or_else(|| {
        MahjongError::invalid_state(format!("{} melds declared", state.melds.len()))
    })?;
    let expected = 3 * groups + 2;
    if state.hand.len() != expected {
        return Err(MahjongError::InvalidHandSize {
            expected: expected.to_string(),
            actual: state.hand.len(),
        });
    }
    Ok(())
}

/// Stateful analyzer reusing one shanten calculator across candidates and
/// calls.
#[derive(Debug, Default)]
pub struct HandAnalyzer {
    calc: ShantenCalculator,
}

impl HandAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn candidate(
        &mut self,
        state: &PlayerState,
        tile: Tile,
        forced: bool,
        visible: Option<&VisibleTiles>,
    ) -> MahjongResult<DiscardCandidate> {
        let remaining = state
            .hand
            .without(tile)
            .ok_or_else(|| MahjongError::invalid_state(format!("{} not in hand", tile)))?;
        let melds = &state.melds;
        let void = state.void_suit;

        let shanten = self.calc.shanten(&remaining, melds, void)?;
        let waits = self.calc.winning_tiles(&remaining, melds, void)?;
        let acceptance = self.calc.acceptance(&remaining, melds, void)?;

        // Seen from the hand after the discard, so the thrown tile counts as
        // visible.
        let after = PlayerState {
            hand: remaining,
            ..state.clone()
        };
        let unseen_table = VisibleTiles::new();
        let view = visible.unwrap_or(&unseen_table);
        let live_waits = waits.iter().map(|&w| view.unseen(w, &after) as u32).sum();

        trace!(
            "analyze: seat {} throw {} -> shanten {}, {} waits ({} live), {} accepted",
            state.seat,
            tile,
            shanten,
            waits.len(),
            live_waits,
            acceptance.len()
        );

        Ok(DiscardCandidate {
            tile,
            forced,
            shanten,
            waits,
            live_waits,
            acceptance,
        })
    }

    /// Every distinct discard, best first.
    pub fn analyze_discards(
        &mut self,
        state: &PlayerState,
        visible: Option<&VisibleTiles>,
    ) -> MahjongResult<Vec<DiscardCandidate>> {
        check_discard_due(state)?;

        let void_kinds: Vec<Tile> = match state.void_suit {
            Some(void) => state.hand.kinds().filter(|t| t.suit() == void).collect(),
            None => Vec::new(),
        };
        if !void_kinds.is_empty() {
            // Kinds come out in canonical order, so the lowest leads.
            return void_kinds
                .into_iter()
                .map(|t| self.candidate(state, t, true, visible))
                .collect();
        }

        let kinds: Vec<Tile> = state.hand.kinds().collect();
        let mut candidates = kinds
            .into_iter()
            .map(|t| self.candidate(state, t, false, visible))
            .collect::<MahjongResult<Vec<_>>>()?;

        let weighted = visible.is_some();
        candidates.sort_by(|a, b| rank(a, b, weighted));
        Ok(candidates)
    }

    pub fn suggest_discard(
        &mut self,
        state: &PlayerState,
        visible: Option<&VisibleTiles>,
    ) -> MahjongResult<Tile> {
        let candidates = self.analyze_discards(state, visible)?;
        let best = candidates
            .first()
            .ok_or_else(|| MahjongError::invalid_state("no tile to discard"))?;
        if best.forced {
            debug!("analyze: seat {} forced to throw void tile {}", state.seat, best.tile);
        } else {
            debug!(
                "analyze: seat {} throws {} (shanten {}, {} waits)",
                state.seat,
                best.tile,
                best.shanten,
                best.waits.len()
            );
        }
        Ok(best.tile)
    }
}

fn rank(a: &DiscardCandidate, b: &DiscardCandidate, weighted: bool) -> Ordering {
    (a.shanten, Reverse(a.wait_score(weighted)), a.tile)
        .cmp(&(b.shanten, Reverse(b.wait_score(weighted)), b.tile))
}

/// Recommended discard, ties on wait count broken by kind order.
pub fn suggest_discard(state: &PlayerState) -> MahjongResult<Tile> {
    HandAnalyzer::new().suggest_discard(state, None)
}

/// Recommended discard with waits weighted by their unseen copies.
pub fn suggest_discard_with_visible(state: &PlayerState, visible: &VisibleTiles) -> MahjongResult<Tile> {
    HandAnalyzer::new().suggest_discard(state, Some(visible))
}

pub fn analyze_discards(
    state: &PlayerState,
    visible: Option<&VisibleTiles>,
) -> MahjongResult<Vec<DiscardCandidate>> {
    HandAnalyzer::new().analyze_discards(state, visible)
}
