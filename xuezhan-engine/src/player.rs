//! Per-seat round state.
//!
//! A `PlayerState` is created at the deal, mutated by draws, discards and
//! meld declarations, and frozen at round end for settlement. Every mutation
//! validates against the current shape and fails with `InvalidState` rather
//! than leaving the state half-applied.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::agari::{can_win, GROUPS_PER_HAND};
use crate::errors::{MahjongError, MahjongResult};
use crate::rule::GameRule;
use crate::shanten::is_ting;
use crate::tile::{Suit, Tile};
use crate::types::{combined_suits, Hand, Meld, MeldKind, Seat, NUM_PLAYERS};

/// Concealed tiles at the deal.
pub const DEAL_SIZE: usize = 13;

/// One payment owed to a kong declarer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KongCharge {
    pub payer: Seat,
    pub amount: i64,
    pub kind: MeldKind,
    pub tile: Tile,
}

/// Who pays for a kong declared by `seat`.
///
/// An exposed kong is paid by the discarder alone; concealed and upgraded
/// kongs by every other player still in the hand (`active[s]`).
pub fn kong_charges(
    kind: MeldKind,
    tile: Tile,
    seat: Seat,
    from: Option<Seat>,
    active: &[bool; NUM_PLAYERS],
    rule: &GameRule,
) -> MahjongResult<Vec<KongCharge>> {
    let charge = |payer: Seat, per: i64| KongCharge {
        payer,
        amount: per.saturating_mul(rule.base_point),
        kind,
        tile,
    };
    let others = || {
        (0..NUM_PLAYERS as Seat).filter(move |&s| s != seat && active[s as usize])
    };
    match kind {
        MeldKind::Triplet => Err(MahjongError::invalid_state("a triplet is not a kong")),
        MeldKind::ExposedKong => match from {
            Some(payer) if payer != seat && (payer as usize) < NUM_PLAYERS => {
                Ok(vec![charge(payer, rule.exposed_kong_charge)])
            }
            _ => Err(MahjongError::invalid_state(
                "exposed kong needs the discarding seat",
            )),
        },
        MeldKind::ConcealedKong => Ok(others()
            .map(|s| charge(s, rule.concealed_kong_charge))
            .collect()),
        MeldKind::UpgradedKong => Ok(others()
            .map(|s| charge(s, rule.upgraded_kong_charge))
            .collect()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub seat: Seat,
    pub hand: Hand,
    /// Declaration order.
    pub melds: Vec<Meld>,
    pub void_suit: Option<Suit>,
    pub won: bool,
    /// Refreshed after every discard.
    pub tenpai: bool,
    /// Only meaningful after settlement.
    pub flowery_pig: bool,
    pub kong_income: Vec<KongCharge>,
}

impl PlayerState {
    pub fn new(seat: Seat) -> Self {
        Self {
            seat,
            ..Self::default()
        }
    }

    /// Starts a round holding the 13 dealt tiles.
    pub fn deal(seat: Seat, tiles: &[Tile]) -> MahjongResult<Self> {
        if seat as usize >= NUM_PLAYERS {
            return Err(MahjongError::invalid_state(format!("seat {} out of range", seat)));
        }
        if tiles.len() != DEAL_SIZE {
            return Err(MahjongError::InvalidHandSize {
                expected: DEAL_SIZE.to_string(),
                actual: tiles.len(),
            });
        }
        Ok(Self {
            hand: Hand::from_tiles(tiles)?,
            ..Self::new(seat)
        })
    }

    /// Commits to the void suit. Can only happen once.
    pub fn declare_void(&mut self, suit: Suit) -> MahjongResult<()> {
        if let Some(current) = self.void_suit {
            return Err(MahjongError::invalid_state(format!(
                "void suit already declared as {}",
                current
            )));
        }
        self.void_suit = Some(suit);
        Ok(())
    }

    fn groups_needed(&self) -> usize {
        GROUPS_PER_HAND.saturating_sub(self.melds.len())
    }

    /// True with 3k+2 concealed tiles (a discard is due).
    pub fn must_discard(&self) -> bool {
        self.hand.len() == 3 * self.groups_needed() + 2
    }

    fn require_playing(&self, action: &str) -> MahjongResult<()> {
        if self.won {
            return Err(MahjongError::invalid_state(format!(
                "seat {} already won and cannot {}",
                self.seat, action
            )));
        }
        Ok(())
    }

    fn require_waiting(&self, action: &str) -> MahjongResult<()> {
        self.require_playing(action)?;
        if self.must_discard() {
            return Err(MahjongError::invalid_state(format!(
                "seat {} must discard before it can {}",
                self.seat, action
            )));
        }
        Ok(())
    }

    fn require_not_void(&self, tile: Tile) -> MahjongResult<()> {
        if self.void_suit == Some(tile.suit()) {
            return Err(MahjongError::invalid_state(format!(
                "{} is in the void suit",
                tile
            )));
        }
        Ok(())
    }

    fn take(&mut self, tile: Tile, n: u8) -> MahjongResult<()> {
        if self.hand.count(tile) < n {
            return Err(MahjongError::invalid_state(format!(
                "seat {} holds {} of {}, needs {}",
                self.seat,
                self.hand.count(tile),
                tile,
                n
            )));
        }
        for _ in 0..n {
            self.hand.remove(tile)?;
        }
        Ok(())
    }

    pub fn draw(&mut self, tile: Tile) -> MahjongResult<()> {
        self.require_waiting("draw")?;
        self.hand.add(tile)
    }

    /// Discards one tile and refreshes `tenpai`.
    pub fn discard(&mut self, tile: Tile) -> MahjongResult<()> {
        self.require_playing("discard")?;
        if !self.must_discard() {
            return Err(MahjongError::invalid_state(format!(
                "seat {} has no tile to spare",
                self.seat
            )));
        }
        self.hand.remove(tile)?;
        self.tenpai = is_ting(&self.hand, &self.melds, self.void_suit);
        trace!("seat {} discards {} (tenpai: {})", self.seat, tile, self.tenpai);
        Ok(())
    }

    /// Claims a discarded tile into a triplet.
    pub fn pong(&mut self, tile: Tile, from: Seat) -> MahjongResult<()> {
        self.require_waiting("pong")?;
        self.require_not_void(tile)?;
        self.take(tile, 2)?;
        self.melds.push(Meld::triplet(tile, from));
        Ok(())
    }

    /// Claims a discarded tile into a kong.
    pub fn exposed_kong(&mut self, tile: Tile, from: Seat) -> MahjongResult<()> {
        self.require_waiting("kong")?;
        self.require_not_void(tile)?;
        self.take(tile, 3)?;
        self.melds.push(Meld::exposed_kong(tile, from));
        Ok(())
    }

    /// Declares four concealed copies after a draw.
    pub fn concealed_kong(&mut self, tile: Tile) -> MahjongResult<()> {
        self.require_playing("kong")?;
        self.require_not_void(tile)?;
        if !self.must_discard() {
            return Err(MahjongError::invalid_state("concealed kong needs a fresh draw"));
        }
        self.take(tile, 4)?;
        self.melds.push(Meld::concealed_kong(tile));
        Ok(())
    }

    /// Adds the drawn fourth copy to an existing triplet, in place.
    pub fn upgrade_kong(&mut self, tile: Tile) -> MahjongResult<()> {
        self.require_playing("kong")?;
        if !self.must_discard() {
            return Err(MahjongError::invalid_state("upgraded kong needs a fresh draw"));
        }
        let idx = self
            .melds
            .iter()
            .position(|m| m.kind == MeldKind::Triplet && m.tile == tile)
            .ok_or_else(|| MahjongError::invalid_state(format!("no triplet of {} to upgrade", tile)))?;
        self.take(tile, 1)?;
        self.melds[idx].kind = MeldKind::UpgradedKong;
        Ok(())
    }

    /// Marks the seat as won; the hand must be a legal win with the void
    /// suit cleared.
    pub fn declare_win(&mut self) -> MahjongResult<()> {
        self.require_playing("win again")?;
        if !can_win(&self.hand, &self.melds, self.void_suit) {
            return Err(MahjongError::IncompleteHand);
        }
        self.won = true;
        Ok(())
    }

    pub fn record_kong_income(&mut self, charges: impl IntoIterator<Item = KongCharge>) {
        self.kong_income.extend(charges);
    }

    pub fn kong_income_total(&self) -> i64 {
        self.kong_income.iter().map(|c| c.amount).sum()
    }

    /// Suits present across hand and melds.
    pub fn suit_count(&self) -> u32 {
        combined_suits(&self.hand, &self.melds).count_ones()
    }
}
