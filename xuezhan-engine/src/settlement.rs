//! Round-end settlement.
//!
//! Runs once over the frozen player snapshots, in three phases: flowery-pig
//! penalties, kong-income refunds for non-tenpai players, then the big call
//! from non-tenpai to tenpai players. Every payment is recorded as a
//! `Transfer`; deltas are their sum, so the table is always zero-sum.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{MahjongError, MahjongResult};
use crate::player::PlayerState;
use crate::rule::GameRule;
use crate::score::best_self_drawn;
use crate::shanten::is_ting;
use crate::types::{Seat, NUM_PLAYERS};

/// Flowery pig: a non-winner whose final tiles span more suits than this.
const PIG_SUITS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferReason {
    FloweryPig,
    KongRefund,
    BigCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Seat,
    pub to: Seat,
    pub amount: i64,
    pub reason: TransferReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementResult {
    pub deltas: [i64; NUM_PLAYERS],
    pub flowery_pig: [bool; NUM_PLAYERS],
    pub tenpai: [bool; NUM_PLAYERS],
    /// Capped big-call multiplier of each tenpai seat.
    pub best_multiplier: [Option<u32>; NUM_PLAYERS],
    pub transfers: Vec<Transfer>,
}

impl SettlementResult {
    fn pay(&mut self, from: Seat, to: Seat, amount: i64, reason: TransferReason) {
        if amount == 0 || from == to {
            return;
        }
        self.deltas[from as usize] -= amount;
        self.deltas[to as usize] += amount;
        self.transfers.push(Transfer {
            from,
            to,
            amount,
            reason,
        });
    }

    /// Seats whose kong income was returned.
    pub fn refunded(&self) -> impl Iterator<Item = Seat> + '_ {
        (0..NUM_PLAYERS as Seat).filter(move |&s| {
            self.transfers
                .iter()
                .any(|t| t.reason == TransferReason::KongRefund && t.from == s)
        })
    }

    /// Writes the verdicts back: pig and tenpai flags, refunded kong income
    /// cleared.
    pub fn apply_flags(&self, players: &mut [PlayerState; NUM_PLAYERS]) {
        let refunded: Vec<Seat> = self.refunded().collect();
        for (i, p) in players.iter_mut().enumerate() {
            p.flowery_pig = self.flowery_pig[i];
            p.tenpai = self.tenpai[i];
            if refunded.contains(&(i as Seat)) {
                p.kong_income.clear();
            }
        }
    }

    pub fn to_json(&self) -> MahjongResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Settles a finished round.
pub fn settle(players: &[PlayerState; NUM_PLAYERS], rule: &GameRule) -> MahjongResult<SettlementResult> {
    for (i, p) in players.iter().enumerate() {
        if p.seat as usize != i {
            return Err(MahjongError::invalid_state(format!(
                "player at index {} claims seat {}",
                i, p.seat
            )));
        }
    }

    let mut result = SettlementResult::default();
    let seats = 0..NUM_PLAYERS as Seat;

    // Flowery pigs.
    for p in players {
        result.flowery_pig[p.seat as usize] = !p.won && p.suit_count() > PIG_SUITS;
    }
    let pigs = result.flowery_pig;
    let penalty = rule.flowery_pig_penalty.saturating_mul(rule.base_point);
    for pig in seats.clone().filter(|&s| pigs[s as usize]) {
        for other in seats.clone().filter(|&s| !pigs[s as usize]) {
            result.pay(pig, other, penalty, TransferReason::FloweryPig);
        }
    }
    debug!("settle: flowery pigs {:?}", result.flowery_pig);

    // Tenpai from the frozen hands, then kong refunds.
    for p in players {
        let s = p.seat as usize;
        result.tenpai[s] = !p.won && !result.flowery_pig[s] && is_ting(&p.hand, &p.melds, p.void_suit);
    }
    for p in players {
        let s = p.seat as usize;
        if p.won || result.flowery_pig[s] || result.tenpai[s] {
            continue;
        }
        for charge in &p.kong_income {
            result.pay(p.seat, charge.payer, charge.amount, TransferReason::KongRefund);
        }
    }
    debug!("settle: tenpai {:?}", result.tenpai);

    // Big call.
    let tenpai = result.tenpai;
    for p in players.iter().filter(|p| tenpai[p.seat as usize]) {
        let best = best_self_drawn(&p.hand, &p.melds, p.void_suit)?;
        let Some((tile, score)) = best else { continue };
        let multiplier = rule.cap(score.multiplier);
        result.best_multiplier[p.seat as usize] = Some(multiplier);
        debug!(
            "settle: seat {} big call {} via {} on {}",
            p.seat, multiplier, score.pattern_name, tile
        );

        let amount = (multiplier as i64).saturating_mul(rule.base_point);
        for payer in players {
            let s = payer.seat as usize;
            let pays = !payer.won && !tenpai[s] && (!pigs[s] || rule.flowery_pig_pays_big_call);
            if pays {
                result.pay(payer.seat, p.seat, amount, TransferReason::BigCall);
            }
        }
    }

    Ok(result)
}
