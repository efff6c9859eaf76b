//! Whole-table evaluation with rayon parallelism.
//!
//! Each seat (and each table of a batch) is independent, so seats are fanned
//! out across the pool. A seat due to discard gets a suggestion; a seat
//! holding 3k+1 tiles gets its waits.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xuezhan_engine::shanten::ShantenCalculator;
use xuezhan_engine::types::{Seat, NUM_PLAYERS};
use xuezhan_engine::{MahjongError, MahjongResult, PlayerState, Tile};

use crate::analyzer::HandAnalyzer;
use crate::visible::VisibleTiles;

/// Per-seat summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatOutlook {
    pub seat: Seat,
    pub won: bool,
    /// `None` once the seat has won.
    pub shanten: Option<i8>,
    pub tenpai: bool,
    pub waits: Vec<Tile>,
    /// Only for seats due to discard.
    pub suggestion: Option<Tile>,
}

fn evaluate_seat(player: &PlayerState, visible: Option<&VisibleTiles>) -> MahjongResult<SeatOutlook> {
    let mut outlook = SeatOutlook {
        seat: player.seat,
        won: player.won,
        ..SeatOutlook::default()
    };
    if player.won {
        return Ok(outlook);
    }

    let mut calc = ShantenCalculator::new();
    outlook.shanten = Some(calc.shanten(&player.hand, &player.melds, player.void_suit)?);
    if player.must_discard() {
        outlook.suggestion = Some(HandAnalyzer::new().suggest_discard(player, visible)?);
    } else {
        outlook.waits = calc.winning_tiles(&player.hand, &player.melds, player.void_suit)?;
        outlook.tenpai = calc.is_ting(&player.hand, &player.melds, player.void_suit);
    }
    Ok(outlook)
}

fn into_table(outlooks: Vec<SeatOutlook>) -> MahjongResult<[SeatOutlook; NUM_PLAYERS]> {
    let n = outlooks.len();
    outlooks
        .try_into()
        .map_err(|_| MahjongError::invalid_state(format!("expected {} seats, got {}", NUM_PLAYERS, n)))
}

/// Evaluates all four seats in parallel on the global pool.
pub fn evaluate_table(players: &[PlayerState; NUM_PLAYERS]) -> MahjongResult<[SeatOutlook; NUM_PLAYERS]> {
    evaluate_table_with_visible(players, None)
}

pub fn evaluate_table_with_visible(
    players: &[PlayerState; NUM_PLAYERS],
    visible: Option<&VisibleTiles>,
) -> MahjongResult<[SeatOutlook; NUM_PLAYERS]> {
    let outlooks = players
        .as_slice()
        .par_iter()
        .map(|p| evaluate_seat(p, visible))
        .collect::<MahjongResult<Vec<_>>>()?;
    into_table(outlooks)
}

/// Parallel evaluator on a dedicated rayon ThreadPool.
pub struct BatchEvaluator {
    pool: rayon::ThreadPool,
}

impl BatchEvaluator {
    /// `None` uses rayon's default thread count.
    pub fn new(num_threads: Option<usize>) -> Result<Self, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        Ok(Self {
            pool: builder.build()?,
        })
    }

    pub fn evaluate_table(&self, players: &[PlayerState; NUM_PLAYERS]) -> MahjongResult<[SeatOutlook; NUM_PLAYERS]> {
        self.pool.install(|| evaluate_table(players))
    }

    /// Evaluates many tables; fails on the first table that errors.
    pub fn evaluate_tables(
        &self,
        tables: &[[PlayerState; NUM_PLAYERS]],
    ) -> MahjongResult<Vec<[SeatOutlook; NUM_PLAYERS]>> {
        self.pool
            .install(|| tables.par_iter().map(evaluate_table).collect())
    }
}
