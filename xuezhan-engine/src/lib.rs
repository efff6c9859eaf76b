pub mod agari;
pub mod errors;
pub mod fan;
pub mod parser;
pub mod player;
pub mod rule;
pub mod score;
pub mod settlement;
pub mod shanten;
pub mod tile;
pub mod types;

pub use agari::{can_win, is_winning_hand};
pub use errors::{MahjongError, MahjongResult};
pub use player::PlayerState;
pub use rule::GameRule;
pub use score::{score, ScoreResult};
pub use settlement::{settle, SettlementResult};
pub use shanten::{is_ting, shanten, winning_tiles};
pub use tile::{Suit, Tile};
pub use types::{Hand, Meld, MeldKind, ScoringContext, Seat};
