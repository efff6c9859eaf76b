//! Xuezhan decision support
//!
//! Discard recommendation, visible-tile tracking and parallel whole-table
//! evaluation on top of `xuezhan-engine`.

pub mod analyzer;
pub mod batch;
pub mod visible;

pub use analyzer::{analyze_discards, suggest_discard, suggest_discard_with_visible, DiscardCandidate, HandAnalyzer};
pub use batch::{evaluate_table, BatchEvaluator, SeatOutlook};
pub use visible::VisibleTiles;
