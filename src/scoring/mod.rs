//! Nutrition scoring engine
//!
//! Band tables, the per-food score calculator and the period aggregator.

pub mod aggregator;
pub mod bands;
pub mod calculator;
pub mod period;

pub use aggregator::{aggregate, blend_entries, blend_nutrients, AggregateResult, DayScore, EntryDetail};
pub use calculator::{
    compute, simple_score, try_compute, Grade, NegativePoints, PositivePoints, ScoreComponents,
    ScoreError, ScoreRecord, ScoreSummary,
};
pub use period::Period;
