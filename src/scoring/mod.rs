pub mod augmented;
pub mod config;
pub mod engine;
pub mod factors;
pub mod text;
pub mod validation;

pub use augmented::{fetch_signal, score_with_classifier, SignalOptions};
pub use config::*;
pub use engine::{
    calculate_score, check_disqualification, score_submission, Disqualification,
    ScoreBreakdown, ScoreResult, ScoreSource,
};
pub use factors::RangeOp;
pub use text::TextStats;
pub use validation::validate_scoring;
