pub mod engine;
pub mod validation;

pub use engine::{
    evaluate, round, score, ScoreBasis, ScoreInput, ScoreResult, AUTO_POINTS, FULL_COMPLETION,
    MAX_SCORED_RANK, SCALE,
};
pub use validation::{
    try_score, validate_input, validate_manual_points, validate_min_percent, validate_percent,
    ScoreError,
};
