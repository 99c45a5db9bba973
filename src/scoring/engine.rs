use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal digits scores are rounded to
pub const SCALE: u32 = 3;

/// Last rank on the list that still awards points
pub const MAX_SCORED_RANK: u32 = 150;

/// Manual points sentinel meaning "compute automatically"
pub const AUTO_POINTS: f64 = -1.0;

/// Only full completions earn points
pub const FULL_COMPLETION: f64 = 100.0;

const CURVE_COEFFICIENT: f64 = -24.9975;
const CURVE_EXPONENT: f64 = 0.4;
const TOP_SCORE: f64 = 200.0;

/// Everything the scoring policy looks at for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    /// 1-based position on the list
    pub rank: u32,
    /// Completion percentage of the record
    pub percent: f64,
    /// List eligibility threshold. Kept for the legacy percentage scaling,
    /// which the active formula does not use.
    pub min_percent: f64,
    /// Administrator override; `None` or `-1` means auto
    pub manual_points: Option<f64>,
}

impl ScoreInput {
    pub fn new(rank: u32, percent: f64, min_percent: f64) -> Self {
        Self {
            rank,
            percent,
            min_percent,
            manual_points: None,
        }
    }

    pub fn with_manual_points(mut self, manual_points: Option<f64>) -> Self {
        self.manual_points = manual_points;
        self
    }

    /// The override to award, if any. Anything strictly above the `-1`
    /// sentinel counts, including `0`.
    pub fn manual_override(&self) -> Option<f64> {
        self.manual_points.filter(|points| *points > AUTO_POINTS)
    }
}

/// Which policy branch decided a score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBasis {
    /// Percent below 100
    Incomplete,
    /// Administrator override returned as-is
    Manual,
    /// Rank beyond the points-eligible window
    OutOfRange,
    /// Rank curve; `raw` is the value before clamping and rounding
    Formula { raw: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub basis: ScoreBasis,
}

/// Points awarded for a record at `rank` with `percent` completion.
///
/// Policy order matters: the 100%-only gate runs first, then the manual
/// override, then the rank cutoff, and only then the curve. Inputs are not
/// validated here; see [`super::validation::try_score`] for the strict path.
pub fn score(rank: u32, percent: f64, min_percent: f64, manual_points: Option<f64>) -> f64 {
    let input = ScoreInput::new(rank, percent, min_percent).with_manual_points(manual_points);
    evaluate(&input).score
}

/// Same policy as [`score`], but also reports which branch decided the value.
pub fn evaluate(input: &ScoreInput) -> ScoreResult {
    if input.percent < FULL_COMPLETION {
        return ScoreResult {
            score: 0.0,
            basis: ScoreBasis::Incomplete,
        };
    }

    if let Some(points) = input.manual_override() {
        return ScoreResult {
            score: points,
            basis: ScoreBasis::Manual,
        };
    }

    if input.rank > MAX_SCORED_RANK {
        return ScoreResult {
            score: 0.0,
            basis: ScoreBasis::OutOfRange,
        };
    }

    let raw = curve(input.rank);
    let clamped = raw.max(0.0);

    ScoreResult {
        score: round(clamped).max(0.0),
        basis: ScoreBasis::Formula { raw },
    }
}

/// Rank curve: 200 at rank 1, falling off with `(rank - 1)^0.4`.
fn curve(rank: u32) -> f64 {
    CURVE_COEFFICIENT * (f64::from(rank) - 1.0).powf(CURVE_EXPONENT) + TOP_SCORE
}

/// Round to [`SCALE`] decimal digits.
///
/// Works on the shortest decimal form of `num` rather than on its binary
/// value, so `1.0045` becomes `1.005` instead of `1.004`. Ties go toward
/// positive infinity. Non-finite input yields NaN; magnitudes beyond the
/// decimal range are returned unchanged (they carry no fractional digits).
pub fn round(num: f64) -> f64 {
    if !num.is_finite() {
        return f64::NAN;
    }

    let Ok(exact) = Decimal::from_str(&num.to_string()) else {
        return num;
    };

    let strategy = if exact.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };

    exact
        .round_dp_with_strategy(SCALE, strategy)
        .to_string()
        .parse()
        .unwrap_or(num)
}
