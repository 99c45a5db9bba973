use thiserror::Error;

use super::engine::{score, ScoreInput, AUTO_POINTS};

/// Reasons a score input is rejected by the strict path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("invalid input: rank must be at least 1, got {0}")]
    InvalidRank(u32),

    #[error("invalid input: percent must be within 0-100, got {0}")]
    PercentOutOfRange(f64),

    #[error("invalid input: min percent must be within 0-100, got {0}")]
    MinPercentOutOfRange(f64),

    #[error("invalid input: manual points must be -1 (auto) or non-negative, got {0}")]
    InvalidManualPoints(f64),
}

fn is_percentage(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

pub fn validate_percent(percent: f64) -> Result<(), ScoreError> {
    if is_percentage(percent) {
        Ok(())
    } else {
        Err(ScoreError::PercentOutOfRange(percent))
    }
}

pub fn validate_min_percent(min_percent: f64) -> Result<(), ScoreError> {
    if is_percentage(min_percent) {
        Ok(())
    } else {
        Err(ScoreError::MinPercentOutOfRange(min_percent))
    }
}

/// A manual override is either the `-1` auto sentinel or a finite, non-negative value.
pub fn validate_manual_points(points: f64) -> Result<(), ScoreError> {
    if points == AUTO_POINTS || (points.is_finite() && points >= 0.0) {
        Ok(())
    } else {
        Err(ScoreError::InvalidManualPoints(points))
    }
}

/// Validate a score input.
/// Returns all validation errors at once (not just the first).
pub fn validate_input(input: &ScoreInput) -> Result<(), Vec<ScoreError>> {
    let mut errors = Vec::new();

    if input.rank < 1 {
        errors.push(ScoreError::InvalidRank(input.rank));
    }

    let checks = [
        validate_percent(input.percent),
        validate_min_percent(input.min_percent),
        input.manual_points.map_or(Ok(()), validate_manual_points),
    ];
    errors.extend(checks.into_iter().filter_map(Result::err));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Strict scoring: reject out-of-domain input instead of passing it through.
/// Reports the first violation found.
pub fn try_score(input: &ScoreInput) -> Result<f64, ScoreError> {
    if let Err(mut errors) = validate_input(input) {
        return Err(errors.remove(0));
    }

    Ok(score(
        input.rank,
        input.percent,
        input.min_percent,
        input.manual_points,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        let input = ScoreInput::new(1, 100.0, 50.0).with_manual_points(Some(-1.0));
        assert!(validate_input(&input).is_ok());
        assert_eq!(try_score(&input), Ok(200.0));
    }

    #[test]
    fn test_rank_zero_rejected() {
        let input = ScoreInput::new(0, 100.0, 50.0);
        assert_eq!(try_score(&input), Err(ScoreError::InvalidRank(0)));
    }

    #[test]
    fn test_percent_out_of_range() {
        let input = ScoreInput::new(1, 101.0, 50.0);
        let errors = validate_input(&input).unwrap_err();
        assert_eq!(errors, vec![ScoreError::PercentOutOfRange(101.0)]);
    }

    #[test]
    fn test_nan_percent_rejected() {
        let input = ScoreInput::new(1, f64::NAN, 50.0);
        assert!(matches!(
            try_score(&input),
            Err(ScoreError::PercentOutOfRange(_))
        ));
    }

    #[test]
    fn test_min_percent_out_of_range() {
        let input = ScoreInput::new(1, 100.0, -5.0);
        assert_eq!(
            try_score(&input),
            Err(ScoreError::MinPercentOutOfRange(-5.0))
        );
    }

    #[test]
    fn test_negative_override_rejected() {
        let input = ScoreInput::new(1, 100.0, 50.0).with_manual_points(Some(-0.5));
        assert_eq!(
            try_score(&input),
            Err(ScoreError::InvalidManualPoints(-0.5))
        );
    }

    #[test]
    fn test_zero_override_accepted() {
        let input = ScoreInput::new(1, 100.0, 50.0).with_manual_points(Some(0.0));
        assert_eq!(try_score(&input), Ok(0.0));
    }

    #[test]
    fn test_collects_all_errors() {
        let input = ScoreInput::new(0, 150.0, 200.0).with_manual_points(Some(-3.0));
        let errors = validate_input(&input).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_single_field_checks() {
        assert!(validate_percent(100.0).is_ok());
        assert_eq!(validate_percent(-1.0), Err(ScoreError::PercentOutOfRange(-1.0)));
        assert_eq!(
            validate_min_percent(101.0),
            Err(ScoreError::MinPercentOutOfRange(101.0))
        );
        assert!(validate_manual_points(AUTO_POINTS).is_ok());
        assert!(validate_manual_points(0.0).is_ok());
        assert!(validate_manual_points(f64::INFINITY).is_err());
        assert!(validate_manual_points(-2.0).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = ScoreError::InvalidRank(0);
        assert_eq!(
            err.to_string(),
            "invalid input: rank must be at least 1, got 0"
        );
    }
}
