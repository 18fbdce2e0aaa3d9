use crate::error::StatsError;
use crate::models::{Regression, TrendLine};

/// Ordinary least squares fit of `y = slope * x + intercept`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<Regression, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if x.iter().chain(y).any(|value| !value.is_finite()) {
        return Err(StatsError::NonFiniteInput);
    }
    if x.iter().all(|value| *value == x[0]) {
        return Err(StatsError::DegenerateInput);
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_x2: f64 = x.iter().map(|value| value * value).sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if !denominator.is_finite() {
        return Err(StatsError::NonFiniteInput);
    }
    if denominator == 0.0 {
        return Err(StatsError::DegenerateInput);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(StatsError::NonFiniteInput);
    }

    Ok(Regression { slope, intercept })
}

/// Segment of the fitted line from `x = 0` to `x = x_max`.
pub fn trend_line(regression: &Regression, x_max: f64) -> TrendLine {
    TrendLine {
        x1: 0.0,
        y1: regression.intercept,
        x2: x_max,
        y2: regression.predict(x_max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn fits_exact_line() {
        let fit = linear_regression(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < TOLERANCE);
        assert!(fit.intercept.abs() < TOLERANCE);
    }

    #[test]
    fn line_passes_through_means() {
        let x = [48.5, 61.0, 72.5, 90.0, 55.0, 83.5];
        let y = [45.0, 66.0, 70.0, 88.0, 59.0, 79.0];
        let fit = linear_regression(&x, &y).unwrap();

        let mean_x = x.iter().sum::<f64>() / x.len() as f64;
        let mean_y = y.iter().sum::<f64>() / y.len() as f64;
        assert!((fit.predict(mean_x) - mean_y).abs() < TOLERANCE);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(linear_regression(&[], &[]), Err(StatsError::EmptyInput));
        assert_eq!(
            linear_regression(&[4.0, 4.0, 4.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::DegenerateInput)
        );
        assert_eq!(
            linear_regression(&[7.0], &[3.0]),
            Err(StatsError::DegenerateInput)
        );
        assert_eq!(
            linear_regression(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { x: 2, y: 1 })
        );
    }

    #[test]
    fn rejects_non_finite_samples_and_overflow() {
        assert_eq!(
            linear_regression(&[1.0, 2.0, 3.0], &[1.0, f64::NAN, 3.0]),
            Err(StatsError::NonFiniteInput)
        );
        assert_eq!(
            linear_regression(&[1.0, 2.0, 3.0], &[1e308; 3]),
            Err(StatsError::NonFiniteInput)
        );

        let err = linear_regression(&[1e200, 2e200], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, StatsError::NonFiniteInput);
        assert!(!err.to_string().contains("identical"));
    }

    #[test]
    fn trend_line_spans_zero_to_max() {
        let fit = Regression {
            slope: 0.5,
            intercept: 10.0,
        };
        let line = trend_line(&fit, 100.0);
        assert_eq!(line, TrendLine { x1: 0.0, y1: 10.0, x2: 100.0, y2: 60.0 });
    }
}
