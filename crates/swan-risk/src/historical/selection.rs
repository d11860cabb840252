//! Order-statistic selection
//!
//! Partial selection over P&L series. Each call is O(T) on average: the
//! series is partitioned around the requested rank instead of being sorted.
//!
//! Ranks are 0-based positions in the ascending order, so rank 0 is the
//! worst (most negative) observation.

use crate::error::{Result, RiskError};

/// Relative guard against binary rounding in `(1 - ci) * T`, in ulps of T.
///
/// `1.0 - 0.8` is `0.19999999999999996`, which would otherwise turn a tail of
/// 2 out of 10 observations into a tail of 1. The error grows with T, so the
/// guard does too.
const TAIL_ROUNDING_ULPS: f64 = 4.0;

/// Validate that a confidence level lies strictly between 0 and 1.
pub fn validate_confidence(confidence: f64) -> Result<()> {
    if confidence.is_finite() && confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(RiskError::InvalidConfidence(confidence))
    }
}

/// Number of tail observations `k = floor((1 - ci) * T)`, clamped to `T - 1`.
///
/// # Arguments
/// * `confidence` - Confidence level in (0, 1)
/// * `periods` - Length of the time series
pub fn tail_size(confidence: f64, periods: usize) -> usize {
    if periods == 0 {
        return 0;
    }
    let periods_f = periods as f64;
    let raw = (1.0 - confidence) * periods_f + periods_f * TAIL_ROUNDING_ULPS * f64::EPSILON;
    (raw.floor().max(0.0) as usize).min(periods - 1)
}

/// Value that would sit at `rank` if `values` were sorted ascending.
///
/// Reorders `values` in place. `rank` must be less than `values.len()`.
pub fn order_statistic(values: &mut [f64], rank: usize) -> f64 {
    let (_, nth, _) = values.select_nth_unstable_by(rank, f64::total_cmp);
    *nth
}

/// Outcome of selecting the tail of a P&L series.
#[derive(Debug, Clone, PartialEq)]
pub struct TailSelection {
    /// Time index holding the order statistic at the selected rank
    pub var_day: usize,
    /// Indices of all observations at or below the selected rank, ascending
    pub tail: Vec<usize>,
}

/// Select the `rank + 1` worst observations of `pnl`.
///
/// Ties are broken by time index, so the VaR day and the tail set are fully
/// determined by the input.
pub fn select_tail(pnl: &[f64], rank: usize) -> TailSelection {
    let mut indices: Vec<usize> = (0..pnl.len()).collect();
    let (below, nth, _) = indices.select_nth_unstable_by(rank, |&a, &b| {
        pnl[a].total_cmp(&pnl[b]).then_with(|| a.cmp(&b))
    });
    let var_day = *nth;

    let mut tail = Vec::with_capacity(rank + 1);
    tail.extend_from_slice(below);
    tail.push(var_day);
    tail.sort_unstable();

    TailSelection { var_day, tail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.8, 10, 2)]
    #[case(0.95, 100, 5)]
    #[case(0.99, 100, 1)]
    #[case(0.99, 50, 0)]
    #[case(0.95, 252, 12)]
    #[case(0.5, 3, 1)]
    #[case(0.8, 100_000_000, 20_000_000)]
    #[case(0.99, 1_000_000_000, 10_000_000)]
    #[case(0.999, 250_000, 250)]
    fn test_tail_size(#[case] confidence: f64, #[case] periods: usize, #[case] expected: usize) {
        assert_eq!(tail_size(confidence, periods), expected);
    }

    #[test]
    fn test_tail_size_never_reaches_series_length() {
        assert_eq!(tail_size(1e-12, 10), 9);
        assert_eq!(tail_size(0.5, 1), 0);
        assert_eq!(tail_size(0.5, 0), 0);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_confidence(#[case] confidence: f64) {
        assert!(validate_confidence(confidence).is_err());
    }

    #[test]
    fn test_order_statistic() {
        let mut values = vec![3.0, -1.0, 2.0, -5.0, 0.0];
        assert_eq!(order_statistic(&mut values, 0), -5.0);
        assert_eq!(order_statistic(&mut values, 1), -1.0);
        assert_eq!(order_statistic(&mut values, 4), 3.0);
    }

    #[test]
    fn test_select_tail_positions() {
        let pnl = [2.0, -5.0, 4.0, -3.0, 1.0];
        let selection = select_tail(&pnl, 1);
        assert_eq!(selection.var_day, 3);
        assert_eq!(selection.tail, vec![1, 3]);
    }

    #[test]
    fn test_select_tail_ties_break_on_index() {
        let pnl = [-1.0, -2.0, -2.0, -2.0, 0.0];
        let selection = select_tail(&pnl, 1);
        assert_eq!(selection.var_day, 2);
        assert_eq!(selection.tail, vec![1, 2]);
    }
}
