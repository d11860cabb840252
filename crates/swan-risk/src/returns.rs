//! Return series from prices
//!
//! Converts a price matrix (T x N, rows = periods) into periodic returns
//! (T-1 x N). The first period has no predecessor and is dropped.

use crate::error::{Result, RiskError};
use ndarray::{Array2, Axis, s};

/// Simple returns: p_t / p_{t-1} - 1
pub fn simple_returns(prices: &Array2<f64>) -> Result<Array2<f64>> {
    period_ratios(prices).map(|ratios| ratios.mapv(|r| r - 1.0))
}

/// Log returns: ln(p_t / p_{t-1})
pub fn log_returns(prices: &Array2<f64>) -> Result<Array2<f64>> {
    period_ratios(prices).map(|ratios| ratios.mapv(f64::ln))
}

fn period_ratios(prices: &Array2<f64>) -> Result<Array2<f64>> {
    let n_periods = prices.len_of(Axis(0));
    if n_periods < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: n_periods,
        });
    }
    if let Some(((row, col), &price)) = prices
        .indexed_iter()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(RiskError::InvalidPrice { price, row, col });
    }

    Ok(&prices.slice(s![1.., ..]) / &prices.slice(s![..-1, ..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_simple_returns() {
        let prices = array![[100.0, 50.0], [110.0, 45.0], [99.0, 45.0]];
        let returns = simple_returns(&prices).unwrap();

        assert_eq!(returns.dim(), (2, 2));
        assert_relative_eq!(returns[[0, 0]], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns[[0, 1]], -0.10, epsilon = 1e-12);
        assert_relative_eq!(returns[[1, 0]], -0.10, epsilon = 1e-12);
        assert_eq!(returns[[1, 1]], 0.0);
    }

    #[test]
    fn test_log_returns() {
        let prices = array![[100.0], [200.0]];
        let returns = log_returns(&prices).unwrap();
        assert_relative_eq!(returns[[0, 0]], 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_row_is_insufficient() {
        let prices = array![[100.0, 50.0]];
        assert_eq!(
            simple_returns(&prices).unwrap_err(),
            RiskError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let prices = array![[100.0], [0.0], [101.0]];
        assert!(matches!(
            simple_returns(&prices).unwrap_err(),
            RiskError::InvalidPrice { row: 1, col: 0, .. }
        ));
    }
}
