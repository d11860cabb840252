//! Historical simulation VaR engine
//!
//! Portfolio P&L over history:
//! P_t = Σ_j R_{t,j} * w_j
//!
//! For a confidence level ci the tail holds k = floor((1 - ci) * T)
//! observations and VaR is the loss at the k-th worst one. Attribution:
//! - marginal VaR_j = VaR - VaR(P - R_{:,j} * w_j)
//! - incremental VaR_j = R_{t*,j} * w_j, where t* is the VaR day

use super::result::VarResult;
use super::selection::{order_statistic, select_tail, tail_size, validate_confidence};
use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// What to do when a confidence level leaves no observations in the tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroTailPolicy {
    /// Fail with [`RiskError::EmptyTail`]
    #[default]
    Reject,
    /// Use the single worst observation as both VaR and ES
    WorstObservation,
}

/// Historical VaR engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalVarConfig {
    /// Handling of k = 0 (default: reject)
    pub zero_tail: ZeroTailPolicy,

    /// Run per-asset leave-one-out selections on the rayon pool (default: false)
    pub parallel: bool,
}

/// Historical VaR engine
///
/// Holds an immutable return matrix (T x N) and weight vector (N) and derives
/// the portfolio P&L once. Every call to [`compute_risk`](Self::compute_risk)
/// is independent and deterministic.
#[derive(Debug, Clone)]
pub struct HistoricalVarEngine {
    returns: Array2<f64>,
    weights: Array1<f64>,
    pnl: Array1<f64>,
    config: HistoricalVarConfig,
}

impl HistoricalVarEngine {
    /// Create an engine with the default configuration.
    ///
    /// # Arguments
    /// * `returns` - Periodic asset returns (T x N), fully populated
    /// * `weights` - Linear exposures per asset (N)
    pub fn new(returns: Array2<f64>, weights: Array1<f64>) -> Result<Self> {
        Self::with_config(returns, weights, HistoricalVarConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(
        returns: Array2<f64>,
        weights: Array1<f64>,
        config: HistoricalVarConfig,
    ) -> Result<Self> {
        let (n_periods, n_assets) = returns.dim();

        if n_periods == 0 {
            return Err(RiskError::EmptySeries);
        }
        if n_assets == 0 {
            return Err(RiskError::NoAssets);
        }
        if weights.len() != n_assets {
            return Err(RiskError::DimensionMismatch {
                what: "weights",
                expected: n_assets,
                actual: weights.len(),
            });
        }
        if let Some(((row, col), _)) = returns.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "returns",
                row,
                col,
            });
        }
        if let Some(col) = weights.iter().position(|w| !w.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "weights",
                row: 0,
                col,
            });
        }

        // Summed left to right so incremental VaR adds back to P_t exactly.
        let pnl = returns
            .rows()
            .into_iter()
            .map(|row| portfolio_pnl(row, weights.view()))
            .collect::<Array1<f64>>();
        if let Some(row) = pnl.iter().position(|p| !p.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "portfolio pnl",
                row,
                col: 0,
            });
        }

        debug!(n_periods, n_assets, "historical VaR engine ready");

        Ok(Self {
            returns,
            weights,
            pnl,
            config,
        })
    }

    /// Portfolio P&L series (length T).
    pub const fn pnl(&self) -> &Array1<f64> {
        &self.pnl
    }

    /// Return matrix (T x N).
    pub const fn returns(&self) -> &Array2<f64> {
        &self.returns
    }

    /// Weight vector (N).
    pub const fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Engine configuration.
    pub const fn config(&self) -> &HistoricalVarConfig {
        &self.config
    }

    /// Number of time periods T.
    pub fn n_periods(&self) -> usize {
        self.returns.nrows()
    }

    /// Number of assets N.
    pub fn n_assets(&self) -> usize {
        self.returns.ncols()
    }

    /// Tail size k for a confidence level over this engine's history.
    pub fn tail_size(&self, confidence: f64) -> Result<usize> {
        validate_confidence(confidence)?;
        Ok(tail_size(confidence, self.n_periods()))
    }

    /// Compute VaR, ES and per-asset attribution for each confidence level.
    ///
    /// Results come back in the order of `confidence_levels`. Every level is
    /// validated before any work starts, so the call either returns all
    /// results or none.
    pub fn compute_risk(&self, confidence_levels: &[f64]) -> Result<Vec<VarResult>> {
        let n_periods = self.n_periods();
        let mut ranks = Vec::with_capacity(confidence_levels.len());

        for &confidence in confidence_levels {
            validate_confidence(confidence)?;
            let k = tail_size(confidence, n_periods);
            let rank = match (k, self.config.zero_tail) {
                (0, ZeroTailPolicy::Reject) => {
                    return Err(RiskError::EmptyTail {
                        confidence,
                        periods: n_periods,
                    });
                }
                (0, ZeroTailPolicy::WorstObservation) => {
                    warn!(
                        confidence,
                        n_periods, "empty tail, falling back to worst observation"
                    );
                    0
                }
                (k, _) => k - 1,
            };
            ranks.push(rank);
        }

        if ranks.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let leave_one_out = self.leave_one_out_pnl();
        if leave_one_out.iter().any(|p| !p.is_finite()) {
            return Err(RiskError::NonFiniteResult("leave-one-out pnl"));
        }
        let pnl = self.pnl.as_slice().ok_or(RiskError::EmptySeries)?;

        let results = confidence_levels
            .iter()
            .zip(ranks)
            .map(|(&confidence, rank)| self.risk_at_rank(pnl, &leave_one_out, confidence, rank))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            levels = results.len(),
            n_assets = self.n_assets(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "compute_risk finished"
        );

        Ok(results)
    }

    /// Leave-one-out P&L, one row per asset (N x T).
    ///
    /// Row j is P - R_{:,j} * w_j, built with a single broadcast subtraction.
    fn leave_one_out_pnl(&self) -> Array2<f64> {
        let exposures = &self.returns * &self.weights;
        let without = &self.pnl.view().insert_axis(Axis(1)) - &exposures;
        without.reversed_axes().as_standard_layout().into_owned()
    }

    fn risk_at_rank(
        &self,
        pnl: &[f64],
        leave_one_out: &Array2<f64>,
        confidence: f64,
        rank: usize,
    ) -> Result<VarResult> {
        let selection = select_tail(pnl, rank);
        let var = -pnl[selection.var_day];
        let tail_sum: f64 = selection.tail.iter().map(|&t| pnl[t]).sum();
        let es = -tail_sum / selection.tail.len() as f64;
        if !es.is_finite() {
            return Err(RiskError::NonFiniteResult("expected shortfall"));
        }

        let var_without = self.leave_one_out_var(leave_one_out, rank);
        let marginal_var: Vec<f64> = var_without.iter().map(|v| var - v).collect();
        if marginal_var.iter().any(|m| !m.is_finite()) {
            return Err(RiskError::NonFiniteResult("marginal VaR"));
        }

        let incremental_var = self
            .returns
            .row(selection.var_day)
            .iter()
            .zip(self.weights.iter())
            .map(|(r, w)| r * w)
            .collect();

        debug!(
            confidence,
            k = selection.tail.len(),
            var_day = selection.var_day,
            var,
            es,
            "computed historical VaR"
        );

        Ok(VarResult {
            confidence,
            var,
            es,
            var_day: selection.var_day,
            tail_indices: selection.tail,
            marginal_var,
            incremental_var,
        })
    }

    fn leave_one_out_var(&self, leave_one_out: &Array2<f64>, rank: usize) -> Vec<f64> {
        let var_of = |row: ArrayView1<'_, f64>| {
            let mut scratch = row.to_vec();
            -order_statistic(&mut scratch, rank)
        };

        if self.config.parallel {
            (0..leave_one_out.nrows())
                .into_par_iter()
                .map(|j| var_of(leave_one_out.row(j)))
                .collect()
        } else {
            leave_one_out.rows().into_iter().map(var_of).collect()
        }
    }
}

fn portfolio_pnl(returns: ArrayView1<'_, f64>, weights: ArrayView1<'_, f64>) -> f64 {
    returns.iter().zip(weights.iter()).map(|(r, w)| r * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    fn single_series(values: &[f64]) -> HistoricalVarEngine {
        let returns = Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap();
        HistoricalVarEngine::new(returns, array![1.0]).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = HistoricalVarConfig::default();
        assert_eq!(config.zero_tail, ZeroTailPolicy::Reject);
        assert!(!config.parallel);
    }

    #[test]
    fn test_ten_day_scenario() {
        let engine = single_series(&[2.0, -1.0, 5.0, -5.0, 0.0, 3.0, -3.0, 1.0, 4.0, 2.0]);
        let results = engine.compute_risk(&[0.8]).unwrap();
        let result = &results[0];

        assert_eq!(result.tail_size(), 2);
        assert_eq!(result.var, 3.0);
        assert_eq!(result.es, 4.0);
        assert_eq!(result.var_day, 6);
        assert_eq!(result.tail_indices, vec![3, 6]);
    }

    #[test]
    fn test_pnl_is_weighted_sum() {
        let returns = array![[0.01, 0.02], [-0.03, 0.01]];
        let engine = HistoricalVarEngine::new(returns, array![0.5, 2.0]).unwrap();
        assert_relative_eq!(engine.pnl()[0], 0.045, epsilon = 1e-12);
        assert_relative_eq!(engine.pnl()[1], 0.005, epsilon = 1e-12);
    }

    #[test]
    fn test_leave_one_out_rows() {
        let returns = array![[0.01, 0.02], [-0.03, 0.01], [0.02, -0.04]];
        let engine = HistoricalVarEngine::new(returns, array![1.0, 0.5]).unwrap();
        let loo = engine.leave_one_out_pnl();

        assert_eq!(loo.dim(), (2, 3));
        // Dropping asset 0 leaves asset 1's contribution and vice versa.
        assert_relative_eq!(loo[[0, 0]], 0.01, epsilon = 1e-12);
        assert_relative_eq!(loo[[0, 2]], -0.02, epsilon = 1e-12);
        assert_relative_eq!(loo[[1, 1]], -0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_empty_series() {
        let returns = Array2::<f64>::zeros((0, 2));
        let err = HistoricalVarEngine::new(returns, array![0.5, 0.5]).unwrap_err();
        assert_eq!(err, RiskError::EmptySeries);
    }

    #[test]
    fn test_rejects_weight_mismatch() {
        let returns = Array2::<f64>::zeros((5, 3));
        let err = HistoricalVarEngine::new(returns, array![0.5, 0.5]).unwrap_err();
        assert!(matches!(
            err,
            RiskError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_finite_return() {
        let mut returns = Array2::<f64>::zeros((5, 2));
        returns[[3, 1]] = f64::NAN;
        let err = HistoricalVarEngine::new(returns, array![0.5, 0.5]).unwrap_err();
        assert_eq!(
            err,
            RiskError::NonFiniteValue {
                what: "returns",
                row: 3,
                col: 1
            }
        );
    }

    #[test]
    fn test_rejects_no_assets() {
        let returns = Array2::<f64>::zeros((5, 0));
        let err = HistoricalVarEngine::new(returns, Array1::zeros(0)).unwrap_err();
        assert_eq!(err, RiskError::NoAssets);
    }

    #[rstest]
    #[case(f64::NAN, 0)]
    #[case(f64::INFINITY, 1)]
    #[case(f64::NEG_INFINITY, 1)]
    fn test_rejects_non_finite_weight(#[case] bad: f64, #[case] col: usize) {
        let mut weights = array![0.5, 0.5];
        weights[col] = bad;
        let err = HistoricalVarEngine::new(Array2::zeros((5, 2)), weights).unwrap_err();
        assert_eq!(
            err,
            RiskError::NonFiniteValue {
                what: "weights",
                row: 0,
                col
            }
        );
    }

    #[test]
    fn test_rejects_overflowing_pnl() {
        let returns = array![[0.01, 0.02], [1e300, 1e300], [-0.01, 0.0]];
        let err = HistoricalVarEngine::new(returns, array![1e10, 1e10]).unwrap_err();
        assert_eq!(
            err,
            RiskError::NonFiniteValue {
                what: "portfolio pnl",
                row: 1,
                col: 0
            }
        );
    }

    #[test]
    fn test_overflowing_leave_one_out_is_reported() {
        // Row 0 sums to 1e308, but dropping the middle asset doubles it.
        let returns = array![[1e308, -1e308, 1e308], [0.01, 0.0, -0.02]];
        let engine = HistoricalVarEngine::new(returns, array![1.0, 1.0, 1.0]).unwrap();
        let err = engine.compute_risk(&[0.5]).unwrap_err();

        assert_eq!(err, RiskError::NonFiniteResult("leave-one-out pnl"));
        assert_eq!(err.kind(), crate::ErrorKind::NumericalInstability);
    }

    #[test]
    fn test_overflowing_expected_shortfall_is_reported() {
        let engine = single_series(&[-1e308, -1e308, 1.0, 1.0]);
        let err = engine.compute_risk(&[0.5]).unwrap_err();
        assert_eq!(err, RiskError::NonFiniteResult("expected shortfall"));
    }

    #[test]
    fn test_invalid_confidence_fails_whole_call() {
        let engine = single_series(&[1.0, -1.0, 2.0, -2.0]);
        let err = engine.compute_risk(&[0.5, 1.0]).unwrap_err();
        assert_eq!(err, RiskError::InvalidConfidence(1.0));
    }

    #[test]
    fn test_empty_tail_rejected_by_default() {
        let engine = single_series(&[1.0, -1.0, 2.0, -2.0]);
        let err = engine.compute_risk(&[0.9]).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_empty_tail_worst_observation() {
        let returns = array![[1.0], [-1.0], [2.0], [-2.0]];
        let config = HistoricalVarConfig {
            zero_tail: ZeroTailPolicy::WorstObservation,
            ..Default::default()
        };
        let engine = HistoricalVarEngine::with_config(returns, array![1.0], config).unwrap();
        let result = &engine.compute_risk(&[0.9]).unwrap()[0];

        assert_eq!(result.var, 2.0);
        assert_eq!(result.es, 2.0);
        assert_eq!(result.var_day, 3);
        assert_eq!(result.tail_indices, vec![3]);
    }

    #[test]
    fn test_no_levels_yields_no_results() {
        let engine = single_series(&[1.0, -1.0]);
        assert!(engine.compute_risk(&[]).unwrap().is_empty());
    }
}
