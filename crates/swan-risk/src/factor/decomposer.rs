//! Factor risk decomposition
//!
//! Euler decomposition of portfolio factor variance:
//! V = W^T * F * W
//!
//! where:
//! - W = X^T * w (portfolio factor exposures)
//! - F = factor covariance matrix
//!
//! The gradient m = 2 * F * W gives each factor's contribution m_f * W_f, and
//! Σ_f m_f * W_f = 2V, so the percentages m_f * W_f / 2V add up to one.

use super::exposure::{FactorExposureMatrix, Portfolio, ensure_unique};
use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Factor risk decomposer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRiskConfig {
    /// Largest accepted |F_ij - F_ji| (default: 1e-10)
    pub symmetry_tolerance: f64,

    /// Variances with |V| at or below this are treated as zero (default: 0.0)
    pub variance_tolerance: f64,
}

impl Default for FactorRiskConfig {
    fn default() -> Self {
        Self {
            symmetry_tolerance: 1e-10,
            variance_tolerance: 0.0,
        }
    }
}

/// One factor's share of portfolio variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    /// Factor name
    pub factor: String,

    /// Portfolio exposure to the factor (W_f)
    pub exposure: f64,

    /// Marginal contribution, dV/dW_f
    pub marginal: f64,

    /// Contribution to 2V (marginal * exposure)
    pub contribution: f64,

    /// Fraction of variance attributed to the factor
    pub pct: f64,
}

/// Factor risk of one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRiskResult {
    /// Portfolio factor variance V
    pub portfolio_variance: f64,

    /// Portfolio factor volatility sqrt(V)
    pub portfolio_std: f64,

    /// Fraction of variance per factor; sums to 1
    pub per_factor_pct: BTreeMap<String, f64>,

    /// Per-factor detail, in covariance factor order
    pub contributions: Vec<FactorContribution>,
}

impl FactorRiskResult {
    /// Sum of the percentage contributions (1.0 up to rounding).
    pub fn total_pct(&self) -> f64 {
        self.contributions.iter().map(|c| c.pct).sum()
    }

    /// Factor with the largest share of variance.
    pub fn dominant_factor(&self) -> Option<&FactorContribution> {
        self.contributions
            .iter()
            .max_by(|a, b| a.pct.total_cmp(&b.pct))
    }
}

/// Factor risk decomposer
///
/// Built once per factor covariance matrix and reused across portfolios.
#[derive(Debug, Clone)]
pub struct FactorRiskDecomposer {
    factors: Vec<String>,
    covariance: Array2<f64>,
    config: FactorRiskConfig,
}

impl FactorRiskDecomposer {
    /// Create a decomposer with the default configuration.
    ///
    /// # Arguments
    /// * `factors` - Factor names, in covariance row/column order
    /// * `covariance` - Factor covariance matrix (F x F)
    pub fn new(factors: Vec<String>, covariance: Array2<f64>) -> Result<Self> {
        Self::with_config(factors, covariance, FactorRiskConfig::default())
    }

    /// Create a decomposer with an explicit configuration.
    pub fn with_config(
        factors: Vec<String>,
        covariance: Array2<f64>,
        config: FactorRiskConfig,
    ) -> Result<Self> {
        let (rows, cols) = covariance.dim();
        if rows != cols {
            return Err(RiskError::NotSquare { rows, cols });
        }
        if factors.len() != rows {
            return Err(RiskError::DimensionMismatch {
                what: "factor names",
                expected: rows,
                actual: factors.len(),
            });
        }

        ensure_unique(&factors)?;

        if let Some(((row, col), _)) = covariance.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "factor covariance",
                row,
                col,
            });
        }

        for i in 0..rows {
            for j in (i + 1)..cols {
                let difference = (covariance[[i, j]] - covariance[[j, i]]).abs();
                if difference > config.symmetry_tolerance {
                    return Err(RiskError::Asymmetric {
                        row: i,
                        col: j,
                        difference,
                    });
                }
            }
        }

        Ok(Self {
            factors,
            covariance,
            config,
        })
    }

    /// Factor names in covariance order.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Factor covariance matrix.
    pub const fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Decompose the factor risk of a weighted set of positions.
    ///
    /// # Arguments
    /// * `weights` - Position weights, in exposure row order
    /// * `exposures` - Factor loadings whose columns follow the covariance factors
    pub fn decompose(
        &self,
        weights: &Array1<f64>,
        exposures: &FactorExposureMatrix,
    ) -> Result<FactorRiskResult> {
        if exposures.is_empty() {
            return Err(RiskError::MissingExposures);
        }
        if weights.len() != exposures.positions().len() {
            return Err(RiskError::DimensionMismatch {
                what: "weights",
                expected: exposures.positions().len(),
                actual: weights.len(),
            });
        }
        if let Some(col) = weights.iter().position(|w| !w.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "weights",
                row: 0,
                col,
            });
        }
        self.check_factors(exposures.factors())?;

        let factor_exposure = exposures.loadings().t().dot(weights);
        let cov_times_exposure = self.covariance.dot(&factor_exposure);
        let variance = factor_exposure.dot(&cov_times_exposure);

        if !variance.is_finite() {
            return Err(RiskError::NonFiniteResult("portfolio variance"));
        }
        if variance < -self.config.variance_tolerance {
            return Err(RiskError::NegativeVariance(variance));
        }
        if variance.abs() <= self.config.variance_tolerance {
            return Err(RiskError::ZeroVariance);
        }

        let marginal = cov_times_exposure * 2.0;
        let total = 2.0 * variance;

        let contributions: Vec<FactorContribution> = self
            .factors
            .iter()
            .zip(factor_exposure.iter().zip(marginal.iter()))
            .map(|(factor, (&exposure, &marginal))| {
                let contribution = marginal * exposure;
                FactorContribution {
                    factor: factor.clone(),
                    exposure,
                    marginal,
                    contribution,
                    pct: contribution / total,
                }
            })
            .collect();
        if contributions
            .iter()
            .any(|c| !(c.marginal.is_finite() && c.pct.is_finite()))
        {
            return Err(RiskError::NonFiniteResult("factor contributions"));
        }

        let per_factor_pct = contributions
            .iter()
            .map(|c| (c.factor.clone(), c.pct))
            .collect();

        debug!(
            n_positions = weights.len(),
            n_factors = self.factors.len(),
            variance,
            "decomposed factor risk"
        );

        Ok(FactorRiskResult {
            portfolio_variance: variance,
            portfolio_std: variance.sqrt(),
            per_factor_pct,
            contributions,
        })
    }

    /// Decompose a portfolio, aligning its weights to its exposure rows.
    pub fn decompose_portfolio(&self, portfolio: &Portfolio) -> Result<FactorRiskResult> {
        let exposures = portfolio
            .factor_matrix
            .as_ref()
            .ok_or(RiskError::MissingExposures)?;
        let weights = portfolio.aligned_weights(exposures)?;
        self.decompose(&weights, exposures)
    }

    fn check_factors(&self, factors: &[String]) -> Result<()> {
        if factors.len() != self.factors.len() {
            return Err(RiskError::DimensionMismatch {
                what: "exposure factors",
                expected: self.factors.len(),
                actual: factors.len(),
            });
        }
        if let Some((expected, actual)) = self
            .factors
            .iter()
            .zip(factors)
            .find(|(expected, actual)| expected != actual)
        {
            return Err(RiskError::FactorMismatch(format!(
                "expected factor '{expected}', found '{actual}'"
            )));
        }
        Ok(())
    }
}
