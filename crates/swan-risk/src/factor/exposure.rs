//! Factor exposure inputs
//!
//! A labelled matrix of factor loadings (positions x factors) and the
//! portfolio that owns it.

use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2};
use std::collections::{HashMap, HashSet};

/// Factor loadings for a set of positions.
///
/// Rows are positions, columns are factors. Both label sets are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorExposureMatrix {
    positions: Vec<String>,
    factors: Vec<String>,
    loadings: Array2<f64>,
}

impl FactorExposureMatrix {
    /// Create an exposure matrix.
    ///
    /// # Arguments
    /// * `positions` - Position identifiers, one per row
    /// * `factors` - Factor names, one per column
    /// * `loadings` - Factor loadings (positions x factors)
    pub fn new(positions: Vec<String>, factors: Vec<String>, loadings: Array2<f64>) -> Result<Self> {
        let (rows, cols) = loadings.dim();
        if positions.len() != rows {
            return Err(RiskError::DimensionMismatch {
                what: "exposure rows",
                expected: rows,
                actual: positions.len(),
            });
        }
        if factors.len() != cols {
            return Err(RiskError::DimensionMismatch {
                what: "exposure columns",
                expected: cols,
                actual: factors.len(),
            });
        }
        ensure_unique(&positions)?;
        ensure_unique(&factors)?;
        if let Some(((row, col), _)) = loadings.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(RiskError::NonFiniteValue {
                what: "factor exposures",
                row,
                col,
            });
        }

        Ok(Self {
            positions,
            factors,
            loadings,
        })
    }

    /// Position identifiers in row order.
    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Factor names in column order.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Loadings (positions x factors).
    pub const fn loadings(&self) -> &Array2<f64> {
        &self.loadings
    }

    /// Whether the matrix has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.loadings.is_empty()
    }
}

/// A portfolio: named position weights plus, once enriched, factor loadings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    /// Portfolio name
    pub name: String,
    /// Weight per position identifier
    pub weights: HashMap<String, f64>,
    /// Factor loadings for the positions, if available
    pub factor_matrix: Option<FactorExposureMatrix>,
}

impl Portfolio {
    /// Create a portfolio without factor loadings.
    pub fn new(name: impl Into<String>, weights: HashMap<String, f64>) -> Self {
        Self {
            name: name.into(),
            weights,
            factor_matrix: None,
        }
    }

    /// Attach factor loadings.
    pub fn with_factor_matrix(mut self, factor_matrix: FactorExposureMatrix) -> Self {
        self.factor_matrix = Some(factor_matrix);
        self
    }

    /// Weights ordered like the rows of `exposures`.
    pub fn aligned_weights(&self, exposures: &FactorExposureMatrix) -> Result<Array1<f64>> {
        exposures
            .positions()
            .iter()
            .map(|position| {
                self.weights
                    .get(position)
                    .copied()
                    .ok_or_else(|| RiskError::UnknownPosition(position.clone()))
            })
            .collect()
    }
}

pub(crate) fn ensure_unique(labels: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(RiskError::DuplicateLabel(label.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exposure_matrix_dimensions() {
        let err = FactorExposureMatrix::new(
            names(&["AAPL"]),
            names(&["market", "size"]),
            array![[1.0, 0.2], [0.9, -0.1]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RiskError::DimensionMismatch {
                what: "exposure rows",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_factor() {
        let err = FactorExposureMatrix::new(
            names(&["AAPL"]),
            names(&["market", "market"]),
            array![[1.0, 0.2]],
        )
        .unwrap_err();
        assert_eq!(err, RiskError::DuplicateLabel("market".to_string()));
    }

    #[test]
    fn test_aligned_weights_follow_row_order() {
        let exposures = FactorExposureMatrix::new(
            names(&["MSFT", "AAPL"]),
            names(&["market"]),
            array![[1.1], [0.9]],
        )
        .unwrap();
        let weights = HashMap::from([("AAPL".to_string(), 0.7), ("MSFT".to_string(), 0.3)]);
        let portfolio = Portfolio::new("core", weights);

        let aligned = portfolio.aligned_weights(&exposures).unwrap();
        assert_eq!(aligned, array![0.3, 0.7]);
    }

    #[test]
    fn test_aligned_weights_unknown_position() {
        let exposures =
            FactorExposureMatrix::new(names(&["TSLA"]), names(&["market"]), array![[1.5]]).unwrap();
        let portfolio = Portfolio::new("core", HashMap::from([("AAPL".to_string(), 1.0)]));

        let err = portfolio.aligned_weights(&exposures).unwrap_err();
        assert_eq!(err, RiskError::UnknownPosition("TSLA".to_string()));
    }
}
