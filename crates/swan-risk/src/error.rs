//! Error types for risk computations.

use thiserror::Error;

/// Result type for risk computations.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Broad class of a [`RiskError`].
///
/// Callers usually branch on the class rather than the exact variant: an
/// invalid input is a bug upstream, a degenerate result may legitimately mean
/// "zero risk", and numerical instability points at the covariance model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or inconsistent inputs.
    InvalidInput,
    /// Well-formed inputs whose risk measure is undefined.
    DegenerateResult,
    /// Inputs that violate a numerical precondition (e.g. PSD covariance).
    NumericalInstability,
}

/// Errors that can occur during risk computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// The return matrix has no observations
    #[error("Empty time series: at least one observation is required")]
    EmptySeries,

    /// The return matrix has no asset columns
    #[error("No assets: the return matrix has zero columns")]
    NoAssets,

    /// Dimension mismatch between two inputs
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input was inconsistent
        what: &'static str,
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// A NaN or infinite value was found
    #[error("Non-finite value in {what} at row {row}, column {col}")]
    NonFiniteValue {
        /// Which input held the value
        what: &'static str,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },

    /// Confidence level outside the open interval (0, 1)
    #[error("Invalid confidence level: {0} (must be strictly between 0 and 1)")]
    InvalidConfidence(f64),

    /// No factor exposure matrix was supplied, or it is empty
    #[error("Factor exposure matrix is missing or empty")]
    MissingExposures,

    /// Exposure factors do not line up with the covariance factors
    #[error("Factor mismatch: {0}")]
    FactorMismatch(String),

    /// A row or column label appears more than once
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// A position in the exposure matrix has no portfolio weight
    #[error("Unknown position: {0} has no weight in the portfolio")]
    UnknownPosition(String),

    /// Covariance matrix is not square
    #[error("Covariance matrix is not square: {rows} x {cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Covariance matrix is not symmetric
    #[error("Covariance matrix is not symmetric at ({row}, {col}): difference {difference:e}")]
    Asymmetric {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Absolute difference between the mirrored cells
        difference: f64,
    },

    /// Price is non-finite or non-positive
    #[error("Invalid price {price} at row {row}, column {col}")]
    InvalidPrice {
        /// Offending price
        price: f64,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },

    /// Not enough observations for the requested transformation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Confidence level leaves no observations in the tail
    #[error("Empty tail at confidence {confidence}: no observations beyond VaR with {periods} periods")]
    EmptyTail {
        /// Confidence level that produced k = 0
        confidence: f64,
        /// Length of the time series
        periods: usize,
    },

    /// Portfolio factor variance is zero, so percentages are undefined
    #[error("Zero portfolio variance: risk contributions are undefined")]
    ZeroVariance,

    /// Portfolio factor variance is negative
    #[error("Negative portfolio variance {0:e}: covariance matrix is not positive semi-definite")]
    NegativeVariance(f64),

    /// A derived quantity overflowed to NaN or infinity
    #[error("Non-finite result: {0} overflowed")]
    NonFiniteResult(&'static str),
}

impl RiskError {
    /// Taxonomy class of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTail { .. } | Self::ZeroVariance => ErrorKind::DegenerateResult,
            Self::NegativeVariance(_) | Self::NonFiniteResult(_) => {
                ErrorKind::NumericalInstability
            }
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Whether the caller may reasonably treat this error as "zero risk".
    pub const fn is_degenerate(&self) -> bool {
        matches!(self.kind(), ErrorKind::DegenerateResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RiskError::EmptySeries.kind(), ErrorKind::InvalidInput);
        assert_eq!(RiskError::InvalidConfidence(1.5).kind(), ErrorKind::InvalidInput);
        assert_eq!(RiskError::MissingExposures.kind(), ErrorKind::InvalidInput);
        assert_eq!(RiskError::ZeroVariance.kind(), ErrorKind::DegenerateResult);
        assert_eq!(
            RiskError::EmptyTail {
                confidence: 0.99,
                periods: 50
            }
            .kind(),
            ErrorKind::DegenerateResult
        );
        assert_eq!(
            RiskError::NegativeVariance(-0.1).kind(),
            ErrorKind::NumericalInstability
        );
        assert_eq!(
            RiskError::NonFiniteResult("portfolio variance").kind(),
            ErrorKind::NumericalInstability
        );
    }

    #[test]
    fn test_error_display() {
        let err = RiskError::DimensionMismatch {
            what: "weights",
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch for weights: expected 3, got 2"
        );
        assert!(RiskError::ZeroVariance.is_degenerate());
        assert!(!RiskError::NoAssets.is_degenerate());
    }
}
