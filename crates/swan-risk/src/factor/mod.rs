//! Factor risk
//!
//! Attributes portfolio variance under a factor covariance model to the
//! individual factors via Euler decomposition.

pub mod decomposer;
pub mod exposure;

pub use decomposer::{FactorContribution, FactorRiskConfig, FactorRiskDecomposer, FactorRiskResult};
pub use exposure::{FactorExposureMatrix, Portfolio};
