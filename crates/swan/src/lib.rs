#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/purple-swan/swan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export sub-crates
pub use swan_output as output;
pub use swan_risk as risk;

// Re-export common risk types
pub use swan_risk::{
    FactorExposureMatrix, FactorRiskDecomposer, FactorRiskResult, HistoricalVarEngine, Portfolio,
    RiskError, VarResult,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
