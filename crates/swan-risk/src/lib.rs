#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/purple-swan/swan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod factor;
pub mod historical;
pub mod returns;

// Re-export main types
pub use error::{ErrorKind, Result, RiskError};
pub use factor::{
    FactorExposureMatrix, FactorRiskConfig, FactorRiskDecomposer, FactorRiskResult, Portfolio,
};
pub use historical::{HistoricalVarConfig, HistoricalVarEngine, VarResult, ZeroTailPolicy};
