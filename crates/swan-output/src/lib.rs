#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/purple-swan/swan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, FactorRiskExport, VarExport};
pub use report::{ReportError, RiskReport, RiskReportBuilder};
pub use summary::{AssetRiskContribution, FactorRiskSummary, VarSummary, asset_label};
