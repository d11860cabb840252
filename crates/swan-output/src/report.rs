//! Structured risk reports.
//!
//! A report bundles every number computed for one portfolio into a single
//! timestamped JSON document. Downstream consumers such as explanation
//! layers receive it as context and must treat the numbers as read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use swan_risk::{FactorRiskResult, VarResult};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report has no risk results.
    #[error("Report for {0} has no VaR or factor risk results")]
    Empty(String),
}

/// Risk report for one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Portfolio name.
    pub portfolio: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Asset labels in return-matrix column order.
    pub assets: Vec<String>,

    /// Historical VaR results, one per confidence level.
    pub var: Vec<VarResult>,

    /// Factor risk decomposition, if computed.
    pub factor_risk: Option<FactorRiskResult>,
}

impl RiskReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// VaR result for a confidence level, if present.
    pub fn var_at(&self, confidence: f64) -> Option<&VarResult> {
        self.var
            .iter()
            .find(|r| (r.confidence - confidence).abs() < 1e-12)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct RiskReportBuilder {
    portfolio: Option<String>,
    assets: Vec<String>,
    var: Vec<VarResult>,
    factor_risk: Option<FactorRiskResult>,
}

impl RiskReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the portfolio name.
    pub fn portfolio(mut self, portfolio: impl Into<String>) -> Self {
        self.portfolio = Some(portfolio.into());
        self
    }

    /// Set the asset labels.
    pub fn assets(mut self, assets: Vec<String>) -> Self {
        self.assets = assets;
        self
    }

    /// Add VaR results.
    pub fn var_results(mut self, results: impl IntoIterator<Item = VarResult>) -> Self {
        self.var.extend(results);
        self
    }

    /// Set the factor risk decomposition.
    pub fn factor_risk(mut self, result: FactorRiskResult) -> Self {
        self.factor_risk = Some(result);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<RiskReport, ReportError> {
        let portfolio = self.portfolio.unwrap_or_default();
        if self.var.is_empty() && self.factor_risk.is_none() {
            return Err(ReportError::Empty(portfolio));
        }

        Ok(RiskReport {
            portfolio,
            timestamp: Utc::now(),
            assets: self.assets,
            var: self.var,
            factor_risk: self.factor_risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use swan_risk::HistoricalVarEngine;

    fn var_result(confidence: f64) -> VarResult {
        VarResult {
            confidence,
            var: 0.02,
            es: 0.025,
            var_day: 3,
            tail_indices: vec![3],
            marginal_var: vec![0.02],
            incremental_var: vec![-0.02],
        }
    }

    #[test]
    fn test_report_builder() {
        let report = RiskReportBuilder::new()
            .portfolio("Core")
            .assets(vec!["SPY".to_string()])
            .var_results([var_result(0.95), var_result(0.99)])
            .build()
            .unwrap();

        assert_eq!(report.portfolio, "Core");
        assert_eq!(report.var.len(), 2);
        assert!(report.var_at(0.99).is_some());
        assert!(report.var_at(0.975).is_none());
        assert!(report.factor_risk.is_none());
    }

    #[test]
    fn test_empty_report_rejected() {
        let err = RiskReportBuilder::new().portfolio("Core").build().unwrap_err();
        assert!(matches!(err, ReportError::Empty(name) if name == "Core"));
    }

    #[test]
    fn test_report_json_preserves_numbers() {
        let report = RiskReportBuilder::new()
            .portfolio("Core")
            .var_results([var_result(0.95)])
            .build()
            .unwrap();

        let parsed = RiskReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed.var, report.var);
        assert_eq!(parsed.timestamp, report.timestamp);
    }

    #[test]
    fn test_report_json_preserves_engine_output_bits() {
        let returns = array![
            [0.0123456789, -0.0098765432, 0.0031415926],
            [-0.0271828182, 0.0141421356, -0.0017320508],
            [0.0066260701, -0.0022360679, 0.0057721566],
            [-0.0161803398, 0.0029979245, -0.0046692016],
            [0.0011235813, -0.0137035999, 0.0083144626],
        ];
        let engine =
            HistoricalVarEngine::new(returns, array![0.37, 0.41, 0.22]).unwrap();
        let results = engine.compute_risk(&[0.6, 0.8]).unwrap();

        let report = RiskReportBuilder::new()
            .portfolio("Core")
            .var_results(results.clone())
            .build()
            .unwrap();
        let parsed = RiskReport::from_json(&report.to_json().unwrap()).unwrap();

        for (before, after) in results.iter().zip(&parsed.var) {
            assert_eq!(before.var.to_bits(), after.var.to_bits());
            assert_eq!(before.es.to_bits(), after.es.to_bits());
            for (a, b) in before.marginal_var.iter().zip(&after.marginal_var) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
            for (a, b) in before.incremental_var.iter().zip(&after.incremental_var) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn test_write_to_file() {
        let report = RiskReportBuilder::new()
            .portfolio("Core")
            .var_results([var_result(0.95)])
            .build()
            .unwrap();
        let path = std::env::temp_dir().join("swan_report_test.json");
        report.write_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(RiskReport::from_json(&content).unwrap().var, report.var);
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() {
        let report = RiskReportBuilder::new()
            .portfolio("Core")
            .var_results([var_result(0.95)])
            .build()
            .unwrap();
        let path = std::env::temp_dir()
            .join("swan_missing_dir_for_report")
            .join("report.json");
        let err = report.write_to_file(&path).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
