//! Export functionality for Swan risk results.
//!
//! This module provides CSV and JSON export for VaR attribution and factor
//! risk decomposition.

use crate::summary::asset_label;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use swan_risk::{FactorRiskResult, VarResult};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// VaR results for one portfolio, with asset labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VarExport {
    /// Portfolio name.
    pub portfolio: String,

    /// Asset labels in column order.
    pub assets: Vec<String>,

    /// One result per confidence level.
    pub results: Vec<VarResult>,
}

impl VarExport {
    /// Create a new VaR export.
    pub const fn new(portfolio: String, assets: Vec<String>, results: Vec<VarResult>) -> Self {
        Self {
            portfolio,
            assets,
            results,
        }
    }

    /// One row per (confidence level, asset).
    fn to_flat_records(&self) -> Vec<VarAttributionFlat> {
        self.results
            .iter()
            .flat_map(|result| {
                (0..result.n_assets()).map(move |i| VarAttributionFlat {
                    portfolio: self.portfolio.clone(),
                    confidence: result.confidence,
                    var: result.var,
                    es: result.es,
                    asset: asset_label(&self.assets, i),
                    marginal_var: result.marginal_var[i],
                    incremental_var: result.incremental_var[i],
                })
            })
            .collect()
    }
}

/// Flattened VaR attribution for CSV export.
#[derive(Debug, Serialize, Deserialize)]
struct VarAttributionFlat {
    portfolio: String,
    confidence: f64,
    var: f64,
    es: f64,
    asset: String,
    marginal_var: f64,
    incremental_var: f64,
}

/// Factor risk decomposition for one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorRiskExport {
    /// Portfolio name.
    pub portfolio: String,

    /// Decomposition result.
    pub result: FactorRiskResult,
}

impl FactorRiskExport {
    /// Create a new factor risk export.
    pub const fn new(portfolio: String, result: FactorRiskResult) -> Self {
        Self { portfolio, result }
    }

    fn to_flat_records(&self) -> Vec<FactorRiskFlat> {
        self.result
            .contributions
            .iter()
            .map(|c| FactorRiskFlat {
                portfolio: self.portfolio.clone(),
                factor: c.factor.clone(),
                exposure: c.exposure,
                marginal: c.marginal,
                contribution: c.contribution,
                pct: c.pct,
            })
            .collect()
    }
}

/// Flattened factor contribution for CSV export.
#[derive(Debug, Serialize, Deserialize)]
struct FactorRiskFlat {
    portfolio: String,
    factor: String,
    exposure: f64,
    marginal: f64,
    contribution: f64,
    pct: f64,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn write_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

impl Exporter for VarExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&self.to_flat_records()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for FactorRiskExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&self.to_flat_records()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
