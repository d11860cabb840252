//! Human-readable risk summaries.
//!
//! Turns raw VaR and factor risk results into labelled summaries with
//! text, ASCII table and Markdown renderings for reporting.

use serde::{Deserialize, Serialize};
use std::fmt;
use swan_risk::factor::FactorContribution;
use swan_risk::{FactorRiskResult, VarResult};

/// Label for asset `index`, falling back to a positional name.
pub fn asset_label(assets: &[String], index: usize) -> String {
    assets
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("asset_{index}"))
}

/// One asset's share of portfolio VaR.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRiskContribution {
    /// Asset identifier.
    pub asset: String,

    /// Portfolio VaR minus VaR without this asset.
    pub marginal_var: f64,

    /// Asset P&L on the VaR day.
    pub incremental_var: f64,
}

impl fmt::Display for AssetRiskContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: marginal {:.6}, incremental {:.6}",
            self.asset, self.marginal_var, self.incremental_var
        )
    }
}

/// Summary of one VaR result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VarSummary {
    /// Portfolio name.
    pub name: String,

    /// Confidence level.
    pub confidence: f64,

    /// Value at Risk (loss-positive).
    pub var: f64,

    /// Expected Shortfall (loss-positive).
    pub es: f64,

    /// Time index of the VaR day.
    pub var_day: usize,

    /// Number of tail observations.
    pub tail_size: usize,

    /// Assets adding the most risk, largest marginal VaR first.
    pub top_contributors: Vec<AssetRiskContribution>,

    /// Number of assets whose removal would raise VaR.
    pub diversifier_count: usize,
}

impl VarSummary {
    /// Build a summary from a VaR result.
    ///
    /// # Arguments
    ///
    /// * `name` - Portfolio name
    /// * `result` - VaR result to summarise
    /// * `assets` - Asset labels in column order (missing labels become `asset_<i>`)
    /// * `top_n` - Number of top contributors to keep
    pub fn new(name: String, result: &VarResult, assets: &[String], top_n: usize) -> Self {
        let top_contributors = result
            .top_contributors(top_n)
            .into_iter()
            .map(|i| AssetRiskContribution {
                asset: asset_label(assets, i),
                marginal_var: result.marginal_var[i],
                incremental_var: result.incremental_var[i],
            })
            .collect();

        Self {
            name,
            confidence: result.confidence,
            var: result.var,
            es: result.es,
            var_day: result.var_day,
            tail_size: result.tail_size(),
            top_contributors,
            diversifier_count: result.diversifiers().len(),
        }
    }

    /// Render as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} - VaR {:.1}%\n",
            self.name,
            self.confidence * 100.0
        ));
        output.push_str(&format!("{:-<60}\n", ""));
        output.push_str(&format!("{:<30} {:>14.6}\n", "Value at Risk", self.var));
        output.push_str(&format!("{:<30} {:>14.6}\n", "Expected Shortfall", self.es));
        output.push_str(&format!("{:<30} {:>14}\n", "VaR day", self.var_day));
        output.push_str(&format!("{:<30} {:>14}\n", "Tail observations", self.tail_size));
        output.push_str(&format!("{:<30} {:>14}\n", "Diversifiers", self.diversifier_count));
        output.push_str(&format!("{:-<60}\n", ""));
        output.push_str(&format!(
            "{:<20} {:>18} {:>18}\n",
            "Asset", "Marginal VaR", "Incremental VaR"
        ));
        for contribution in &self.top_contributors {
            output.push_str(&format!(
                "{:<20} {:>18.6} {:>18.6}\n",
                contribution.asset, contribution.marginal_var, contribution.incremental_var
            ));
        }
        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "# {} VaR ({:.1}%)\n\n",
            self.name,
            self.confidence * 100.0
        ));
        output.push_str("| Metric | Value |\n|---|---|\n");
        output.push_str(&format!("| Value at Risk | {:.6} |\n", self.var));
        output.push_str(&format!("| Expected Shortfall | {:.6} |\n", self.es));
        output.push_str(&format!("| VaR day | {} |\n", self.var_day));
        output.push_str(&format!("| Tail observations | {} |\n\n", self.tail_size));
        output.push_str("## Top Contributors\n\n");
        output.push_str("| Asset | Marginal VaR | Incremental VaR |\n|---|---|---|\n");
        for contribution in &self.top_contributors {
            output.push_str(&format!(
                "| {} | {:.6} | {:.6} |\n",
                contribution.asset, contribution.marginal_var, contribution.incremental_var
            ));
        }
        output
    }
}

impl fmt::Display for VarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: VaR({:.1}%) {:.4}%, ES {:.4}%",
            self.name,
            self.confidence * 100.0,
            self.var * 100.0,
            self.es * 100.0
        )
    }
}

/// Summary of a factor risk decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorRiskSummary {
    /// Portfolio name.
    pub name: String,

    /// Portfolio factor variance.
    pub variance: f64,

    /// Portfolio factor volatility.
    pub volatility: f64,

    /// Factor contributions, largest share first.
    pub factors: Vec<FactorContribution>,
}

impl FactorRiskSummary {
    /// Build a summary from a factor risk result.
    pub fn new(name: String, result: &FactorRiskResult) -> Self {
        let mut factors = result.contributions.clone();
        factors.sort_by(|a, b| b.pct.total_cmp(&a.pct));

        Self {
            name,
            variance: result.portfolio_variance,
            volatility: result.portfolio_std,
            factors,
        }
    }

    /// Render as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} - Factor Risk\n", self.name));
        output.push_str(&format!("{:-<60}\n", ""));
        output.push_str(&format!("{:<30} {:>14.6}\n", "Variance", self.variance));
        output.push_str(&format!("{:<30} {:>14.6}\n", "Volatility", self.volatility));
        output.push_str(&format!("{:-<60}\n", ""));
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>12}\n",
            "Factor", "Exposure", "Marginal", "Share"
        ));
        for factor in &self.factors {
            output.push_str(&format!(
                "{:<20} {:>12.4} {:>12.6} {:>11.2}%\n",
                factor.factor,
                factor.exposure,
                factor.marginal,
                factor.pct * 100.0
            ));
        }
        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {} Factor Risk\n\n", self.name));
        output.push_str(&format!(
            "Variance: {:.6}, volatility: {:.4}%\n\n",
            self.variance,
            self.volatility * 100.0
        ));
        output.push_str("| Factor | Exposure | Share of Variance |\n|---|---|---|\n");
        for factor in &self.factors {
            output.push_str(&format!(
                "| {} | {:.4} | {:.2}% |\n",
                factor.factor,
                factor.exposure,
                factor.pct * 100.0
            ));
        }
        output
    }
}

impl fmt::Display for FactorRiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: volatility {:.4}%",
            self.name,
            self.volatility * 100.0
        )?;
        if let Some(top) = self.factors.first() {
            write!(f, ", led by {} ({:.2}%)", top.factor, top.pct * 100.0)?;
        }
        Ok(())
    }
}
