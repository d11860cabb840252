//! VaR result record

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Risk numbers for one confidence level.
///
/// VaR and ES are both loss-positive: a portfolio that lost 3% on its VaR day
/// reports `var = 0.03`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarResult {
    /// Confidence level (e.g. 0.95)
    pub confidence: f64,

    /// Value at Risk
    pub var: f64,

    /// Expected Shortfall: mean loss over the tail set
    pub es: f64,

    /// Time index of the observation that defines VaR
    pub var_day: usize,

    /// Time indices of the tail observations, ascending
    pub tail_indices: Vec<usize>,

    /// Per-asset marginal VaR: portfolio VaR minus VaR without the asset
    pub marginal_var: Vec<f64>,

    /// Per-asset contribution to the P&L on the VaR day
    pub incremental_var: Vec<f64>,
}

impl VarResult {
    /// Number of observations in the tail set.
    pub fn tail_size(&self) -> usize {
        self.tail_indices.len()
    }

    /// Number of assets covered by the attribution vectors.
    pub fn n_assets(&self) -> usize {
        self.marginal_var.len()
    }

    /// Sum of incremental VaR; equals the portfolio P&L on the VaR day.
    pub fn incremental_total(&self) -> f64 {
        self.incremental_var.iter().sum()
    }

    /// Asset indices ranked by marginal VaR, largest risk adders first.
    ///
    /// Returns at most `n` indices.
    pub fn top_contributors(&self, n: usize) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.marginal_var.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.marginal_var[b]
                .partial_cmp(&self.marginal_var[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        ranked.truncate(n);
        ranked
    }

    /// Asset indices whose removal would increase VaR.
    pub fn diversifiers(&self) -> Vec<usize> {
        self.marginal_var
            .iter()
            .enumerate()
            .filter(|&(_, &mv)| mv < 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

impl fmt::Display for VarResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VaR({:.1}%): {:.6}, ES: {:.6} (VaR day {}, {} tail observations)",
            self.confidence * 100.0,
            self.var,
            self.es,
            self.var_day,
            self.tail_size()
        )
    }
}
