//! Historical simulation risk
//!
//! Computes Value at Risk, Expected Shortfall and per-asset VaR attribution
//! directly from a matrix of historical returns, without any distributional
//! assumption.

pub mod engine;
pub mod result;
pub mod selection;

pub use engine::{HistoricalVarConfig, HistoricalVarEngine, ZeroTailPolicy};
pub use result::VarResult;
pub use selection::{TailSelection, order_statistic, select_tail, tail_size};
