//! Swan CLI binary.
//!
//! Provides a command-line interface for historical VaR attribution and
//! factor risk decomposition over CSV inputs.

mod input;

use clap::{Parser, Subcommand, ValueEnum};
use input::{align_weights, equal_weights, read_covariance, read_matrix, read_weights};
use std::path::{Path, PathBuf};
use std::process;
use swan::output::{
    ExportFormat, Exporter, FactorRiskExport, FactorRiskSummary, RiskReportBuilder, VarExport,
    VarSummary,
};
use swan::risk::returns::simple_returns;
use swan::risk::{
    FactorExposureMatrix, FactorRiskDecomposer, HistoricalVarConfig, HistoricalVarEngine,
    Portfolio, ZeroTailPolicy,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swan")]
#[command(about = "Swan: portfolio risk decomposition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Historical VaR, ES and per-asset attribution
    Var {
        /// Return matrix CSV (dates x assets)
        #[arg(long, conflicts_with = "prices", required_unless_present = "prices")]
        returns: Option<PathBuf>,

        /// Price matrix CSV, converted to simple returns
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Weights CSV (id,weight); equal weights if omitted
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Confidence level (repeatable)
        #[arg(short, long = "confidence", default_values_t = [0.95, 0.99])]
        confidence: Vec<f64>,

        /// Handling of confidence levels that leave an empty tail
        #[arg(long, value_enum, default_value = "reject")]
        zero_tail: ZeroTailArg,

        /// Run leave-one-out selections in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of top contributors to show
        #[arg(long, default_value = "5")]
        top: usize,

        /// Portfolio name used in reports
        #[arg(long, default_value = "portfolio")]
        name: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Euler decomposition of factor variance
    FactorRisk {
        /// Factor covariance CSV (factors x factors)
        #[arg(long)]
        covariance: PathBuf,

        /// Exposure CSV (positions x factors)
        #[arg(long)]
        exposures: PathBuf,

        /// Weights CSV (id,weight)
        #[arg(long)]
        weights: PathBuf,

        /// Portfolio name used in reports
        #[arg(long, default_value = "portfolio")]
        name: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZeroTailArg {
    Reject,
    Worst,
}

impl From<ZeroTailArg> for ZeroTailPolicy {
    fn from(arg: ZeroTailArg) -> Self {
        match arg {
            ZeroTailArg::Reject => Self::Reject,
            ZeroTailArg::Worst => Self::WorstObservation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Var {
            returns,
            prices,
            weights,
            confidence,
            zero_tail,
            parallel,
            top,
            name,
            format,
        } => {
            let config = HistoricalVarConfig {
                zero_tail: zero_tail.into(),
                parallel,
            };
            run_var(
                returns.as_deref(),
                prices.as_deref(),
                weights.as_deref(),
                &confidence,
                config,
                top,
                &name,
                format,
            )?;
        }
        Commands::FactorRisk {
            covariance,
            exposures,
            weights,
            name,
            format,
        } => {
            run_factor_risk(&covariance, &exposures, &weights, &name, format)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_var(
    returns: Option<&Path>,
    prices: Option<&Path>,
    weights: Option<&Path>,
    confidence: &[f64],
    config: HistoricalVarConfig,
    top: usize,
    name: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (assets, returns) = match (returns, prices) {
        (Some(path), _) => {
            let matrix = read_matrix(path)?;
            (matrix.columns, matrix.values)
        }
        (None, Some(path)) => {
            let matrix = read_matrix(path)?;
            (matrix.columns, simple_returns(&matrix.values)?)
        }
        (None, None) => return Err("either --returns or --prices is required".into()),
    };

    let weights = match weights {
        Some(path) => align_weights(&read_weights(path)?, &assets)?,
        None => equal_weights(assets.len()),
    };

    info!(
        periods = returns.nrows(),
        assets = assets.len(),
        levels = confidence.len(),
        "Computing historical VaR"
    );
    let engine = HistoricalVarEngine::with_config(returns, weights, config)?;
    let results = engine.compute_risk(confidence)?;

    match format {
        OutputFormat::Text => {
            for result in &results {
                let summary = VarSummary::new(name.to_string(), result, &assets, top);
                println!("{}", summary.to_ascii_table());
            }
        }
        OutputFormat::Json => {
            let report = RiskReportBuilder::new()
                .portfolio(name)
                .assets(assets)
                .var_results(results)
                .build()?;
            println!("{}", report.to_json()?);
        }
        OutputFormat::Csv => {
            let export = VarExport::new(name.to_string(), assets, results);
            print!("{}", export.export_to_string(ExportFormat::Csv)?);
        }
    }

    Ok(())
}

fn run_factor_risk(
    covariance: &Path,
    exposures: &Path,
    weights: &Path,
    name: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let covariance = read_covariance(covariance)?;
    let exposures = read_matrix(exposures)?;

    let decomposer = FactorRiskDecomposer::new(covariance.columns, covariance.values)?;
    let factor_matrix =
        FactorExposureMatrix::new(exposures.rows, exposures.columns, exposures.values)?;
    let portfolio =
        Portfolio::new(name, read_weights(weights)?).with_factor_matrix(factor_matrix);

    info!(
        positions = portfolio.weights.len(),
        factors = decomposer.factors().len(),
        "Decomposing factor risk"
    );
    let result = decomposer.decompose_portfolio(&portfolio)?;

    match format {
        OutputFormat::Text => {
            let summary = FactorRiskSummary::new(name.to_string(), &result);
            println!("{}", summary.to_ascii_table());
        }
        OutputFormat::Json => {
            let report = RiskReportBuilder::new()
                .portfolio(name)
                .factor_risk(result)
                .build()?;
            println!("{}", report.to_json()?);
        }
        OutputFormat::Csv => {
            let export = FactorRiskExport::new(name.to_string(), result);
            print!("{}", export.export_to_string(ExportFormat::Csv)?);
        }
    }

    Ok(())
}
