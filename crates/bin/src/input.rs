//! CSV input loading.
//!
//! Matrices are read from CSV files whose header row holds column labels and
//! whose first column holds row labels (dates, factor names or position
//! identifiers). Weight files hold `id,weight` rows.

use ndarray::{Array1, Array2};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

/// Error type for input loading.
#[derive(Debug, thiserror::Error)]
pub(crate) enum InputError {
    /// CSV parsing error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// File being read.
        path: String,
        /// Underlying error.
        source: csv::Error,
    },
    /// Cell that is not a number.
    #[error("{path}: cannot parse '{value}' at row {row}, column {col}")]
    Parse {
        /// File being read.
        path: String,
        /// Raw cell contents.
        value: String,
        /// Data row (0-based, header excluded).
        row: usize,
        /// Column (0-based, label column excluded).
        col: usize,
    },
    /// Structural problem with the file.
    #[error("{path}: {reason}")]
    Shape {
        /// File being read.
        path: String,
        /// What was wrong.
        reason: String,
    },
    /// An identifier appears more than once.
    #[error("{path}: duplicate id '{id}'")]
    DuplicateId {
        /// File being read.
        path: String,
        /// Repeated identifier.
        id: String,
    },
    /// A required weight is missing.
    #[error("No weight for {0}")]
    MissingWeight(String),
}

/// A matrix with row and column labels.
#[derive(Debug, Clone)]
pub(crate) struct LabeledMatrix {
    /// Labels from the first column.
    pub rows: Vec<String>,
    /// Labels from the header row (label column excluded).
    pub columns: Vec<String>,
    /// Numeric cells.
    pub values: Array2<f64>,
}

/// Read a labelled matrix from a CSV file.
pub(crate) fn read_matrix(path: &Path) -> Result<LabeledMatrix, InputError> {
    let display = path.display().to_string();
    let csv_err = |source: csv::Error| InputError::Csv {
        path: display.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .skip(1)
        .map(|h| h.trim().to_string())
        .collect();
    if columns.is_empty() {
        return Err(InputError::Shape {
            path: display.clone(),
            reason: "header has no data columns".to_string(),
        });
    }

    let mut rows = Vec::new();
    let mut cells = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        if record.len() != columns.len() + 1 {
            return Err(InputError::Shape {
                path: display.clone(),
                reason: format!(
                    "row {row} has {} fields, expected {}",
                    record.len(),
                    columns.len() + 1
                ),
            });
        }
        rows.push(record[0].trim().to_string());
        for (col, raw) in record.iter().skip(1).enumerate() {
            let value = raw.trim().parse::<f64>().map_err(|_| InputError::Parse {
                path: display.clone(),
                value: raw.to_string(),
                row,
                col,
            })?;
            cells.push(value);
        }
    }

    let values =
        Array2::from_shape_vec((rows.len(), columns.len()), cells).map_err(|e| InputError::Shape {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    Ok(LabeledMatrix {
        rows,
        columns,
        values,
    })
}

/// Read `id,weight` rows into a map.
pub(crate) fn read_weights(path: &Path) -> Result<HashMap<String, f64>, InputError> {
    let matrix = read_matrix(path)?;
    if matrix.values.ncols() != 1 {
        return Err(InputError::Shape {
            path: path.display().to_string(),
            reason: format!("expected 1 weight column, found {}", matrix.values.ncols()),
        });
    }

    let mut weights = HashMap::with_capacity(matrix.rows.len());
    for (id, weight) in matrix.rows.into_iter().zip(matrix.values.column(0).iter().copied()) {
        match weights.entry(id) {
            Entry::Occupied(entry) => {
                return Err(InputError::DuplicateId {
                    path: path.display().to_string(),
                    id: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(weight);
            }
        }
    }
    Ok(weights)
}

/// Read a covariance matrix whose row labels repeat its column labels.
pub(crate) fn read_covariance(path: &Path) -> Result<LabeledMatrix, InputError> {
    let matrix = read_matrix(path)?;
    if matrix.rows != matrix.columns {
        return Err(InputError::Shape {
            path: path.display().to_string(),
            reason: format!(
                "row labels {:?} do not match column labels {:?}",
                matrix.rows, matrix.columns
            ),
        });
    }
    Ok(matrix)
}

/// Weights ordered like `labels`.
pub(crate) fn align_weights(
    weights: &HashMap<String, f64>,
    labels: &[String],
) -> Result<Array1<f64>, InputError> {
    labels
        .iter()
        .map(|label| {
            weights
                .get(label)
                .copied()
                .ok_or_else(|| InputError::MissingWeight(label.clone()))
        })
        .collect()
}

/// Equal weights summing to one.
pub(crate) fn equal_weights(n: usize) -> Array1<f64> {
    Array1::from_elem(n, 1.0 / n as f64)
}
