//! Named-column tabular time series.
//!
//! A [`Frame`] is the in-memory exchange type for normal/abnormal datasets:
//! one row per time step, one column per metric, columns addressed by the
//! metric names used in the causal graph. NaN entries are treated as missing
//! observations by downstream fitting.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

/// Frame construction and access errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Duplicate column name: {name}")]
    DuplicateColumn { name: String },

    #[error("Shape mismatch: {names} column names for {columns} data columns")]
    ShapeMismatch { names: usize, columns: usize },

    #[error("Columns have unequal lengths: expected {expected}, column {name} has {got}")]
    RaggedColumn {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Named-column matrix of `f64` observations.
///
/// Rows are time steps in chronological order; columns are metrics.
#[derive(Debug, Clone)]
pub struct Frame {
    names: Vec<String>,
    index: HashMap<String, usize>,
    data: Array2<f64>,
}

impl Frame {
    /// Create a frame from column names and a row-major data matrix.
    pub fn new(names: Vec<String>, data: Array2<f64>) -> Result<Self, FrameError> {
        if names.len() != data.ncols() {
            return Err(FrameError::ShapeMismatch {
                names: names.len(),
                columns: data.ncols(),
            });
        }
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(FrameError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self { names, index, data })
    }

    /// Create a frame from `(name, values)` columns of equal length.
    pub fn from_columns<S: Into<String>>(
        columns: Vec<(S, Vec<f64>)>,
    ) -> Result<Self, FrameError> {
        let n_rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut flat = Vec::with_capacity(n_rows * columns.len());
        for (name, values) in columns {
            let name = name.into();
            if values.len() != n_rows {
                return Err(FrameError::RaggedColumn {
                    name,
                    expected: n_rows,
                    got: values.len(),
                });
            }
            names.push(name);
            flat.push(values);
        }
        let n_cols = names.len();
        let mut data = Array2::zeros((n_rows, n_cols));
        for (c, values) in flat.iter().enumerate() {
            for (r, &v) in values.iter().enumerate() {
                data[[r, c]] = v;
            }
        }
        Self::new(names, data)
    }

    /// Number of rows (time steps).
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns (metrics).
    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    /// Column names in storage order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// View of a column by name, if present.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.index.get(name).map(|&i| self.data.column(i))
    }
}
