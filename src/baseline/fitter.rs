//! Baseline fitting from normal-period data.

use ndarray::{Array1, Array2};
use thiserror::Error;
use tracing::debug;

use super::solve::solve_with_ridge;
use super::types::{ConditionalModel, NodeBaseline, TrainingState};
use crate::config::RhtConfig;
use crate::frame::Frame;

/// Training failures
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Node {node} has {got} valid observations, need at least {need}")]
    InsufficientData {
        node: String,
        got: usize,
        need: usize,
    },

    #[error("Training data is missing a column for node {node}")]
    MissingColumn { node: String },
}

/// Fit a baseline for every graph node from normal-period data.
///
/// Nodes are processed in topological order. A row counts as a valid
/// observation for a node only when the node's value and all of its parents'
/// values are finite on that row.
pub fn fit(config: &RhtConfig, data: &Frame) -> Result<TrainingState, TrainingError> {
    let graph = &config.graph;
    let mut baselines: Vec<Option<NodeBaseline>> = vec![None; graph.n_nodes()];

    for &idx in graph.topo_order() {
        let name = graph.node_name(idx);
        let column = data
            .column(name)
            .ok_or_else(|| TrainingError::MissingColumn { node: name.into() })?;

        let parents = graph.parents(idx);
        let mut parent_columns = Vec::with_capacity(parents.len());
        for &p in parents {
            let p_name = graph.node_name(p);
            let col = data.column(p_name).ok_or_else(|| TrainingError::MissingColumn {
                node: p_name.into(),
            })?;
            parent_columns.push(col);
        }

        // Rows where the node and every parent are observed.
        let mut y = Vec::new();
        let mut x_rows: Vec<Vec<f64>> = Vec::new();
        for row in 0..data.n_rows() {
            let v = column[row];
            if !v.is_finite() {
                continue;
            }
            let parent_vals: Vec<f64> = parent_columns.iter().map(|c| c[row]).collect();
            if parent_vals.iter().any(|p| !p.is_finite()) {
                continue;
            }
            y.push(v);
            x_rows.push(parent_vals);
        }

        if y.len() < config.min_samples {
            return Err(TrainingError::InsufficientData {
                node: name.into(),
                got: y.len(),
                need: config.min_samples,
            });
        }

        let (value_mean, value_std) = mean_std(&y);

        let (model, residuals) = if parents.is_empty() {
            let residuals: Vec<f64> = y.iter().map(|v| v - value_mean).collect();
            (ConditionalModel::Identity { mean: value_mean }, residuals)
        } else {
            fit_linear(parents, &x_rows, &y)
        };

        let (residual_mean, residual_std) = mean_std(&residuals);
        let mut sorted_residuals = residuals;
        sorted_residuals
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            node = name,
            n_samples = y.len(),
            model = ?model.kind(),
            residual_std,
            "fitted baseline"
        );

        baselines[idx] = Some(NodeBaseline {
            model,
            residual_mean,
            residual_std,
            residuals: sorted_residuals,
            value_mean,
            value_std,
            n_samples: y.len(),
        });
    }

    // Topological order covers every node, so all slots are filled.
    let baselines = baselines.into_iter().flatten().collect();
    Ok(TrainingState::new(baselines))
}

/// Ordinary least squares of `y` on the parent rows, with intercept.
fn fit_linear(
    parents: &[usize],
    x_rows: &[Vec<f64>],
    y: &[f64],
) -> (ConditionalModel, Vec<f64>) {
    let n = y.len();
    let k = parents.len() + 1; // intercept first

    let mut x = Array2::zeros((n, k));
    for (r, row) in x_rows.iter().enumerate() {
        x[[r, 0]] = 1.0;
        for (c, &v) in row.iter().enumerate() {
            x[[r, c + 1]] = v;
        }
    }
    let y_vec = Array1::from_iter(y.iter().copied());

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y_vec);
    let beta = solve_with_ridge(&xtx, &xty);

    let predictions = x.dot(&beta);
    let residuals: Vec<f64> = y_vec
        .iter()
        .zip(predictions.iter())
        .map(|(obs, pred)| obs - pred)
        .collect();

    let model = ConditionalModel::Linear {
        intercept: beta[0],
        parents: parents.to_vec(),
        coefficients: beta.iter().skip(1).copied().collect(),
    };
    (model, residuals)
}

/// Mean and sample standard deviation (ddof = 1; zero below two samples).
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}
