//! Trained-state types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::CausalGraph;

/// Conditional model of a node's value given its parents' values.
#[derive(Clone, Debug)]
pub enum ConditionalModel {
    /// No parents: predicted value is the training mean of the column.
    Identity { mean: f64 },
    /// Linear regression on the parents' simultaneous values.
    ///
    /// `parents` holds the graph node indices the coefficients align with,
    /// in ascending index order.
    Linear {
        intercept: f64,
        parents: Vec<usize>,
        coefficients: Vec<f64>,
    },
}

impl ConditionalModel {
    /// Predict the node's value from parent observations aligned with the
    /// model's parent order. Identity models ignore the input.
    pub fn predict(&self, parent_values: &[f64]) -> f64 {
        match self {
            ConditionalModel::Identity { mean } => *mean,
            ConditionalModel::Linear {
                intercept,
                coefficients,
                ..
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(parent_values)
                        .map(|(c, v)| c * v)
                        .sum::<f64>()
            }
        }
    }

    /// Graph indices of the model's regressors (empty for identity).
    pub fn parent_indices(&self) -> &[usize] {
        match self {
            ConditionalModel::Identity { .. } => &[],
            ConditionalModel::Linear { parents, .. } => parents,
        }
    }

    /// Model family tag.
    pub fn kind(&self) -> ModelKind {
        match self {
            ConditionalModel::Identity { .. } => ModelKind::Identity,
            ConditionalModel::Linear { .. } => ModelKind::Linear,
        }
    }
}

/// Model family, for summary rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Identity,
    Linear,
}

/// Fitted baseline for one node.
#[derive(Clone, Debug)]
pub struct NodeBaseline {
    /// Conditional value predictor.
    pub model: ConditionalModel,
    /// Mean of training residuals (near zero for least-squares fits).
    pub residual_mean: f64,
    /// Sample standard deviation of training residuals.
    pub residual_std: f64,
    /// Training residuals, ascending (empirical sample for the KS test).
    pub residuals: Vec<f64>,
    /// Marginal mean of the raw column over the training rows.
    pub value_mean: f64,
    /// Marginal standard deviation of the raw column.
    pub value_std: f64,
    /// Valid observations the fit used.
    pub n_samples: usize,
}

/// Immutable snapshot of all fitted baselines, indexed by graph node index.
///
/// Replaced wholesale on retrain; diagnosis reads it through an `Arc` so a
/// concurrent retrain can never expose a half-built state.
#[derive(Clone, Debug)]
pub struct TrainingState {
    baselines: Vec<NodeBaseline>,
}

impl TrainingState {
    pub(crate) fn new(baselines: Vec<NodeBaseline>) -> Self {
        Self { baselines }
    }

    /// Baseline for a node index.
    pub fn baseline(&self, idx: usize) -> &NodeBaseline {
        &self.baselines[idx]
    }

    /// Number of fitted nodes.
    pub fn n_nodes(&self) -> usize {
        self.baselines.len()
    }

    /// Per-metric summaries keyed by node name, for stats-table rendering.
    pub fn summaries(&self, graph: &CausalGraph) -> BTreeMap<String, BaselineSummary> {
        self.baselines
            .iter()
            .enumerate()
            .map(|(idx, b)| {
                (
                    graph.node_name(idx).to_string(),
                    BaselineSummary {
                        model: b.model.kind(),
                        value_mean: b.value_mean,
                        value_std: b.value_std,
                        residual_mean: b.residual_mean,
                        residual_std: b.residual_std,
                        n_samples: b.n_samples,
                    },
                )
            })
            .collect()
    }
}

/// Serializable per-node training summary (the dashboard's "stats" row).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub model: ModelKind,
    pub value_mean: f64,
    pub value_std: f64,
    pub residual_mean: f64,
    pub residual_std: f64,
    pub n_samples: usize,
}
