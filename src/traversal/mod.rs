//! Upstream diagnosis walk.
//!
//! Starting at the anomalous target, the walker moves against edge direction
//! toward ancestors, hypothesis-testing every node it reaches. The walk is
//! an explicit work-list (no language recursion) with a per-call memo of
//! node findings, so deep graphs cannot overflow the stack and diamond
//! ancestry is evaluated exactly once.

mod report;
mod walker;


use thiserror::Error;

pub use report::{NodeFinding, RootCauseReport, RootCauseScore};
pub use walker::diagnose;

/// Diagnosis failures
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("Engine has not been trained; call train() first")]
    NotTrained,

    #[error("Unknown node: {node}")]
    UnknownNode { node: String },

    #[error("Abnormal data is missing a column for node {node}")]
    MissingColumn { node: String },

    #[error("Diagnosis visit budget of {budget} nodes exceeded")]
    VisitBudgetExceeded { budget: usize },
}
