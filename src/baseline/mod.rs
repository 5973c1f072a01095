//! Per-node baselines fitted from normal-period data.
//!
//! Training walks the graph in topological order and fits each node a
//! conditional model of its value given its parents' simultaneous values:
//! the column mean for source nodes, ordinary least squares otherwise. The
//! residual statistics stored alongside the model are what diagnosis tests
//! abnormal data against.

mod fitter;
mod solve;
mod types;


pub use fitter::{fit, TrainingError};
pub use types::{BaselineSummary, ConditionalModel, ModelKind, NodeBaseline, TrainingState};
