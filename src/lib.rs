//! Causal-graph root-cause analysis.
//!
//! `indagar` trains per-metric statistical baselines from a "normal" period
//! of multivariate time-series data, then walks a supplied causal DAG
//! upstream from an anomalous target metric, hypothesis-testing every node
//! against its baseline to rank root-cause candidates (recursive hypothesis
//! testing).
//!
//! ## Architecture
//!
//! - `graph`: immutable index-based causal DAG over metric names
//! - `frame`: named-column tabular time series (rows = steps, columns = metrics)
//! - `stats`: hypothesis-test strategies and tail probabilities
//! - `baseline`: per-node conditional models + residual statistics (training)
//! - `traversal`: the upstream walk producing a ranked report (diagnosis)
//! - `engine`: the public facade owning config and the trained snapshot
//!
//! ## Example
//!
//! ```ignore
//! use indagar::{CausalGraph, Frame, RhtConfig, RhtEngine};
//!
//! let graph = CausalGraph::new(nodes, edges)?;
//! let mut engine = RhtEngine::new(RhtConfig::new(graph))?;
//! engine.train(&normal_data)?;
//! let report = engine.find_root_causes(&abnormal_data, "api_latency", true)?;
//! for cause in report.candidates() {
//!     println!("{}: score={:.2}", cause.node, cause.score);
//! }
//! ```

pub mod baseline;
pub mod config;
pub mod engine;
pub mod frame;
pub mod graph;
pub mod stats;
pub mod traversal;

pub use baseline::{BaselineSummary, ModelKind, NodeBaseline, TrainingError, TrainingState};
pub use config::{ConfigError, RhtConfig};
pub use engine::RhtEngine;
pub use frame::{Frame, FrameError};
pub use graph::{CausalGraph, GraphError};
pub use stats::{TestKind, TestOutcome};
pub use traversal::{DiagnosisError, NodeFinding, RootCauseReport, RootCauseScore};
