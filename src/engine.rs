//! Public engine facade.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::baseline::{self, BaselineSummary, TrainingError, TrainingState};
use crate::config::{ConfigError, RhtConfig};
use crate::frame::Frame;
use crate::traversal::{self, DiagnosisError, RootCauseReport};

/// Recursive-hypothesis-testing engine.
///
/// Owns the configuration (graph included) and the current trained snapshot.
/// `train` is the only mutation point; it replaces the snapshot wholesale.
/// Diagnosis captures the snapshot `Arc` once at entry, so a retrain
/// happening between calls can never expose a half-built state to a running
/// diagnosis.
#[derive(Debug)]
pub struct RhtEngine {
    config: RhtConfig,
    state: Option<Arc<TrainingState>>,
}

impl RhtEngine {
    /// Create an engine; fails when hyperparameters are out of range.
    ///
    /// Graph validity (cycles, dangling edges) is enforced earlier, when the
    /// [`crate::CausalGraph`] itself is constructed.
    pub fn new(config: RhtConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &RhtConfig {
        &self.config
    }

    /// Whether a trained snapshot exists.
    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Fit baselines from normal-period data, replacing any previous
    /// training wholesale.
    pub fn train(&mut self, normal_data: &Frame) -> Result<(), TrainingError> {
        let state = baseline::fit(&self.config, normal_data)?;
        info!(
            nodes = state.n_nodes(),
            rows = normal_data.n_rows(),
            "trained baselines"
        );
        self.state = Some(Arc::new(state));
        Ok(())
    }

    /// Rank root-cause candidates for an anomaly observed on `target`.
    ///
    /// Read-only with respect to engine state. Fails with
    /// [`DiagnosisError::NotTrained`] before the first successful `train`.
    pub fn find_root_causes(
        &self,
        abnormal_data: &Frame,
        target: &str,
        propagate_upstream: bool,
    ) -> Result<RootCauseReport, DiagnosisError> {
        // Snapshot-then-use: a single clone of the Arc up front.
        let state = self.state.clone().ok_or(DiagnosisError::NotTrained)?;
        let report = traversal::diagnose(
            &state,
            &self.config,
            abnormal_data,
            target,
            propagate_upstream,
        )?;
        debug!(
            target,
            visited = report.visited().len(),
            candidates = report.len(),
            "diagnosis complete"
        );
        Ok(report)
    }

    /// Per-metric training summaries for stats-table rendering; `None`
    /// before the first `train`.
    pub fn baseline_summaries(&self) -> Option<BTreeMap<String, BaselineSummary>> {
        self.state
            .as_ref()
            .map(|state| state.summaries(&self.config.graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CausalGraph;

    fn chain_config() -> RhtConfig {
        let graph = CausalGraph::new(&["a", "b"], &[("a", "b")]).unwrap();
        RhtConfig::new(graph)
    }

    fn normal_data() -> Frame {
        let a: Vec<f64> = (0..100).map(|i| ((i * 37) % 97) as f64 / 10.0).collect();
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v - 1.0).collect();
        Frame::from_columns(vec![("a", a), ("b", b)]).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = chain_config().with_significance_level(0.0);
        assert!(RhtEngine::new(config).is_err());
    }

    #[test]
    fn test_diagnose_before_train_fails() {
        let engine = RhtEngine::new(chain_config()).unwrap();
        let err = engine
            .find_root_causes(&normal_data(), "b", true)
            .unwrap_err();
        assert!(matches!(err, DiagnosisError::NotTrained));
    }

    #[test]
    fn test_summaries_none_before_train() {
        let engine = RhtEngine::new(chain_config()).unwrap();
        assert!(engine.baseline_summaries().is_none());
        assert!(!engine.is_trained());
    }

    #[test]
    fn test_train_then_diagnose() {
        let mut engine = RhtEngine::new(chain_config()).unwrap();
        engine.train(&normal_data()).unwrap();
        assert!(engine.is_trained());

        let a = vec![100.0; 30];
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v - 1.0).collect();
        let abnormal = Frame::from_columns(vec![("a", a), ("b", b)]).unwrap();

        let report = engine.find_root_causes(&abnormal, "b", true).unwrap();
        assert_eq!(report.top().unwrap().node, "a");
    }

    #[test]
    fn test_retrain_replaces_state() {
        let mut engine = RhtEngine::new(chain_config()).unwrap();
        engine.train(&normal_data()).unwrap();
        let before = engine.baseline_summaries().unwrap()["a"].value_mean;

        // Retrain on shifted data; the snapshot must be fully replaced.
        let a: Vec<f64> = (0..100).map(|i| 50.0 + ((i * 37) % 97) as f64 / 10.0).collect();
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v - 1.0).collect();
        let shifted = Frame::from_columns(vec![("a", a), ("b", b)]).unwrap();
        engine.train(&shifted).unwrap();

        let after = engine.baseline_summaries().unwrap()["a"].value_mean;
        assert!((after - before - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_retrain_keeps_previous_state() {
        let mut engine = RhtEngine::new(chain_config()).unwrap();
        engine.train(&normal_data()).unwrap();

        let too_small =
            Frame::from_columns(vec![("a", vec![1.0; 3]), ("b", vec![2.0; 3])]).unwrap();
        assert!(engine.train(&too_small).is_err());
        // The old snapshot is still intact.
        assert!(engine.is_trained());
        assert!(engine.baseline_summaries().is_some());
    }

    #[test]
    fn test_summaries_cover_all_nodes() {
        let mut engine = RhtEngine::new(chain_config()).unwrap();
        engine.train(&normal_data()).unwrap();
        let summaries = engine.baseline_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.contains_key("a"));
        assert!(summaries.contains_key("b"));
    }
}
