//! Engine configuration.

use thiserror::Error;

use crate::graph::CausalGraph;
use crate::stats::TestKind;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("significance_level must be in (0, 1], got {0}")]
    SignificanceLevel(f64),

    #[error("min_samples must be at least 1, got {0}")]
    MinSamples(usize),
}

/// Configuration for the recursive-hypothesis-testing engine.
///
/// Bundles the causal graph with the tunable hyperparameters. Immutable once
/// handed to the engine; rebuild to change anything.
#[derive(Debug)]
pub struct RhtConfig {
    /// Causal dependency graph over metric names.
    pub graph: CausalGraph,
    /// Significance level for rejecting "node behaves normally".
    pub significance_level: f64,
    /// Minimum valid observations per node for baseline fitting.
    pub min_samples: usize,
    /// Hypothesis-test strategy for conditional residuals.
    pub test_kind: TestKind,
    /// Optional cap on nodes visited per diagnosis; `None` is unbounded.
    pub max_visits: Option<usize>,
}

impl RhtConfig {
    /// Defaults: 5% significance, 10-sample minimum, residual z-test,
    /// unbounded traversal.
    pub fn new(graph: CausalGraph) -> Self {
        Self {
            graph,
            significance_level: 0.05,
            min_samples: 10,
            test_kind: TestKind::default(),
            max_visits: None,
        }
    }

    /// Set the significance level.
    pub fn with_significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }

    /// Set the minimum sample count for fitting.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Set the hypothesis-test strategy.
    pub fn with_test_kind(mut self, test_kind: TestKind) -> Self {
        self.test_kind = test_kind;
        self
    }

    /// Bound the number of nodes a single diagnosis may visit.
    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = Some(max_visits);
        self
    }

    /// Validate hyperparameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.significance_level > 0.0 && self.significance_level <= 1.0) {
            return Err(ConfigError::SignificanceLevel(self.significance_level));
        }
        if self.min_samples < 1 {
            return Err(ConfigError::MinSamples(self.min_samples));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> CausalGraph {
        CausalGraph::new(&["a", "b"], &[("a", "b")]).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RhtConfig::new(graph());
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.min_samples, 10);
        assert_eq!(config.test_kind, TestKind::Residual);
        assert!(config.max_visits.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = RhtConfig::new(graph())
            .with_significance_level(0.01)
            .with_min_samples(30)
            .with_test_kind(TestKind::Distribution)
            .with_max_visits(100);
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.min_samples, 30);
        assert_eq!(config.test_kind, TestKind::Distribution);
        assert_eq!(config.max_visits, Some(100));
    }

    #[test]
    fn test_invalid_significance_rejected() {
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            let config = RhtConfig::new(graph()).with_significance_level(alpha);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::SignificanceLevel(_))
            ));
        }
    }

    #[test]
    fn test_invalid_min_samples_rejected() {
        let config = RhtConfig::new(graph()).with_min_samples(0);
        assert!(matches!(config.validate(), Err(ConfigError::MinSamples(0))));
    }
}
