//! Ranked diagnosis output.

use serde::{Deserialize, Serialize};

use crate::stats::TestOutcome;

/// One root-cause candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootCauseScore {
    /// Metric name.
    pub node: String,
    /// Suspectness; higher is more suspect.
    pub score: f64,
    /// Statistic of the test that drove candidacy.
    pub statistic: f64,
    /// p-value of that test.
    pub p_value: f64,
    /// Whether an immediate parent was also found anomalous (the candidate
    /// is only partially explained upstream).
    pub explained_by_parent: bool,
}

/// Diagnostic record for every node the walk examined, candidate or not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeFinding {
    /// Metric name.
    pub node: String,
    /// Minimum upstream hop count from the diagnosis target.
    pub upstream_distance: usize,
    /// Marginal test of the raw column against its trained mean/std.
    pub marginal: TestOutcome,
    /// Conditional test of the model residuals against the trained baseline.
    pub conditional: TestOutcome,
    /// Either test rejected.
    pub anomalous: bool,
    /// The conditional test rejected: the anomaly is not absorbed by the
    /// parents' observed values.
    pub local: bool,
    /// Anomalous, not local, and at least one visited parent was anomalous.
    pub explained_by_parent: bool,
}

/// Ranked root-cause report.
///
/// Candidates are ordered by descending score, ties broken by ascending
/// upstream distance from the target, then by node name; the ordering is
/// byte-identical across runs on identical inputs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RootCauseReport {
    candidates: Vec<RootCauseScore>,
    visited: Vec<NodeFinding>,
}

impl RootCauseReport {
    pub(crate) fn new(candidates: Vec<RootCauseScore>, visited: Vec<NodeFinding>) -> Self {
        Self { candidates, visited }
    }

    /// Ranked candidates, most suspect first.
    pub fn candidates(&self) -> &[RootCauseScore] {
        &self.candidates
    }

    /// Every node the walk examined, including explained and normal nodes.
    pub fn visited(&self) -> &[NodeFinding] {
        &self.visited
    }

    /// Most suspect candidate, if any.
    pub fn top(&self) -> Option<&RootCauseScore> {
        self.candidates.first()
    }

    /// Whether no root cause was found (not an error: the target simply
    /// tested normal, or every anomaly was explained away).
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}
