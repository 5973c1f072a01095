//! Test strategies: residual z-test and two-sample KS.

use serde::{Deserialize, Serialize};

use super::tail::{ks_p_value, normal_two_tailed_p};
use crate::baseline::NodeBaseline;

/// Cap on reported statistics so degenerate baselines (zero variance) still
/// produce finite, sortable scores.
pub const MAX_STATISTIC: f64 = 1e9;

/// A standard deviation below this is treated as degenerate (the training
/// relationship was noise-free).
const STD_EPS: f64 = 1e-8;

/// Mean deviations below this are indistinguishable from float round-off.
const DEV_EPS: f64 = 1e-6;

/// Hypothesis-test strategy for comparing observed residuals against a
/// trained baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    /// z-test on the mean residual against the trained residual mean, with
    /// standard error `residual_std / sqrt(n)`.
    #[default]
    Residual,
    /// Two-sample Kolmogorov-Smirnov test of the observed residuals against
    /// the stored training residual sample.
    Distribution,
}

impl TestKind {
    /// Human-readable test name.
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::Residual => "residual-z",
            TestKind::Distribution => "kolmogorov-smirnov",
        }
    }

    /// Run the test: null hypothesis is "the node behaves as in the trained
    /// baseline". Empty observations never reject.
    pub fn run(&self, observed: &[f64], baseline: &NodeBaseline, alpha: f64) -> TestOutcome {
        if observed.is_empty() {
            return TestOutcome::not_significant();
        }
        if baseline.residual_std <= STD_EPS {
            let dev = (mean(observed) - baseline.residual_mean).abs();
            return TestOutcome::degenerate(dev);
        }
        match self {
            TestKind::Residual => {
                let n = observed.len() as f64;
                let se = baseline.residual_std / n.sqrt();
                let z = (mean(observed) - baseline.residual_mean).abs() / se;
                TestOutcome::from_statistic(z, normal_two_tailed_p(z), alpha)
            }
            TestKind::Distribution => {
                let d = ks_statistic(observed, &baseline.residuals);
                let n1 = observed.len() as f64;
                let n2 = baseline.residuals.len() as f64;
                let n_eff = (n1 * n2) / (n1 + n2);
                let p = ks_p_value(d * n_eff.sqrt());
                TestOutcome::from_statistic(d, p, alpha)
            }
        }
    }
}

/// Outcome of a single hypothesis test.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test statistic (z-score or KS distance), clamped to [`MAX_STATISTIC`].
    pub statistic: f64,
    /// p-value under the null hypothesis.
    pub p_value: f64,
    /// Whether the null was rejected at the configured significance level.
    pub significant: bool,
}

impl TestOutcome {
    fn from_statistic(statistic: f64, p_value: f64, alpha: f64) -> Self {
        Self {
            statistic: statistic.min(MAX_STATISTIC),
            p_value,
            significant: p_value < alpha,
        }
    }

    fn not_significant() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            significant: false,
        }
    }

    fn degenerate(deviation: f64) -> Self {
        if deviation > DEV_EPS {
            Self {
                statistic: MAX_STATISTIC,
                p_value: 0.0,
                significant: true,
            }
        } else {
            Self::not_significant()
        }
    }
}

/// z-test of the observed mean against a trained marginal mean/std.
///
/// Used for a node's raw column (is the metric shifted at all, regardless of
/// whether its parents explain it) and for ordering parent exploration by
/// deviation magnitude.
pub fn mean_shift_test(observed: &[f64], mean0: f64, std0: f64, alpha: f64) -> TestOutcome {
    if observed.is_empty() {
        return TestOutcome::not_significant();
    }
    if std0 <= STD_EPS {
        return TestOutcome::degenerate((mean(observed) - mean0).abs());
    }
    let n = observed.len() as f64;
    let se = std0 / n.sqrt();
    let z = (mean(observed) - mean0).abs() / se;
    TestOutcome::from_statistic(z, normal_two_tailed_p(z), alpha)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Two-sample KS distance; `sorted_baseline` must be ascending.
fn ks_statistic(observed: &[f64], sorted_baseline: &[f64]) -> f64 {
    let mut sorted_obs = observed.to_vec();
    sorted_obs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n1 = sorted_obs.len() as f64;
    let n2 = sorted_baseline.len() as f64;
    let mut d_max = 0.0f64;
    let (mut i, mut j) = (0usize, 0usize);
    while i < sorted_obs.len() && j < sorted_baseline.len() {
        let cdf1 = (i + 1) as f64 / n1;
        let cdf2 = (j + 1) as f64 / n2;
        d_max = d_max.max((cdf1 - cdf2).abs());
        if sorted_obs[i] <= sorted_baseline[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    d_max
}
