//! Hypothesis tests against trained baselines.
//!
//! The test family is a fixed strategy enum ([`TestKind`]) dispatched through
//! one seam: `run(observed, baseline, alpha) -> TestOutcome`. Tail
//! probabilities live in `tail` and use closed-form approximations, so every
//! result is deterministic for identical inputs.

mod hypothesis;
mod tail;

pub use hypothesis::{mean_shift_test, TestKind, TestOutcome, MAX_STATISTIC};
pub use tail::{erf, ks_p_value, normal_two_tailed_p};
