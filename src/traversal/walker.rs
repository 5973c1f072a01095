//! Work-list implementation of the upstream walk.

use std::collections::HashMap;

use tracing::debug;

use super::report::{NodeFinding, RootCauseReport, RootCauseScore};
use super::DiagnosisError;
use crate::baseline::TrainingState;
use crate::config::RhtConfig;
use crate::frame::Frame;
use crate::graph::CausalGraph;
use crate::stats::{mean_shift_test, TestOutcome};

/// Per-node outcome, memoized for the duration of one diagnosis call.
struct Visit {
    marginal: TestOutcome,
    conditional: TestOutcome,
    anomalous: bool,
    local: bool,
    /// Whether the walk expanded into this node's parents.
    parents_examined: bool,
    any_parent_anomalous: bool,
}

enum Task {
    /// Test the node; expand into parents if warranted.
    Enter(usize),
    /// Parents are resolved; finalize the node's finding.
    Exit(usize),
}

/// Walk upstream from `target`, testing each node against its baseline, and
/// rank the root-cause candidates.
pub fn diagnose(
    state: &TrainingState,
    config: &RhtConfig,
    data: &Frame,
    target: &str,
    propagate_upstream: bool,
) -> Result<RootCauseReport, DiagnosisError> {
    let graph = &config.graph;
    let target_idx = graph
        .node_index(target)
        .ok_or_else(|| DiagnosisError::UnknownNode {
            node: target.into(),
        })?;

    let alpha = config.significance_level;
    let distances = graph.upstream_distances(target_idx);

    let mut findings: HashMap<usize, Visit> = HashMap::new();
    // Nodes whose Exit task is still on the stack.
    let mut pending: HashMap<usize, (TestOutcome, TestOutcome)> = HashMap::new();
    let mut stack = vec![Task::Enter(target_idx)];
    let mut visits = 0usize;

    while let Some(task) = stack.pop() {
        match task {
            Task::Enter(idx) => {
                if findings.contains_key(&idx) || pending.contains_key(&idx) {
                    continue; // Diamond ancestry: already evaluated or queued.
                }
                visits += 1;
                if let Some(budget) = config.max_visits {
                    if visits > budget {
                        return Err(DiagnosisError::VisitBudgetExceeded { budget });
                    }
                }

                let marginal = marginal_outcome(state, graph, data, idx, alpha)?;
                let conditional = conditional_outcome(state, config, data, idx)?;
                let anomalous = marginal.significant || conditional.significant;
                let local = conditional.significant;
                let parents = graph.parents(idx);

                debug!(
                    node = graph.node_name(idx),
                    anomalous,
                    local,
                    marginal_stat = marginal.statistic,
                    conditional_stat = conditional.statistic,
                    "visited node"
                );

                // Expand upstream while the anomaly is not yet localized.
                // With propagation disabled the walk still has to pass
                // through fully-explained nodes to reach a source, but stops
                // at the first locally anomalous node on the branch.
                let expand = anomalous
                    && !parents.is_empty()
                    && (propagate_upstream || !local);

                if expand {
                    pending.insert(idx, (marginal, conditional));
                    stack.push(Task::Exit(idx));
                    // Greatest marginal deviation explored first; reversed
                    // because the stack pops in LIFO order.
                    let ordered = order_parents(state, graph, data, parents, alpha)?;
                    for &p in ordered.iter().rev() {
                        stack.push(Task::Enter(p));
                    }
                } else {
                    findings.insert(
                        idx,
                        Visit {
                            marginal,
                            conditional,
                            anomalous,
                            local,
                            parents_examined: false,
                            any_parent_anomalous: false,
                        },
                    );
                }
            }
            Task::Exit(idx) => {
                // An Exit task is only ever pushed right after its pending
                // entry is inserted.
                let Some((marginal, conditional)) = pending.remove(&idx) else {
                    continue;
                };
                let any_parent_anomalous = graph
                    .parents(idx)
                    .iter()
                    .any(|p| findings.get(p).is_some_and(|f| f.anomalous));
                findings.insert(
                    idx,
                    Visit {
                        marginal,
                        conditional,
                        anomalous: marginal.significant || conditional.significant,
                        local: conditional.significant,
                        parents_examined: true,
                        any_parent_anomalous,
                    },
                );
            }
        }
    }

    Ok(assemble_report(config, &findings, &distances))
}

/// Candidate acceptance and deterministic ordering.
fn assemble_report(
    config: &RhtConfig,
    findings: &HashMap<usize, Visit>,
    distances: &HashMap<usize, usize>,
) -> RootCauseReport {
    let graph = &config.graph;
    let mut candidates = Vec::new();
    let mut visited = Vec::new();

    for (&idx, visit) in findings {
        let name = graph.node_name(idx).to_string();
        let distance = distances.get(&idx).copied().unwrap_or(usize::MAX);

        let is_candidate = visit.anomalous
            && (graph.parents(idx).is_empty()
                || !visit.parents_examined
                || visit.local
                || !visit.any_parent_anomalous);

        let explained = visit.anomalous && !visit.local && visit.any_parent_anomalous;

        if is_candidate {
            let driving = if visit.local {
                visit.conditional
            } else {
                visit.marginal
            };
            candidates.push((
                distance,
                RootCauseScore {
                    node: name.clone(),
                    score: driving.statistic,
                    statistic: driving.statistic,
                    p_value: driving.p_value,
                    explained_by_parent: visit.any_parent_anomalous,
                },
            ));
        }

        visited.push(NodeFinding {
            node: name,
            upstream_distance: distance,
            marginal: visit.marginal,
            conditional: visit.conditional,
            anomalous: visit.anomalous,
            local: visit.local,
            explained_by_parent: explained,
        });
    }

    candidates.sort_by(|(dist_a, a), (dist_b, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(dist_a.cmp(dist_b))
            .then(a.node.cmp(&b.node))
    });
    visited.sort_by(|a, b| {
        a.upstream_distance
            .cmp(&b.upstream_distance)
            .then(a.node.cmp(&b.node))
    });

    let candidates = candidates.into_iter().map(|(_, c)| c).collect();
    RootCauseReport::new(candidates, visited)
}

/// Marginal test: raw column mean against the trained column mean/std.
fn marginal_outcome(
    state: &TrainingState,
    graph: &CausalGraph,
    data: &Frame,
    idx: usize,
    alpha: f64,
) -> Result<TestOutcome, DiagnosisError> {
    let name = graph.node_name(idx);
    let column = data
        .column(name)
        .ok_or_else(|| DiagnosisError::MissingColumn { node: name.into() })?;
    let observed: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
    let baseline = state.baseline(idx);
    Ok(mean_shift_test(
        &observed,
        baseline.value_mean,
        baseline.value_std,
        alpha,
    ))
}

/// Conditional test: residuals of the stored model under the parents'
/// observed abnormal values (the model is never refit).
fn conditional_outcome(
    state: &TrainingState,
    config: &RhtConfig,
    data: &Frame,
    idx: usize,
) -> Result<TestOutcome, DiagnosisError> {
    let graph = &config.graph;
    let name = graph.node_name(idx);
    let column = data
        .column(name)
        .ok_or_else(|| DiagnosisError::MissingColumn { node: name.into() })?;

    let baseline = state.baseline(idx);
    let parent_indices = baseline.model.parent_indices();
    let mut parent_columns = Vec::with_capacity(parent_indices.len());
    for &p in parent_indices {
        let p_name = graph.node_name(p);
        let col = data
            .column(p_name)
            .ok_or_else(|| DiagnosisError::MissingColumn { node: p_name.into() })?;
        parent_columns.push(col);
    }

    let mut residuals = Vec::with_capacity(data.n_rows());
    let mut parent_vals = vec![0.0; parent_indices.len()];
    for row in 0..data.n_rows() {
        let y = column[row];
        if !y.is_finite() {
            continue;
        }
        let mut ok = true;
        for (slot, col) in parent_vals.iter_mut().zip(&parent_columns) {
            let v = col[row];
            if !v.is_finite() {
                ok = false;
                break;
            }
            *slot = v;
        }
        if !ok {
            continue;
        }
        residuals.push(y - baseline.model.predict(&parent_vals));
    }

    Ok(config
        .test_kind
        .run(&residuals, baseline, config.significance_level))
}

/// Parents ordered by descending marginal deviation, name-ascending on ties.
fn order_parents(
    state: &TrainingState,
    graph: &CausalGraph,
    data: &Frame,
    parents: &[usize],
    alpha: f64,
) -> Result<Vec<usize>, DiagnosisError> {
    let mut scored = Vec::with_capacity(parents.len());
    for &p in parents {
        let outcome = marginal_outcome(state, graph, data, p, alpha)?;
        scored.push((p, outcome.statistic));
    }
    scored.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(graph.node_name(*a).cmp(graph.node_name(*b)))
    });
    Ok(scored.into_iter().map(|(p, _)| p).collect())
}
