//! Index-based DAG implementation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

use thiserror::Error;

/// Graph construction errors
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Causal graph contains a cycle involving node {node}")]
    Cycle { node: String },

    #[error("Edge references unknown node: {edge}")]
    DanglingEdge { edge: String },

    #[error("Duplicate node name: {node}")]
    DuplicateNode { node: String },
}

/// Immutable causal DAG over metric names.
///
/// Nodes are stored densely and addressed by `usize` index; name lookup goes
/// through an interned map. Edges run parent → child (cause → effect).
#[derive(Debug)]
pub struct CausalGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    topo: Vec<usize>,
    // Ancestor sets are rarely needed outside diagnostics; computed on first
    // request and cached for the graph's lifetime.
    ancestors: OnceLock<Vec<HashSet<usize>>>,
}

impl CausalGraph {
    /// Build a graph from node names and `(parent, child)` edges.
    ///
    /// Fails on duplicate node names, edges naming unknown nodes, and any
    /// cycle in the edge set (Kahn's algorithm).
    pub fn new<S: AsRef<str>>(nodes: &[S], edges: &[(S, S)]) -> Result<Self, GraphError> {
        let mut names = Vec::with_capacity(nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let name = node.as_ref().to_string();
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(GraphError::DuplicateNode { node: name });
            }
            names.push(name);
        }

        let n = names.len();
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (from, to) in edges {
            let (from, to) = (from.as_ref(), to.as_ref());
            let lookup = |name: &str| {
                index.get(name).copied().ok_or_else(|| GraphError::DanglingEdge {
                    edge: format!("{from} -> {to}"),
                })
            };
            let (p, c) = (lookup(from)?, lookup(to)?);
            if !children[p].contains(&c) {
                children[p].push(c);
                parents[c].push(p);
            }
        }
        // Deterministic adjacency order regardless of edge input order.
        for list in parents.iter_mut().chain(children.iter_mut()) {
            list.sort_unstable();
        }

        let topo = kahn_order(&names, &parents, &children)?;

        Ok(Self {
            names,
            index,
            parents,
            children,
            topo,
            ancestors: OnceLock::new(),
        })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.names.len()
    }

    /// Node name for an index.
    pub fn node_name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    /// Index for a node name, if present.
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All node names in storage order.
    pub fn node_names(&self) -> &[String] {
        &self.names
    }

    /// Direct parents (causes) of a node, ascending by index.
    pub fn parents(&self, idx: usize) -> &[usize] {
        &self.parents[idx]
    }

    /// Direct children (effects) of a node, ascending by index.
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Node indices in a topological order (parents before children).
    pub fn topo_order(&self) -> &[usize] {
        &self.topo
    }

    /// All ancestors (transitive parents) of a node.
    pub fn ancestors(&self, idx: usize) -> &HashSet<usize> {
        &self.ancestor_sets()[idx]
    }

    /// All descendants (transitive children) of a node.
    pub fn descendants(&self, idx: usize) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from_iter(self.children[idx].iter().copied());
        while let Some(c) = queue.pop_front() {
            if seen.insert(c) {
                queue.extend(self.children[c].iter().copied());
            }
        }
        seen
    }

    /// Minimum upstream hop count from every ancestor of `target` (and the
    /// target itself, at distance 0), following child → parent edges.
    pub fn upstream_distances(&self, target: usize) -> HashMap<usize, usize> {
        let mut dist = HashMap::new();
        dist.insert(target, 0);
        let mut queue = VecDeque::from([target]);
        while let Some(n) = queue.pop_front() {
            let d = dist[&n];
            for &p in &self.parents[n] {
                if !dist.contains_key(&p) {
                    dist.insert(p, d + 1);
                    queue.push_back(p);
                }
            }
        }
        dist
    }

    fn ancestor_sets(&self) -> &Vec<HashSet<usize>> {
        self.ancestors.get_or_init(|| {
            let mut sets: Vec<HashSet<usize>> = vec![HashSet::new(); self.names.len()];
            for &n in &self.topo {
                let mut acc = HashSet::new();
                for &p in &self.parents[n] {
                    acc.insert(p);
                    acc.extend(sets[p].iter().copied());
                }
                sets[n] = acc;
            }
            sets
        })
    }
}

/// Kahn topological sort; reports a node on any remaining cycle.
fn kahn_order(
    names: &[String],
    parents: &[Vec<usize>],
    children: &[Vec<usize>],
) -> Result<Vec<usize>, GraphError> {
    let n = names.len();
    let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
    // Seed with sources in index order for a deterministic result.
    let mut queue: VecDeque<usize> =
        (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &c in &children[node] {
            in_degree[c] -= 1;
            if in_degree[c] == 0 {
                queue.push_back(c);
            }
        }
    }
    if order.len() != n {
        let node = (0..n)
            .find(|&i| in_degree[i] > 0)
            .map(|i| names[i].clone())
            .unwrap_or_default();
        return Err(GraphError::Cycle { node });
    }
    Ok(order)
}
