//! # Dependency Graph Topology
//!
//! Topological ordering of the dependency graph (Kahn's algorithm) and the
//! noise-augmented graph used by external samplers.
//!
//! Determinism: the graph is a `BTreeMap` keyed by variable name, so the
//! zero-in-degree seed order and child visit order are lexicographic. Given
//! the same graph, `topo_sort` always returns the same order.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::engine::errors::ScmError;
use crate::engine::model::DepGraph;

/// Prefix for implicit noise-node identifiers.
const NOISE_PREFIX: &str = "noise:";

/// The implicit noise-node id for a variable: `noise:<var>`.
pub fn noise_id(var: &str) -> String {
    format!("{}{}", NOISE_PREFIX, var)
}

/// True if `name` is an implicit noise-node id.
pub fn is_noise_id(name: &str) -> bool {
    name.starts_with(NOISE_PREFIX)
}

/// Computes a topological order of the dependency graph.
///
/// Kahn's algorithm: in-degrees count parent→child edges; zero-in-degree
/// nodes are dequeued FIFO, decrementing each child's in-degree. A result
/// shorter than the node count means the graph has a directed cycle.
///
/// # Errors
///
/// * `ScmError::Cycle` - the graph is not a DAG. Callers must treat this as
///   a hard validation failure for the whole model.
pub fn topo_sort(eqs: &DepGraph) -> Result<Vec<String>, ScmError> {
    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
    let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let mut nodes: Vec<&str> = Vec::new();

    for (var, parents) in eqs {
        if !in_degree.contains_key(var.as_str()) {
            in_degree.insert(var, 0);
            nodes.push(var);
        }
        for parent in parents {
            // parents missing from the key set still participate as nodes
            if !in_degree.contains_key(parent.as_str()) {
                in_degree.insert(parent, 0);
                nodes.push(parent);
            }
            if let Some(d) = in_degree.get_mut(var.as_str()) {
                *d += 1;
            }
            children.entry(parent).or_default().push(var);
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .copied()
        .filter(|n| in_degree.get(n).copied().unwrap_or(0) == 0)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        if let Some(kids) = children.get(node) {
            for child in kids {
                if let Some(d) = in_degree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }
    }

    if order.len() < nodes.len() {
        return Err(ScmError::Cycle);
    }
    Ok(order)
}

/// Builds the noise-augmented graph used by the sampling path.
///
/// Every real (non-noise) variable gains one additional, parentless
/// `noise:<var>` parent. Normal single-pass evaluation never uses this;
/// only external samplers walking the augmented graph do.
pub fn build_noise_augmented_graph(eqs: &DepGraph) -> DepGraph {
    let mut augmented = eqs.clone();
    for var in eqs.keys() {
        if is_noise_id(var) {
            continue;
        }
        let noise = noise_id(var);
        augmented.entry(noise.clone()).or_default();
        if let Some(parents) = augmented.get_mut(var) {
            parents.insert(noise);
        }
    }
    augmented
}
