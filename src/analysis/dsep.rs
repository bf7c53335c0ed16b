//! # D-separation Edge Classifier
//!
//! Given two focus variables and a proposed control set, classifies every
//! diagram edge whose X–Y path openness the control set changes. UI hosts
//! color edges from the result: `Good` (a confounding path now blocked),
//! `Maybe` (a mediator on a directed path, ambiguous for total-effect
//! estimation), `Bad` (conditioning opened a collider path).
//!
//! This is a bounded-search explainer for interactive use, not a sound and
//! complete causal-discovery procedure. Path enumeration is capped by
//! [`PathSearchLimits`] so worst-case work stays polynomial on dense graphs;
//! neighbor order is lexicographic, so results are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::engine::model::DepGraph;

/// How a controlled-for edge affects isolating the X→Y effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeStatus {
    /// Controlling blocked a non-causal (confounding) path
    Good,
    /// Controlling blocked a directed path (mediator): ambiguous
    Maybe,
    /// Controlling opened a spurious path (collider or its descendant)
    Bad,
}

impl EdgeStatus {
    /// Severity for conflict resolution: `Bad > Maybe > Good`.
    fn severity(self) -> u8 {
        match self {
            EdgeStatus::Good => 0,
            EdgeStatus::Maybe => 1,
            EdgeStatus::Bad => 2,
        }
    }
}

/// Bounds on simple-path enumeration.
///
/// Heuristic UI-responsiveness limits, not semantic constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSearchLimits {
    /// Maximum number of nodes on a path
    pub max_depth: usize,
    /// Maximum number of paths enumerated
    pub max_paths: usize,
}

impl Default for PathSearchLimits {
    fn default() -> Self {
        PathSearchLimits {
            max_depth: 8,
            max_paths: 250,
        }
    }
}

/// Classifies the edges whose X–Y path openness flips under `controls`.
///
/// Edge keys are `"parent->child"`, oriented by the directed graph; only
/// edges on at least one flipped path appear. Conflicting classifications
/// from different paths merge by severity, `Bad > Maybe > Good`.
///
/// `excluded` nodes (typically noise nodes) are left out of the undirected
/// adjacency entirely.
pub fn classify_control_edges(
    parents: &DepGraph,
    x: &str,
    y: &str,
    controls: &BTreeSet<String>,
    excluded: &BTreeSet<String>,
    limits: &PathSearchLimits,
) -> BTreeMap<String, EdgeStatus> {
    let descendants = descendants_map(parents);
    let adjacency = undirected_adjacency(parents, excluded);
    let paths = enumerate_simple_paths(&adjacency, x, y, limits);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        paths = paths.len(),
        max_paths = limits.max_paths,
        "enumerated candidate paths"
    );

    let empty = BTreeSet::new();
    let mut statuses: BTreeMap<String, EdgeStatus> = BTreeMap::new();
    for path in &paths {
        let open_without = path_is_open(path, parents, &descendants, &empty);
        let open_with = path_is_open(path, parents, &descendants, controls);
        let status = match (open_without, open_with) {
            (true, false) => {
                if path_is_directed(path, parents) {
                    EdgeStatus::Maybe
                } else {
                    EdgeStatus::Good
                }
            }
            (false, true) => EdgeStatus::Bad,
            _ => continue,
        };
        for pair in path.windows(2) {
            let key = edge_key(&pair[0], &pair[1], parents);
            statuses
                .entry(key)
                .and_modify(|existing| {
                    if status.severity() > existing.severity() {
                        *existing = status;
                    }
                })
                .or_insert(status);
        }
    }
    statuses
}

/// Reverse of the parents map: node → children.
fn children_map(parents: &DepGraph) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut children: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (child, ps) in parents {
        children.entry(child).or_default();
        for parent in ps {
            children.entry(parent).or_default().insert(child);
        }
    }
    children
}

/// Descendants per node via memoized DFS.
///
/// Self-referential cycles yield an empty set instead of recursing forever.
fn descendants_map(parents: &DepGraph) -> FxHashMap<String, BTreeSet<String>> {
    let children = children_map(parents);
    let mut memo: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();
    let mut in_progress: BTreeSet<String> = BTreeSet::new();
    for node in children.keys() {
        collect_descendants(node, &children, &mut memo, &mut in_progress);
    }
    memo
}

fn collect_descendants(
    node: &str,
    children: &BTreeMap<&str, BTreeSet<&str>>,
    memo: &mut FxHashMap<String, BTreeSet<String>>,
    in_progress: &mut BTreeSet<String>,
) -> BTreeSet<String> {
    if let Some(cached) = memo.get(node) {
        return cached.clone();
    }
    if in_progress.contains(node) {
        return BTreeSet::new();
    }
    in_progress.insert(node.to_string());
    let mut result = BTreeSet::new();
    if let Some(kids) = children.get(node) {
        for child in kids {
            result.insert(child.to_string());
            for grand in collect_descendants(child, children, memo, in_progress) {
                result.insert(grand);
            }
        }
    }
    in_progress.remove(node);
    memo.insert(node.to_string(), result.clone());
    result
}

/// Undirected adjacency from the parents map, minus excluded nodes.
fn undirected_adjacency(
    parents: &DepGraph,
    excluded: &BTreeSet<String>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (child, ps) in parents {
        if excluded.contains(child) {
            continue;
        }
        adjacency.entry(child.clone()).or_default();
        for parent in ps {
            if excluded.contains(parent) {
                continue;
            }
            adjacency
                .entry(child.clone())
                .or_default()
                .insert(parent.clone());
            adjacency
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
        }
    }
    adjacency
}

/// Enumerates simple paths from `x` to `y`, lexicographic neighbor order,
/// bounded by `limits`.
fn enumerate_simple_paths(
    adjacency: &BTreeMap<String, BTreeSet<String>>,
    x: &str,
    y: &str,
    limits: &PathSearchLimits,
) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    if x == y || !adjacency.contains_key(x) || !adjacency.contains_key(y) {
        return paths;
    }
    let mut current = vec![x.to_string()];
    let mut on_path: BTreeSet<String> = BTreeSet::new();
    on_path.insert(x.to_string());
    walk_paths(adjacency, y, limits, &mut current, &mut on_path, &mut paths);
    paths
}

fn walk_paths(
    adjacency: &BTreeMap<String, BTreeSet<String>>,
    target: &str,
    limits: &PathSearchLimits,
    current: &mut Vec<String>,
    on_path: &mut BTreeSet<String>,
    paths: &mut Vec<Vec<String>>,
) {
    if paths.len() >= limits.max_paths {
        return;
    }
    let last = match current.last() {
        Some(last) => last.clone(),
        None => return,
    };
    if last == target {
        paths.push(current.clone());
        return;
    }
    if current.len() >= limits.max_depth {
        return;
    }
    let neighbors = match adjacency.get(&last) {
        Some(n) => n,
        None => return,
    };
    for neighbor in neighbors {
        if on_path.contains(neighbor) {
            continue;
        }
        current.push(neighbor.clone());
        on_path.insert(neighbor.clone());
        walk_paths(adjacency, target, limits, current, on_path, paths);
        on_path.remove(neighbor);
        current.pop();
    }
}

/// Openness of one path under a control set.
///
/// Paths of length ≤ 2 (a direct edge) are always open. An interior
/// collider blocks unless it or one of its descendants is controlled; any
/// other interior node blocks iff it is controlled.
fn path_is_open(
    path: &[String],
    parents: &DepGraph,
    descendants: &FxHashMap<String, BTreeSet<String>>,
    controls: &BTreeSet<String>,
) -> bool {
    if path.len() <= 2 {
        return true;
    }
    for i in 1..path.len() - 1 {
        let node = &path[i];
        let prev = &path[i - 1];
        let next = &path[i + 1];
        let node_parents = parents.get(node);
        let is_collider = node_parents
            .map(|ps| ps.contains(prev) && ps.contains(next))
            .unwrap_or(false);
        let controlled = controls.contains(node);
        if is_collider {
            let opened = controlled
                || descendants
                    .get(node)
                    .map(|ds| ds.iter().any(|d| controls.contains(d)))
                    .unwrap_or(false);
            if !opened {
                return false;
            }
        } else if controlled {
            return false;
        }
    }
    true
}

/// True when every edge of the path points the same way, end to end.
fn path_is_directed(path: &[String], parents: &DepGraph) -> bool {
    let forward = path.windows(2).all(|pair| {
        parents
            .get(&pair[1])
            .map(|ps| ps.contains(&pair[0]))
            .unwrap_or(false)
    });
    let backward = path.windows(2).all(|pair| {
        parents
            .get(&pair[0])
            .map(|ps| ps.contains(&pair[1]))
            .unwrap_or(false)
    });
    forward || backward
}

/// Directed key `"parent->child"` for one traversed undirected edge.
fn edge_key(a: &str, b: &str, parents: &DepGraph) -> String {
    let a_is_parent_of_b = parents
        .get(b)
        .map(|ps| ps.contains(a))
        .unwrap_or(false);
    if a_is_parent_of_b {
        format!("{}->{}", a, b)
    } else {
        format!("{}->{}", b, a)
    }
}
