//! # Model
//!
//! The per-variable model derived from SCM source text, and the dependency
//! graph it induces.
//!
//! A [`Model`] maps every variable that appears anywhere in the source
//! (assigned or merely referenced) to one [`VarEntry`]. The hoisting step in
//! [`crate::frontend::parser::parse_scm`] maintains this invariant:
//! referenced-but-unassigned names become derived entries with no expression
//! (implicit constant 0).
//!
//! Models are recomputed fresh, in full, on every text change. Nothing here
//! is patched incrementally.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::frontend::ast::ExprAst;

/// Variable → direct parents, with deterministic (lexicographic) iteration.
pub type DepGraph = BTreeMap<String, BTreeSet<String>>;

/// One variable's entry in the model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarEntry {
    /// The parsed right-hand side, or `None` for derived entries
    pub expr: Option<ExprAst>,
    /// Direct dependencies (free variables of `expr`), first-seen order
    pub dependencies: Vec<String>,
    /// The right-hand-side source text, trimmed (empty for derived entries)
    pub source_text: String,
    /// True when the variable was only ever referenced, never assigned;
    /// its implicit expression is the constant 0
    pub is_derived: bool,
}

/// The full model: one entry per variable, in deterministic order.
///
/// Order is assignment order followed by hoisted (derived) names in
/// first-reference order; it drives statement reconstruction in the mutation
/// engine and seeding in the evaluator.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    entries: FxHashMap<String, VarEntry>,
    order: Vec<String>,
}

impl Model {
    /// Looks up a variable's entry.
    pub fn get(&self, name: &str) -> Option<&VarEntry> {
        self.entries.get(name)
    }

    /// True if the variable appears anywhere (assigned or derived).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True if the variable has its own assignment statement.
    pub fn is_assigned(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| !e.is_derived)
    }

    /// All variables, assignment order then hoisted names.
    pub fn vars(&self) -> &[String] {
        &self.order
    }

    /// Iterates entries in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VarEntry)> {
        self.order.iter().filter_map(|name| {
            self.entries.get(name).map(|entry| (name, entry))
        })
    }

    /// Inserts or replaces an entry, tracking first-insertion order.
    pub fn insert(&mut self, name: String, entry: VarEntry) {
        if !self.entries.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.entries.insert(name, entry);
    }

    /// Hoists every referenced-but-unassigned dependency into a derived
    /// entry, so each name appearing anywhere has exactly one entry.
    pub fn hoist_derived(&mut self) {
        let mut missing = Vec::new();
        for name in &self.order {
            if let Some(entry) = self.entries.get(name) {
                for dep in &entry.dependencies {
                    if !self.entries.contains_key(dep) && !missing.contains(dep) {
                        missing.push(dep.clone());
                    }
                }
            }
        }
        for dep in missing {
            self.insert(
                dep,
                VarEntry {
                    expr: None,
                    dependencies: Vec::new(),
                    source_text: String::new(),
                    is_derived: true,
                },
            );
        }
    }
}

/// Derives the dependency graph (variable → parent set) from a model.
///
/// Every model variable gets an entry, so the key set is exactly the
/// variable set; hoisting guarantees every parent is itself a key.
pub fn deps_from_model(model: &Model) -> DepGraph {
    let mut graph = DepGraph::new();
    for (name, entry) in model.iter() {
        graph.insert(
            name.clone(),
            entry.dependencies.iter().cloned().collect(),
        );
    }
    graph
}
