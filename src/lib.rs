//! # Causagraph - Structural Causal Model Engine
//!
//! Causagraph turns a small set of assignment equations over named variables
//! into a structural causal model (SCM): it evaluates the model numerically
//! under interventions ("do()") and injected noise, supports diagram-level
//! edits that rewrite equation text without corrupting unrelated terms, and
//! analyzes which variables must be statistically controlled for to isolate
//! a causal effect between two chosen variables.
//!
//! ## Architecture
//!
//! The system is organized into several modules:
//!
//! - **frontend**: Parser, expression AST, and the function/constant registry
//! - **engine**: Model derivation, topology, evaluation, linear-form
//!   utilities, and the text-level mutation engine
//! - **analysis**: D-separation edge classification for confounding control
//! - **stats**: Regression, residualization, and LOESS utilities for overlays
//!
//! ## Usage
//!
//! ```rust,ignore
//! use causagraph::{parse_scm, deps_from_model, compute_values};
//! use rustc_hash::FxHashMap;
//!
//! let model = parse_scm("U = 2\nX = 1 + 0.5*U\nY = -1 + 2*X")?;
//! let eqs = deps_from_model(&model);
//! let values = compute_values(
//!     &model,
//!     &eqs,
//!     &FxHashMap::default(),
//!     &FxHashMap::default(),
//!     None,
//! )?;
//! assert_eq!(values["Y"], 3.0);
//! ```
//!
//! The engine is purely functional and single-threaded: every operation
//! takes immutable snapshots and returns new values, with all state (current
//! values, clamp maps, equation text) owned by the caller.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod engine;
pub mod frontend;
pub mod stats;

// Re-export the commonly used entry points
pub use analysis::dsep::{classify_control_edges, EdgeStatus, PathSearchLimits};
pub use engine::errors::ScmError;
pub use engine::eval::{compute_values, NoiseState};
pub use engine::graph::{build_noise_augmented_graph, is_noise_id, noise_id, topo_sort};
pub use engine::linear::{
    build_linear_expression, get_linear_summary, update_linear_coefficient, LinearSummary,
};
pub use engine::model::{deps_from_model, DepGraph, Model, VarEntry};
pub use engine::mutate::{
    add_node, remove_edge, remove_node, rename_node, upsert_edge_coefficient, UpsertOptions,
};
pub use frontend::parser::parse_scm;
pub use stats::regress::{
    build_loess_line, compute_residualized_samples, fit_linear_regression, solve_linear_system,
    LinearFit, Residualized,
};
