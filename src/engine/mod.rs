//! The SCM execution engine.
//!
//! This module provides:
//! - **errors**: Error types for parse, cycle, evaluation, and mutation failures
//! - **model**: The per-variable model and the dependency graph it induces
//! - **graph**: Topological ordering and the noise-augmented graph
//! - **eval**: Single-pass evaluation with clamping and noise injection
//! - **linear**: Affine-expression detection, coefficient edits, re-serialization
//! - **mutate**: Text-to-text graph edits (nodes and edges)

pub mod errors;
pub mod eval;
pub mod graph;
pub mod linear;
pub mod model;
pub mod mutate;
