//! Causal analysis over the dependency graph.
//!
//! This module provides:
//! - **dsep**: D-separation based edge classification for confounding control

pub mod dsep;
