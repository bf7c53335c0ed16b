//! Statistical utilities for the scatter-overlay panel.
//!
//! This module provides:
//! - **regress**: OLS fitting, residualization against controls, LOESS smoothing

pub mod regress;
