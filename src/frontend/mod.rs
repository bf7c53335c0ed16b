//! The frontend module handles parsing of SCM source text.
//!
//! This module provides:
//! - **parser**: Transforms source text into expression trees and a [`crate::engine::model::Model`]
//! - **ast**: Type definitions for the expression AST
//! - **registry**: The closed sets of allowed functions, constants, and the special `error` identifier

pub mod ast;
pub mod parser;
pub mod registry;
