//! # SCM Mutation Engine
//!
//! Text-to-text graph edits: add/rename/remove a node, remove or re-weight
//! an edge. Every operation takes an immutable text snapshot, re-validates
//! identifiers, and returns new text; failures leave the input untouched
//! (all-or-nothing).
//!
//! ## Linear vs. textual rewriting
//!
//! When a right-hand side reduces to a linear summary, term edits go through
//! the summary and re-serialize deterministically. When it does not (calls,
//! products of variables, ternaries), the engine falls back to whole-word
//! textual substitution and then round-trips the result through the parser
//! to guarantee the output is still syntactically valid. This exact boundary
//! is deliberate: structural edits where coefficients are well-defined,
//! text substitution where they are not.

use std::sync::LazyLock;

use regex::Regex;

use crate::engine::errors::ScmError;
use crate::engine::linear::{
    build_linear_expression, get_linear_summary, update_linear_coefficient, LinearSummary,
};
use crate::engine::model::Model;
use crate::frontend::parser::{parse_expression, parse_scm};
use crate::frontend::registry::is_reserved_ident;

static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles")
});

/// Options for [`upsert_edge_coefficient`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOptions {
    /// Require the parent term to already exist in the child's equation.
    ///
    /// Guards UIs that intend to re-weight an existing arrow against
    /// accidentally introducing a new one.
    pub require_existing_term: bool,
}

/// Appends a new node `name = 0`.
///
/// # Errors
///
/// * `ScmError::Mutation` - invalid or reserved identifier, or `name`
///   already assigned
pub fn add_node(text: &str, name: &str) -> Result<String, ScmError> {
    validate_new_ident(name)?;
    let model = parse_scm(text)?;
    if model.is_assigned(name) {
        return Err(ScmError::Mutation(format!(
            "variable '{}' already exists",
            name
        )));
    }
    let mut statements = statements_of(&model);
    statements.push(format!("{} = 0", name));
    Ok(statements.join("\n"))
}

/// Renames a node everywhere: its assignment and every whole-word reference.
///
/// # Errors
///
/// * `ScmError::Mutation` - invalid or reserved identifier, `from` absent
///   (neither assigned nor referenced), or `to` already present
pub fn rename_node(text: &str, from: &str, to: &str) -> Result<String, ScmError> {
    validate_ident(from)?;
    validate_new_ident(to)?;
    let model = parse_scm(text)?;
    if !model.contains(from) {
        return Err(ScmError::Mutation(format!("unknown variable '{}'", from)));
    }
    if model.contains(to) {
        return Err(ScmError::Mutation(format!(
            "variable '{}' already exists",
            to
        )));
    }

    let mut statements = Vec::new();
    for (name, entry) in model.iter() {
        if entry.is_derived {
            continue;
        }
        let lhs = if name == from { to } else { name.as_str() };
        let rhs = replace_whole_word(&entry.source_text, from, to);
        parse_expression(&rhs)?;
        statements.push(format!("{} = {}", lhs, rhs));
    }
    Ok(statements.join("\n"))
}

/// Removes a node: drops its assignment and zeroes its term in every other
/// equation (via the linear summary when possible, textual substitution
/// otherwise). Parents of the removed node that would vanish from the
/// variable set are re-added as `parent = 0`.
///
/// # Errors
///
/// * `ScmError::Mutation` - invalid identifier or unknown variable
pub fn remove_node(text: &str, name: &str) -> Result<String, ScmError> {
    validate_ident(name)?;
    let model = parse_scm(text)?;
    if !model.contains(name) {
        return Err(ScmError::Mutation(format!("unknown variable '{}'", name)));
    }
    let orphan_candidates: Vec<String> = model
        .get(name)
        .map(|e| e.dependencies.clone())
        .unwrap_or_default();

    let mut statements = Vec::new();
    for (var, entry) in model.iter() {
        if var == name || entry.is_derived {
            continue;
        }
        if entry.dependencies.iter().any(|d| d == name) {
            let rhs = zero_term(entry.expr.as_ref(), &entry.source_text, name)?;
            statements.push(format!("{} = {}", var, rhs));
        } else {
            statements.push(format!("{} = {}", var, entry.source_text));
        }
    }

    let mut out = statements.join("\n");
    out = readd_vanished(out, orphan_candidates.iter().filter(|d| d.as_str() != name))?;
    Ok(out)
}

/// Removes the edge `parent -> child` by zeroing the parent's term in the
/// child's equation. Re-adds `parent = 0` when the parent would otherwise
/// disappear from the variable set.
///
/// # Errors
///
/// * `ScmError::Mutation` - invalid identifier, or no such term in the
///   child's equation
pub fn remove_edge(text: &str, parent: &str, child: &str) -> Result<String, ScmError> {
    validate_ident(parent)?;
    validate_ident(child)?;
    let model = parse_scm(text)?;
    let entry = model
        .get(child)
        .filter(|e| !e.is_derived)
        .ok_or_else(|| ScmError::Mutation(format!("unknown variable '{}'", child)))?;
    if !entry.dependencies.iter().any(|d| d == parent) {
        return Err(ScmError::Mutation(format!(
            "no edge '{}->{}'",
            parent, child
        )));
    }

    let mut statements = Vec::new();
    for (var, e) in model.iter() {
        if e.is_derived {
            continue;
        }
        if var == child {
            let rhs = zero_term(e.expr.as_ref(), &e.source_text, parent)?;
            statements.push(format!("{} = {}", var, rhs));
        } else {
            statements.push(format!("{} = {}", var, e.source_text));
        }
    }

    let out = statements.join("\n");
    readd_vanished(out, std::iter::once(&parent.to_string()))
}

/// Sets the linear coefficient of `parent` in `child`'s equation.
///
/// Creates `child`'s equation when absent (unless
/// [`UpsertOptions::require_existing_term`]); appends `parent = 0` when the
/// parent is not otherwise a node in the diagram.
///
/// # Errors
///
/// * `ScmError::Mutation` - invalid identifier, non-linear target equation,
///   or a missing term when `require_existing_term` is set
pub fn upsert_edge_coefficient(
    text: &str,
    parent: &str,
    child: &str,
    coefficient: f64,
    opts: UpsertOptions,
) -> Result<String, ScmError> {
    validate_ident(parent)?;
    validate_ident(child)?;
    let model = parse_scm(text)?;

    let new_child_rhs = match model.get(child).filter(|e| !e.is_derived) {
        None => {
            if opts.require_existing_term {
                return Err(ScmError::Mutation(format!(
                    "no existing term '{}' in equation for '{}'",
                    parent, child
                )));
            }
            let mut summary = LinearSummary::default();
            update_linear_coefficient(&mut summary, parent, coefficient);
            build_linear_expression(&summary)
        }
        Some(entry) => {
            let expr = entry
                .expr
                .as_ref()
                .ok_or_else(|| ScmError::Internal(format!("assigned '{}' has no expression", child)))?;
            let mut summary = get_linear_summary(expr).ok_or_else(|| {
                ScmError::Mutation(format!("equation for '{}' is not linear", child))
            })?;
            if opts.require_existing_term && !summary.terms.contains_key(parent) {
                return Err(ScmError::Mutation(format!(
                    "no existing term '{}' in equation for '{}'",
                    parent, child
                )));
            }
            update_linear_coefficient(&mut summary, parent, coefficient);
            build_linear_expression(&summary)
        }
    };

    let mut statements = Vec::new();
    let mut child_written = false;
    for (var, e) in model.iter() {
        if e.is_derived {
            continue;
        }
        if var == child {
            statements.push(format!("{} = {}", var, new_child_rhs));
            child_written = true;
        } else {
            statements.push(format!("{} = {}", var, e.source_text));
        }
    }
    if !child_written {
        statements.push(format!("{} = {}", child, new_child_rhs));
    }

    let out = statements.join("\n");
    readd_vanished(out, std::iter::once(&parent.to_string()))
}

/// Zeroes one variable's contribution to a right-hand side.
///
/// Linear equations drop the term via the summary; everything else gets
/// whole-word substitution with `0`, then a parse round-trip.
fn zero_term(
    expr: Option<&crate::frontend::ast::ExprAst>,
    source_text: &str,
    name: &str,
) -> Result<String, ScmError> {
    if let Some(mut summary) = expr.and_then(get_linear_summary) {
        update_linear_coefficient(&mut summary, name, 0.0);
        return Ok(build_linear_expression(&summary));
    }
    let substituted = replace_whole_word(source_text, name, "0");
    parse_expression(&substituted)?;
    Ok(substituted)
}

/// Re-adds `var = 0` for every candidate that vanished from the variable
/// set of the (re-parsed) text.
fn readd_vanished<'a>(
    text: String,
    candidates: impl Iterator<Item = &'a String>,
) -> Result<String, ScmError> {
    let model = parse_scm(&text)?;
    let mut out = text;
    for var in candidates {
        if !model.contains(var) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("{} = 0", var));
        }
    }
    Ok(out)
}

fn validate_ident(name: &str) -> Result<(), ScmError> {
    if IDENT_RE.is_match(name) {
        Ok(())
    } else {
        Err(ScmError::Mutation(format!("invalid identifier '{}'", name)))
    }
}

/// Like [`validate_ident`], but also rejects reserved names. Introducing a
/// variable named `error`, `PI`, or `sin` would silently change how existing
/// references resolve.
fn validate_new_ident(name: &str) -> Result<(), ScmError> {
    validate_ident(name)?;
    if is_reserved_ident(name) {
        return Err(ScmError::Mutation(format!(
            "'{}' is a reserved name",
            name
        )));
    }
    Ok(())
}

fn replace_whole_word(text: &str, from: &str, to: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(from));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, to).into_owned(),
        // escaped identifiers always compile; fall through untouched if not
        Err(_) => text.to_string(),
    }
}

/// Reconstructs one statement line per assigned variable, in model order.
fn statements_of(model: &Model) -> Vec<String> {
    model
        .iter()
        .filter(|(_, e)| !e.is_derived)
        .map(|(name, e)| format!("{} = {}", name, e.source_text))
        .collect()
}
