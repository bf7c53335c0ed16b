//! # Linear-Form Utilities
//!
//! Detection and manipulation of affine expressions: `c1*V1 + ... + ck*Vk + c0`.
//!
//! A [`LinearSummary`] exists if and only if the expression reduces to an
//! affine combination of identifiers: literals, identifiers, unary `+`/`-`,
//! and `+ - * /` where at least one factor of every `*` (and the divisor of
//! every `/`) is a pure constant. Anything else — variable×variable
//! products, variables in divisors, calls, comparisons, ternaries, `%`, `^`
//! — is non-linear and yields `None`.
//!
//! Term order is first-seen order, kept explicitly so that re-serialization
//! is deterministic and diagram edits do not shuffle unrelated terms.

use rustc_hash::FxHashMap;

use crate::frontend::ast::{BinaryOp, ExprAst, UnaryOp};
use crate::frontend::registry::lookup_constant;

/// Coefficients below this magnitude are treated as zero and dropped.
pub const COEFF_EPSILON: f64 = 1e-10;

/// An affine expression: per-variable coefficients plus a constant.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearSummary {
    /// Coefficient per variable
    pub terms: FxHashMap<String, f64>,
    /// Variables in first-seen order, for deterministic re-serialization
    pub order: Vec<String>,
    /// The constant term
    pub constant: f64,
}

impl LinearSummary {
    /// The coefficient of `var`, 0 if absent.
    pub fn coefficient(&self, var: &str) -> f64 {
        self.terms.get(var).copied().unwrap_or(0.0)
    }

    /// True when the summary has no variable terms (a pure constant).
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    fn add_term(&mut self, var: &str, coef: f64) {
        match self.terms.get_mut(var) {
            Some(existing) => *existing += coef,
            None => {
                self.order.push(var.to_string());
                self.terms.insert(var.to_string(), coef);
            }
        }
    }

    fn scale(&mut self, k: f64) {
        for coef in self.terms.values_mut() {
            *coef *= k;
        }
        self.constant *= k;
    }

    fn accumulate(&mut self, other: &LinearSummary, sign: f64) {
        for var in &other.order {
            self.add_term(var, sign * other.coefficient(var));
        }
        self.constant += sign * other.constant;
    }

    /// Drops terms whose coefficient magnitude is below [`COEFF_EPSILON`].
    fn prune(&mut self) {
        self.order
            .retain(|var| self.terms.get(var).map(|c| c.abs() >= COEFF_EPSILON).unwrap_or(false));
        self.terms.retain(|_, c| c.abs() >= COEFF_EPSILON);
    }
}

/// Reduces an expression to a [`LinearSummary`], or `None` when it is not
/// provably affine.
pub fn get_linear_summary(expr: &ExprAst) -> Option<LinearSummary> {
    let mut summary = reduce(expr)?;
    summary.prune();
    Some(summary)
}

fn reduce(expr: &ExprAst) -> Option<LinearSummary> {
    match expr {
        ExprAst::Number(value) => Some(LinearSummary {
            constant: *value,
            ..LinearSummary::default()
        }),
        ExprAst::Ident(name) => {
            let mut summary = LinearSummary::default();
            // registry constants fold into the constant term
            if let Some(c) = lookup_constant(name) {
                summary.constant = c;
            } else {
                summary.add_term(name, 1.0);
            }
            Some(summary)
        }
        ExprAst::Unary { op, expr } => match op {
            UnaryOp::Neg => {
                let mut inner = reduce(expr)?;
                inner.scale(-1.0);
                Some(inner)
            }
            UnaryOp::Not => None,
        },
        ExprAst::Binary { op, left, right } => {
            let l = reduce(left)?;
            let r = reduce(right)?;
            match op {
                BinaryOp::Add | BinaryOp::Sub => {
                    let sign = if *op == BinaryOp::Sub { -1.0 } else { 1.0 };
                    let mut out = l;
                    out.accumulate(&r, sign);
                    Some(out)
                }
                BinaryOp::Mul => {
                    // one side must be a pure constant
                    if r.is_constant() {
                        let mut out = l;
                        out.scale(r.constant);
                        Some(out)
                    } else if l.is_constant() {
                        let mut out = r;
                        out.scale(l.constant);
                        Some(out)
                    } else {
                        None
                    }
                }
                BinaryOp::Div => {
                    // divisor must be a pure, non-vanishing constant
                    if r.is_constant() && r.constant.abs() >= COEFF_EPSILON {
                        let mut out = l;
                        out.scale(1.0 / r.constant);
                        Some(out)
                    } else {
                        None
                    }
                }
                _ => None,
            }
        }
        ExprAst::Conditional { .. } | ExprAst::Call { .. } => None,
    }
}

/// Sets or removes one variable's coefficient.
///
/// Near-zero coefficients remove the term; new terms append to the end of
/// the order, preserving first-seen positions of existing terms.
pub fn update_linear_coefficient(summary: &mut LinearSummary, var: &str, coefficient: f64) {
    if coefficient.abs() < COEFF_EPSILON {
        summary.terms.remove(var);
        summary.order.retain(|v| v != var);
        return;
    }
    if summary.terms.insert(var.to_string(), coefficient).is_none() {
        summary.order.push(var.to_string());
    }
}

/// Serializes a summary back to expression text.
///
/// Terms in `order`, coefficients of exactly 1 elided, ` + `/` - `
/// separators, the constant last when its rounded rendering is nonzero.
/// Numbers round to 4 decimal places with trailing zeros trimmed. An empty
/// summary serializes to `"0"`.
pub fn build_linear_expression(summary: &LinearSummary) -> String {
    let mut out = String::new();
    for var in &summary.order {
        let coef = summary.coefficient(var);
        if coef.abs() < COEFF_EPSILON {
            continue;
        }
        if out.is_empty() {
            if coef == 1.0 {
                out.push_str(var);
            } else if coef == -1.0 {
                out.push('-');
                out.push_str(var);
            } else {
                out.push_str(&format!("{}*{}", format_number(coef), var));
            }
        } else {
            out.push_str(if coef < 0.0 { " - " } else { " + " });
            let magnitude = coef.abs();
            if magnitude == 1.0 {
                out.push_str(var);
            } else {
                out.push_str(&format!("{}*{}", format_number(magnitude), var));
            }
        }
    }

    let constant = format_number(summary.constant);
    if constant != "0" {
        if out.is_empty() {
            out = constant;
        } else if summary.constant < 0.0 {
            out.push_str(" - ");
            out.push_str(&format_number(summary.constant.abs()));
        } else {
            out.push_str(" + ");
            out.push_str(&constant);
        }
    }

    if out.is_empty() {
        out.push('0');
    }
    out
}

/// Formats a number rounded to 4 decimal places, trailing zeros trimmed.
pub fn format_number(value: f64) -> String {
    let mut s = format!("{:.4}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
