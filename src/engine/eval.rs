//! # Evaluator / Propagator
//!
//! Single-pass numeric evaluation of a model in topological order, with
//! support for clamped ("do()") interventions and injected per-node noise.
//!
//! ## Scope resolution
//!
//! Identifiers resolve through an explicit [`Scope`] struct, not any dynamic
//! fallback: missing variables are 0, the special `error` identifier takes
//! the injected noise value for the variable currently being evaluated, and
//! registry constants resolve to their fixed values.
//!
//! ## Semantics
//!
//! Arithmetic is plain IEEE-754 (division by zero yields an infinity, as in
//! the source system); comparisons and logical operators return 1.0/0.0 with
//! truthiness defined as "non-zero". Evaluation is deterministic: identical
//! inputs produce bit-identical outputs. The only randomness in the system
//! lives in external samplers that supply the [`NoiseState`].

use rustc_hash::FxHashMap;

use crate::engine::errors::ScmError;
use crate::engine::graph::{noise_id, topo_sort};
use crate::engine::model::{DepGraph, Model};
use crate::frontend::ast::{BinaryOp, ExprAst, UnaryOp};
use crate::frontend::registry::{lookup_constant, lookup_function, ERROR_IDENT};

/// Injected noise values, keyed by noise-node id (`noise:<var>`).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseState {
    /// Noise value per noise node
    pub by_node: FxHashMap<String, f64>,
}

impl NoiseState {
    /// The injected noise value for a real variable, defaulting to 0.
    pub fn value_for(&self, var: &str) -> f64 {
        self.by_node.get(&noise_id(var)).copied().unwrap_or(0.0)
    }
}

/// Identifier resolution for one variable's evaluation.
struct Scope<'a> {
    values: &'a FxHashMap<String, f64>,
    /// Value the special `error` identifier resolves to for this variable
    error_value: f64,
}

impl Scope<'_> {
    fn resolve(&self, name: &str) -> f64 {
        if name == ERROR_IDENT {
            return self.error_value;
        }
        if let Some(c) = lookup_constant(name) {
            return c;
        }
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// Evaluates every variable once, in topological order.
///
/// The output map is seeded from `current_values` (unseen variables default
/// to 0). Clamped variables keep their seeded value and their expression is
/// skipped; that is the "do()" intervention. Variables without an expression
/// (derived or empty) take their injected noise value, else 0.
///
/// # Errors
///
/// * `ScmError::Cycle` - the dependency graph is not a DAG
/// * `ScmError::Evaluation` - an expression failed, wrapped with the
///   variable name and its source text
pub fn compute_values(
    model: &Model,
    eqs: &DepGraph,
    current_values: &FxHashMap<String, f64>,
    clamp: &FxHashMap<String, bool>,
    noise: Option<&NoiseState>,
) -> Result<FxHashMap<String, f64>, ScmError> {
    let order = topo_sort(eqs)?;

    let mut values: FxHashMap<String, f64> = FxHashMap::default();
    for var in model.vars() {
        values.insert(
            var.clone(),
            current_values.get(var).copied().unwrap_or(0.0),
        );
    }

    for var in &order {
        if clamp.get(var).copied().unwrap_or(false) {
            continue;
        }
        let noise_value = noise.map(|n| n.value_for(var)).unwrap_or(0.0);
        let entry = match model.get(var) {
            Some(entry) => entry,
            None => continue,
        };
        let value = match &entry.expr {
            None => noise_value,
            Some(expr) => {
                let scope = Scope {
                    values: &values,
                    error_value: noise_value,
                };
                eval_expr(expr, &scope).map_err(|e| ScmError::Evaluation {
                    variable: var.clone(),
                    source: entry.source_text.clone(),
                    message: e.to_string(),
                })?
            }
        };
        values.insert(var.clone(), value);
    }

    Ok(values)
}

/// Evaluates a binary operation on two numeric values.
///
/// Single source of truth for binary operator semantics across the
/// evaluator and tests.
pub fn eval_binary_op(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Mod => left % right,
        BinaryOp::Pow => left.powf(right),
        BinaryOp::Eq => bool_to_num(left == right),
        BinaryOp::Ne => bool_to_num(left != right),
        BinaryOp::Lt => bool_to_num(left < right),
        BinaryOp::Le => bool_to_num(left <= right),
        BinaryOp::Gt => bool_to_num(left > right),
        BinaryOp::Ge => bool_to_num(left >= right),
        BinaryOp::And => bool_to_num(is_truthy(left) && is_truthy(right)),
        BinaryOp::Or => bool_to_num(is_truthy(left) || is_truthy(right)),
    }
}

/// Evaluates a unary operation on a numeric value.
pub fn eval_unary_op(op: UnaryOp, value: f64) -> f64 {
    match op {
        UnaryOp::Neg => -value,
        UnaryOp::Not => bool_to_num(!is_truthy(value)),
    }
}

fn is_truthy(v: f64) -> bool {
    v != 0.0
}

fn bool_to_num(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn eval_expr(expr: &ExprAst, scope: &Scope) -> Result<f64, ScmError> {
    match expr {
        ExprAst::Number(value) => Ok(*value),
        ExprAst::Ident(name) => Ok(scope.resolve(name)),
        ExprAst::Unary { op, expr } => Ok(eval_unary_op(*op, eval_expr(expr, scope)?)),
        ExprAst::Binary { op, left, right } => Ok(eval_binary_op(
            *op,
            eval_expr(left, scope)?,
            eval_expr(right, scope)?,
        )),
        ExprAst::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            if is_truthy(eval_expr(cond, scope)?) {
                eval_expr(then_branch, scope)
            } else {
                eval_expr(else_branch, scope)
            }
        }
        ExprAst::Call { name, args } => {
            // the parser only admits registry functions; re-check defensively
            let func = lookup_function(name)
                .ok_or_else(|| ScmError::Internal(format!("unknown function '{}'", name)))?;
            let arg = args
                .first()
                .ok_or_else(|| ScmError::Internal(format!("'{}' called without argument", name)))?;
            Ok(func(eval_expr(arg, scope)?))
        }
    }
}
