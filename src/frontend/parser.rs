//! # SCM Parser
//!
//! Parser for SCM source text using the Pest parser generator.
//!
//! ## Overview
//!
//! An SCM source is a list of assignment statements, `IDENT = EXPR`,
//! separated by newlines or semicolons. Statement splitting happens before
//! the grammar is applied, so parse failures are reported per statement
//! (`Cannot parse: '<line>'`).
//!
//! Parsing a full source produces a [`Model`]: one entry per variable with
//! its expression tree, extracted dependencies, and original right-hand-side
//! text. Variables that are referenced but never assigned are hoisted into
//! derived entries (implicit constant 0) so that every name appearing
//! anywhere has exactly one entry.
//!
//! ## Grammar
//!
//! The grammar is defined in `grammar/scm.pest` using Pest's PEG syntax.
//! Operator precedence is encoded in the grammar rules; there is no runtime
//! grammar configuration.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::engine::errors::ScmError;
use crate::engine::model::{Model, VarEntry};
use crate::frontend::ast::{BinaryOp, ExprAst, UnaryOp};
use crate::frontend::registry::{is_reserved_ident, lookup_function};

#[derive(Parser)]
#[grammar = "grammar/scm.pest"]
struct ScmParser;

/// One parsed assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The assigned variable name (left-hand side)
    pub name: String,
    /// The parsed right-hand-side expression
    pub expr: ExprAst,
    /// The right-hand-side source text, trimmed
    pub rhs_src: String,
}

/// Splits SCM source text into raw statements.
///
/// Statements are separated by newlines or semicolons; blank statements are
/// skipped. The returned slices are trimmed.
pub fn split_statements(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parses a single `IDENT = EXPR` statement.
///
/// # Errors
///
/// * `ScmError::Parse` - malformed statement (`Cannot parse: '<line>'`),
///   unknown function, or wrong function arity
pub fn parse_statement(line: &str) -> Result<Statement, ScmError> {
    let mut pairs = ScmParser::parse(Rule::statement, line)
        .map_err(|_| ScmError::Parse(format!("Cannot parse: '{}'", line)))?;
    let stmt = pairs
        .next()
        .ok_or_else(|| ScmError::Internal("empty statement parse".into()))?;
    let mut inner = stmt.into_inner();
    let name_pair = inner
        .next()
        .ok_or_else(|| ScmError::Internal("statement without identifier".into()))?;
    let expr_pair = inner
        .next()
        .ok_or_else(|| ScmError::Internal("statement without expression".into()))?;
    let rhs_src = expr_pair.as_str().trim().to_string();
    let expr = build_expr(expr_pair)?;
    Ok(Statement {
        name: name_pair.as_str().to_string(),
        expr,
        rhs_src,
    })
}

/// Parses a standalone expression (no `IDENT =` prefix).
///
/// Used by the mutation engine to validate rewritten right-hand sides.
pub fn parse_expression(src: &str) -> Result<ExprAst, ScmError> {
    let mut pairs = ScmParser::parse(Rule::expr_only, src)
        .map_err(|_| ScmError::Parse(format!("Cannot parse: '{}'", src)))?;
    let root = pairs
        .next()
        .ok_or_else(|| ScmError::Internal("empty expression parse".into()))?;
    let inner = root
        .into_inner()
        .next()
        .ok_or_else(|| ScmError::Internal("expression without body".into()))?;
    build_expr(inner)
}

/// Parses full SCM source text into a [`Model`].
///
/// Statements are parsed in order; after all assignments, every dependency
/// name that lacks its own assignment is hoisted into a derived entry with
/// no expression (implicit 0) and no dependencies.
///
/// # Errors
///
/// * `ScmError::Parse` - malformed statement, duplicate left-hand side,
///   unknown or mis-applied function
pub fn parse_scm(text: &str) -> Result<Model, ScmError> {
    let mut model = Model::default();
    for raw in split_statements(text) {
        let stmt = parse_statement(raw)?;
        if model.is_assigned(&stmt.name) {
            return Err(ScmError::Parse(format!(
                "Duplicate variable '{}'",
                stmt.name
            )));
        }
        let dependencies = extract_dependencies(&stmt.expr);
        model.insert(
            stmt.name,
            VarEntry {
                expr: Some(stmt.expr),
                dependencies,
                source_text: stmt.rhs_src,
                is_derived: false,
            },
        );
    }
    model.hoist_derived();
    Ok(model)
}

/// Collects the free variables of an expression, first-seen order,
/// deduplicated.
///
/// Registry constants, function names, and the special `error` identifier
/// are excluded; function callees are syntactically separate from
/// identifiers and never appear here.
pub fn extract_dependencies(expr: &ExprAst) -> Vec<String> {
    let mut deps = Vec::new();
    collect_idents(expr, &mut deps);
    deps
}

fn collect_idents(expr: &ExprAst, out: &mut Vec<String>) {
    match expr {
        ExprAst::Number(_) => {}
        ExprAst::Ident(name) => {
            if !is_reserved_ident(name) && !out.iter().any(|d| d == name) {
                out.push(name.clone());
            }
        }
        ExprAst::Unary { expr, .. } => collect_idents(expr, out),
        ExprAst::Binary { left, right, .. } => {
            collect_idents(left, out);
            collect_idents(right, out);
        }
        ExprAst::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_idents(cond, out);
            collect_idents(then_branch, out);
            collect_idents(else_branch, out);
        }
        ExprAst::Call { args, .. } => {
            for arg in args {
                collect_idents(arg, out);
            }
        }
    }
}

fn build_expr(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    match pair.as_rule() {
        Rule::expr => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| ScmError::Internal("empty expr".into()))?;
            build_expr(inner)
        }
        Rule::conditional => build_conditional(pair),
        Rule::or_expr | Rule::and_expr | Rule::eq_expr | Rule::cmp_expr | Rule::add_expr
        | Rule::mul_expr => build_left_assoc(pair),
        Rule::pow_expr => build_pow(pair),
        Rule::unary_expr => build_unary(pair),
        Rule::primary => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| ScmError::Internal("empty primary".into()))?;
            build_expr(inner)
        }
        Rule::call => build_call(pair),
        Rule::number => {
            let value: f64 = pair
                .as_str()
                .parse()
                .map_err(|_| ScmError::Parse(format!("Invalid number '{}'", pair.as_str())))?;
            Ok(ExprAst::Number(value))
        }
        Rule::ident => Ok(ExprAst::Ident(pair.as_str().to_string())),
        other => Err(ScmError::Internal(format!(
            "unexpected grammar rule {:?}",
            other
        ))),
    }
}

fn build_conditional(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    let mut inner = pair.into_inner();
    let cond_pair = inner
        .next()
        .ok_or_else(|| ScmError::Internal("conditional without condition".into()))?;
    let cond = build_expr(cond_pair)?;
    match (inner.next(), inner.next()) {
        (Some(then_pair), Some(else_pair)) => Ok(ExprAst::Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(build_expr(then_pair)?),
            else_branch: Box::new(build_expr(else_pair)?),
        }),
        _ => Ok(cond),
    }
}

/// Builds a left-associative operator chain: `a op b op c` nests as
/// `(a op b) op c`.
fn build_left_assoc(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| ScmError::Internal("empty operator chain".into()))?;
    let mut node = build_expr(first)?;
    while let Some(op_pair) = inner.next() {
        let rhs_pair = inner
            .next()
            .ok_or_else(|| ScmError::Internal("operator without right operand".into()))?;
        let op = binary_op_from_str(op_pair.as_str())?;
        node = ExprAst::Binary {
            op,
            left: Box::new(node),
            right: Box::new(build_expr(rhs_pair)?),
        };
    }
    Ok(node)
}

/// Builds a power chain right-associatively: `a ^ b ^ c` nests as
/// `a ^ (b ^ c)`.
fn build_pow(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    let mut operands = Vec::new();
    for p in pair.into_inner() {
        if p.as_rule() != Rule::pow_op {
            operands.push(build_expr(p)?);
        }
    }
    let mut node = operands
        .pop()
        .ok_or_else(|| ScmError::Internal("empty power chain".into()))?;
    while let Some(base) = operands.pop() {
        node = ExprAst::Binary {
            op: BinaryOp::Pow,
            left: Box::new(base),
            right: Box::new(node),
        };
    }
    Ok(node)
}

fn build_unary(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    let mut ops = Vec::new();
    let mut operand = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::un_op => ops.push(p.as_str().to_string()),
            _ => operand = Some(build_expr(p)?),
        }
    }
    let mut node =
        operand.ok_or_else(|| ScmError::Internal("unary without operand".into()))?;
    for op in ops.iter().rev() {
        node = match op.as_str() {
            "-" => ExprAst::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(node),
            },
            "!" => ExprAst::Unary {
                op: UnaryOp::Not,
                expr: Box::new(node),
            },
            // Unary plus is the identity
            "+" => node,
            other => {
                return Err(ScmError::Internal(format!(
                    "unexpected unary operator '{}'",
                    other
                )))
            }
        };
    }
    Ok(node)
}

fn build_call(pair: Pair<Rule>) -> Result<ExprAst, ScmError> {
    let mut inner = pair.into_inner();
    let name_pair = inner
        .next()
        .ok_or_else(|| ScmError::Internal("call without callee".into()))?;
    let raw_name = name_pair.as_str();
    if lookup_function(raw_name).is_none() {
        return Err(ScmError::Parse(format!("Unknown function '{}'", raw_name)));
    }
    let canonical = raw_name.to_ascii_lowercase();

    let mut args = Vec::new();
    if let Some(arg_list) = inner.next() {
        for arg in arg_list.into_inner() {
            args.push(build_expr(arg)?);
        }
    }
    if args.len() != 1 {
        return Err(ScmError::Parse(format!(
            "Function '{}' expects 1 argument, got {}",
            canonical,
            args.len()
        )));
    }
    Ok(ExprAst::Call {
        name: canonical,
        args,
    })
}

fn binary_op_from_str(op: &str) -> Result<BinaryOp, ScmError> {
    Ok(match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Mod,
        "^" => BinaryOp::Pow,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        "&&" => BinaryOp::And,
        "||" => BinaryOp::Or,
        other => {
            return Err(ScmError::Internal(format!(
                "unexpected binary operator '{}'",
                other
            )))
        }
    })
}
