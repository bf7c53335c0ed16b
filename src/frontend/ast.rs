//! # Abstract Syntax Tree
//!
//! AST data structures for the SCM expression language.
//!
//! An SCM source text is a list of assignment statements, `IDENT = EXPR`,
//! separated by newlines or semicolons. Each right-hand side parses into an
//! [`ExprAst`] tree.
//!
//! ## Expression AST
//!
//! Expressions support:
//! - Numeric literals (f64, parsed at parse time)
//! - Identifiers (variables, registry constants, the special `error` name)
//! - Unary operations: negation, logical not (unary `+` is folded away)
//! - Binary operations: arithmetic (`+ - * / % ^`), comparison, logical
//! - Ternary conditionals (`cond ? a : b`)
//! - Calls to the closed set of registry functions
//!
//! The node set is a closed tagged union; every consumer (evaluator,
//! linear-form reduction, dependency extraction) matches exhaustively.

/// An expression in the SCM assignment language.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprAst {
    /// Numeric literal (f64)
    Number(f64),
    /// Identifier reference: a variable, a registry constant, or `error`
    Ident(String),
    /// Unary operation (negation, logical not)
    Unary {
        /// The unary operator
        op: UnaryOp,
        /// The operand expression
        expr: Box<ExprAst>,
    },
    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        /// The binary operator
        op: BinaryOp,
        /// The left operand
        left: Box<ExprAst>,
        /// The right operand
        right: Box<ExprAst>,
    },
    /// Ternary conditional (`cond ? then : else`)
    Conditional {
        /// The condition expression
        cond: Box<ExprAst>,
        /// Value when the condition is truthy (non-zero)
        then_branch: Box<ExprAst>,
        /// Value when the condition is zero
        else_branch: Box<ExprAst>,
    },
    /// Call to a registry function, e.g. `abs(X)`
    Call {
        /// Canonical (lowercase) function name
        name: String,
        /// Argument expressions
        args: Vec<ExprAst>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Arithmetic negation (-)
    Neg,
    /// Logical negation (!)
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Remainder (%)
    Mod,
    /// Power (^), right-associative
    Pow,
    /// Equality (==)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Logical and (&&)
    And,
    /// Logical or (||)
    Or,
}
