//! # Expression Registry
//!
//! The closed sets of names the expression language may reference beyond the
//! user's own variables:
//!
//! - Functions `{abs, sin, cos, log, exp}` (case-insensitive; `log` is the
//!   natural logarithm), all unary
//! - Constants `{PI, E}`
//! - The special identifier `error`, which the evaluator resolves from the
//!   caller-supplied noise scope rather than from this registry
//!
//! Pure lookup tables, no state. Operator precedence lives entirely in the
//! static Pest grammar, so there is no runtime grammar configuration.

/// The special identifier resolved from the per-node noise scope.
pub const ERROR_IDENT: &str = "error";

/// Looks up an allowed function by name (case-insensitive).
///
/// Returns the numeric implementation, or `None` for names outside the
/// closed function set. All registry functions are unary.
pub fn lookup_function(name: &str) -> Option<fn(f64) -> f64> {
    match name.to_ascii_lowercase().as_str() {
        "abs" => Some(f64::abs),
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "log" => Some(f64::ln),
        "exp" => Some(f64::exp),
        _ => None,
    }
}

/// Returns true if `name` is an allowed function name (case-insensitive).
pub fn is_function_name(name: &str) -> bool {
    lookup_function(name).is_some()
}

/// Looks up a registry constant by exact name.
pub fn lookup_constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        _ => None,
    }
}

/// Returns true if `name` is reserved: a function name, a constant, or the
/// special `error` identifier. Reserved names are excluded from dependency
/// extraction.
pub fn is_reserved_ident(name: &str) -> bool {
    name == ERROR_IDENT || is_function_name(name) || lookup_constant(name).is_some()
}
