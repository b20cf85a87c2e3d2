//! Symbolic higher-order differentiation: parse a whitelisted expression, differentiate it
//! `n` times with simplification after every step, and render the result or the full trace.

pub mod calculus;
pub mod cli;
pub mod derivative;
pub mod error;
pub mod expr;
pub mod format;
pub mod functions;
pub mod parser;
pub mod simplify;

pub use calculus::differentiate;
pub use derivative::{
    Config, Derivative, DerivativeRequest, DiffError, StepTrace, build, calculate_derivative,
    parse_order, run, validate,
};
pub use error::{CasError, Result};
pub use expr::{Expr, Func, Rational, add, div, mul, neg, one, pow, rational, sub, zero};
pub use format::{RenderMode, latex, pretty, step_table};
pub use functions::{FunctionSpec, FunctionTable, standard_table};
pub use parser::parse_expr;
pub use simplify::{canonicalize, factor_common, simplify, simplify_with_limit};
