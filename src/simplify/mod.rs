//! Algebraic simplification: canonical expansion followed by common-factor extraction.

mod factor;
mod rules;

use crate::error::Result;
use crate::expr::{Expr, check_size};

pub use factor::factor_common;
pub use rules::{
    canonicalize, simplify_add, simplify_call, simplify_div, simplify_mul, simplify_neg,
    simplify_pow, simplify_sub,
};

/// Upper bound on canonicalize/factor rounds before the current form is accepted.
pub const SIMPLIFY_PASS_LIMIT: usize = 16;

/// Simplify to a fixpoint, so `simplify(simplify(e)) == simplify(e)`.
pub fn simplify(expr: Expr) -> Result<Expr> {
    simplify_with_limit(expr, SIMPLIFY_PASS_LIMIT)
}

pub fn simplify_with_limit(expr: Expr, max_passes: usize) -> Result<Expr> {
    let mut current = expr;
    for _ in 0..max_passes {
        let next = factor_common(canonicalize(current.clone())?)?;
        check_size(&next)?;
        if next == current {
            return Ok(next);
        }
        current = next;
    }
    tracing::warn!(passes = max_passes, "simplification did not settle");
    Ok(current)
}
