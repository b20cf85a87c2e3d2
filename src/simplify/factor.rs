use crate::error::Result;
use crate::expr::Expr;
use num_traits::{Signed, Zero};

use super::rules::{
    Monomial, Powers, decompose, flatten_sum, mk_add_list, power_factor, product_of, sum_of,
};

/// Pull the symbolic factors shared by every term of each sum out in front of it.
///
/// `exp(x)*cos(x) - exp(x)*sin(x)` becomes `exp(x)*(cos(x) - sin(x))`. Numeric content
/// is left inside the sum; a leading minus is extracted only when every term is negative.
pub fn factor_common(expr: Expr) -> Result<Expr> {
    Ok(match expr {
        e if e.is_sum() => factor_sum(&e)?,
        Expr::Mul(a, b) => Expr::Mul(factor_common(*a)?.boxed(), factor_common(*b)?.boxed()),
        Expr::Div(a, b) => Expr::Div(factor_common(*a)?.boxed(), factor_common(*b)?.boxed()),
        Expr::Pow(a, b) => Expr::Pow(factor_common(*a)?.boxed(), factor_common(*b)?.boxed()),
        Expr::Neg(a) => Expr::Neg(factor_common(*a)?.boxed()),
        Expr::Call(func, a) => Expr::Call(func, factor_common(*a)?.boxed()),
        other => other,
    })
}

fn factor_sum(sum: &Expr) -> Result<Expr> {
    let terms = flatten_sum(sum)
        .into_iter()
        .map(factor_common)
        .collect::<Result<Vec<_>>>()?;
    let monomials: Vec<Monomial> = terms.iter().map(decompose).collect();

    let common = shared_powers(&monomials);
    if common.is_empty() || terms.len() < 2 {
        return Ok(mk_add_list(terms));
    }

    let all_negative = monomials.iter().all(|m| m.coeff.is_negative());
    let remainder = sum_of(monomials.into_iter().map(|mut m| {
        for (base, exp) in &common {
            m.insert(base.clone(), -exp.clone());
        }
        if all_negative {
            m.coeff = -m.coeff;
        }
        m.powers.retain(|_, e| !e.is_zero());
        m.into_expr()
    }));
    let remainder = factor_common(remainder)?;

    if !remainder.is_sum() {
        let mut outer = Monomial::one();
        outer.powers = common;
        if all_negative {
            outer.coeff = -outer.coeff;
        }
        return product_of(vec![outer.into_expr(), remainder]);
    }

    let product = common
        .into_iter()
        .map(|(base, exp)| power_factor(base, exp))
        .chain(std::iter::once(remainder))
        .reduce(|acc, f| Expr::Mul(acc.boxed(), f.boxed()))
        .unwrap_or_else(crate::expr::one);
    Ok(if all_negative {
        Expr::Neg(product.boxed())
    } else {
        product
    })
}

// Bases present in every term, each at its smallest exponent.
fn shared_powers(monomials: &[Monomial]) -> Powers {
    let Some((first, rest)) = monomials.split_first() else {
        return Powers::new();
    };
    let mut common = first.powers.clone();
    for m in rest {
        common.retain(|base, exp| match m.powers.get(base) {
            Some(k) => {
                if *k < *exp {
                    *exp = k.clone();
                }
                true
            }
            None => false,
        });
    }
    common
}
