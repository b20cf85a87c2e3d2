use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::error::{CasError, Result};
use crate::expr::{Expr, Func, Rational, one, zero};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

const DISTRIBUTE_TERM_LIMIT: usize = 64;
const MAX_EVALUATED_EXPONENT: u32 = 1024;

pub(crate) type Powers = BTreeMap<Expr, Rational>;

/// A product term viewed as `coeff * base1^e1 * base2^e2 * ...`, bases sorted.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Monomial {
    pub coeff: Rational,
    pub powers: Powers,
}

impl Monomial {
    pub fn one() -> Self {
        Monomial {
            coeff: Rational::one(),
            powers: Powers::new(),
        }
    }

    /// Multiply by `factor^exp` without looking inside non-product factors.
    fn absorb(&mut self, factor: &Expr, exp: &Rational) {
        match factor {
            Expr::Constant(c) if exp.is_one() => self.coeff *= c,
            Expr::Neg(inner) if exp.is_one() => {
                self.coeff = -self.coeff.clone();
                self.absorb(inner, exp);
            }
            Expr::Mul(a, b) if exp.is_one() => {
                self.absorb(a, exp);
                self.absorb(b, exp);
            }
            Expr::Div(a, b) if exp.is_one() => {
                self.absorb(a, exp);
                self.insert((**b).clone(), -Rational::one());
            }
            Expr::Pow(base, e) => match &**e {
                Expr::Constant(k) => self.insert((**base).clone(), k * exp),
                _ => self.insert(factor.clone(), exp.clone()),
            },
            other => self.insert(other.clone(), exp.clone()),
        }
    }

    pub fn insert(&mut self, base: Expr, exp: Rational) {
        let slot = self.powers.entry(base).or_insert_with(Rational::zero);
        *slot += exp;
    }

    pub fn into_expr(self) -> Expr {
        let factors: Vec<Expr> = self
            .powers
            .into_iter()
            .filter(|(_, e)| !e.is_zero())
            .map(|(b, e)| power_factor(b, e))
            .collect();
        term_from(&self.coeff, mk_mul_list(factors))
    }
}

/// Split a canonical term into its coefficient and sorted powers.
pub(crate) fn decompose(term: &Expr) -> Monomial {
    let mut m = Monomial::one();
    m.absorb(term, &Rational::one());
    m.powers.retain(|_, e| !e.is_zero());
    m
}

/// One canonicalization pass: expands products over sums, collects like terms,
/// merges exponents and applies the per-function rules.
pub fn canonicalize(expr: Expr) -> Result<Expr> {
    let mut cache = HashMap::new();
    canonical_cached(expr, &mut cache)
}

fn canonical_cached(expr: Expr, cache: &mut HashMap<Expr, Expr>) -> Result<Expr> {
    if let Some(hit) = cache.get(&expr) {
        return Ok(hit.clone());
    }

    let key = expr.clone();
    let result = match expr {
        Expr::Add(a, b) => simplify_add(canonical_cached(*a, cache)?, canonical_cached(*b, cache)?),
        Expr::Sub(a, b) => simplify_sub(canonical_cached(*a, cache)?, canonical_cached(*b, cache)?),
        Expr::Mul(a, b) => {
            simplify_mul(canonical_cached(*a, cache)?, canonical_cached(*b, cache)?)?
        }
        Expr::Div(a, b) => {
            simplify_div(canonical_cached(*a, cache)?, canonical_cached(*b, cache)?)?
        }
        Expr::Pow(a, b) => {
            simplify_pow(canonical_cached(*a, cache)?, canonical_cached(*b, cache)?)?
        }
        Expr::Neg(a) => simplify_neg(canonical_cached(*a, cache)?),
        Expr::Call(func, a) => simplify_call(func, canonical_cached(*a, cache)?)?,
        e => e,
    };

    cache.insert(key, result.clone());
    Ok(result)
}

pub fn simplify_add(x: Expr, y: Expr) -> Expr {
    sum_of(flatten_sum(&x).into_iter().chain(flatten_sum(&y)))
}

pub fn simplify_sub(x: Expr, y: Expr) -> Expr {
    simplify_add(x, simplify_neg(y))
}

pub fn simplify_neg(expr: Expr) -> Expr {
    sum_of(flatten_sum(&expr).iter().map(negate_term))
}

pub fn simplify_mul(x: Expr, y: Expr) -> Result<Expr> {
    product_of(vec![x, y])
}

pub fn simplify_div(x: Expr, y: Expr) -> Result<Expr> {
    let inverse = simplify_pow(y, Expr::integer(-1))?;
    product_of(vec![x, inverse])
}

pub fn simplify_pow(base: Expr, exp: Expr) -> Result<Expr> {
    match (base, exp) {
        (_, Expr::Constant(e)) if e.is_zero() => Ok(one()),
        (base, Expr::Constant(e)) if e.is_one() => Ok(base),
        (Expr::Constant(b), _) if b.is_one() => Ok(one()),
        (base, Expr::Constant(e)) => {
            let mut m = Monomial::one();
            match base {
                Expr::Pow(inner, inner_exp) if e.is_integer() => match *inner_exp {
                    Expr::Constant(k) => m.insert(*inner, k * &e),
                    other => m.insert(Expr::Pow(inner, other.boxed()), e),
                },
                b @ (Expr::Mul(..) | Expr::Neg(_)) if e.is_integer() => {
                    let inner = decompose(&b);
                    match pow_rational(&inner.coeff, &e)? {
                        Some(c) => m.coeff = c,
                        None => m.insert(Expr::Constant(inner.coeff), e.clone()),
                    }
                    for (b, k) in inner.powers {
                        m.insert(b, k * &e);
                    }
                }
                b => m.insert(b, e),
            }
            finish_product(m)
        }
        (base, exp) => Ok(Expr::Pow(base.boxed(), exp.boxed())),
    }
}

/// Per-function rules applied to an already canonical argument.
pub fn simplify_call(func: Func, arg: Expr) -> Result<Expr> {
    if arg.is_zero() {
        match func {
            Func::Sin
            | Func::Tan
            | Func::Asin
            | Func::Atan
            | Func::Sinh
            | Func::Tanh
            | Func::Erf => return Ok(zero()),
            Func::Cos | Func::Sec | Func::Cosh | Func::Exp => return Ok(one()),
            Func::Acos => return simplify_mul(Expr::constant(1, 2), Expr::Pi),
            _ => {}
        }
    }

    match (func, &arg) {
        (Func::Log, a) if a.is_one() => return Ok(zero()),
        (Func::Exp, Expr::Call(Func::Log, inner)) | (Func::Log, Expr::Call(Func::Exp, inner)) => {
            return Ok((**inner).clone());
        }
        (Func::Sin | Func::Tan, Expr::Pi) => return Ok(zero()),
        (Func::Cos, Expr::Pi) => return Ok(Expr::integer(-1)),
        (Func::Gamma, Expr::Constant(n)) => {
            if let Some(value) = gamma_of_integer(n) {
                return Ok(Expr::Constant(value));
            }
        }
        _ => {}
    }

    if func.is_odd() || func.is_even() {
        if let Some(positive) = extract_minus_sign(&arg) {
            let inner = simplify_call(func, positive)?;
            return Ok(if func.is_odd() { simplify_neg(inner) } else { inner });
        }
    }

    Ok(Expr::Call(func, arg.boxed()))
}

pub(crate) fn flatten_sum(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b));
            out
        }
        Expr::Sub(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b).iter().map(negate_term));
            out
        }
        Expr::Neg(a) => flatten_sum(a).iter().map(negate_term).collect(),
        other => vec![other.clone()],
    }
}

fn negate_term(term: &Expr) -> Expr {
    let m = decompose(term);
    Monomial {
        coeff: -m.coeff,
        powers: m.powers,
    }
    .into_expr()
}

/// Collect like terms of an iterator of canonical terms into a canonical sum.
pub(crate) fn sum_of<I>(terms: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    let mut map: BTreeMap<Powers, Rational> = BTreeMap::new();
    for term in terms {
        let m = decompose(&term);
        if m.coeff.is_zero() {
            continue;
        }
        *map.entry(m.powers).or_insert_with(Rational::zero) += m.coeff;
    }
    combine_pythagorean(&mut map);
    rebuild_sum(map)
}

fn rebuild_sum(mut map: BTreeMap<Powers, Rational>) -> Expr {
    let const_term = map.remove(&Powers::new()).unwrap_or_else(Rational::zero);

    let mut entries: Vec<(Powers, Rational)> =
        map.into_iter().filter(|(_, coeff)| !coeff.is_zero()).collect();
    entries.sort_by(|(a, _), (b, _)| term_order(a, b));

    let mut terms: Vec<Expr> = entries
        .into_iter()
        .map(|(powers, coeff)| Monomial { coeff, powers }.into_expr())
        .collect();

    if !const_term.is_zero() {
        terms.push(Expr::Constant(const_term));
    }

    mk_add_list(terms)
}

// Bases ascending, higher powers of the same base first: x**2 + x + y.
fn term_order(a: &Powers, b: &Powers) -> Ordering {
    for ((base_a, exp_a), (base_b, exp_b)) in a.iter().zip(b.iter()) {
        let ord = base_a.cmp(base_b).then_with(|| exp_b.cmp(exp_a));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

// c*P*sin(u)^2 + c*P*cos(u)^2 => c*P
fn combine_pythagorean(map: &mut BTreeMap<Powers, Rational>) {
    let two = Rational::from_integer(2.into());
    loop {
        let found = map.iter().find_map(|(key, coeff)| {
            key.iter().find_map(|(base, exp)| {
                let Expr::Call(Func::Sin, u) = base else {
                    return None;
                };
                let cos = Expr::Call(Func::Cos, u.clone());
                if *exp != two || key.contains_key(&cos) {
                    return None;
                }
                let mut rest = key.clone();
                rest.remove(base);
                let mut partner = rest.clone();
                partner.insert(cos, two.clone());
                (map.get(&partner) == Some(coeff))
                    .then(|| (key.clone(), partner, rest, coeff.clone()))
            })
        });

        let Some((sin_key, cos_key, rest, coeff)) = found else {
            break;
        };
        map.remove(&sin_key);
        map.remove(&cos_key);
        *map.entry(rest).or_insert_with(Rational::zero) += coeff;
    }
    map.retain(|_, coeff| !coeff.is_zero());
}

/// Multiply canonical factors into a canonical expression.
pub(crate) fn product_of(factors: Vec<Expr>) -> Result<Expr> {
    let mut m = Monomial::one();
    for factor in &factors {
        m.absorb(factor, &Rational::one());
    }
    finish_product(m)
}

fn finish_product(mut m: Monomial) -> Result<Expr> {
    m.powers.retain(|_, e| !e.is_zero());
    merge_exponentials(&mut m)?;
    fold_constant_bases(&mut m)?;
    if m.coeff.is_zero() {
        return Ok(zero());
    }

    let bare_sums: Vec<Expr> = m
        .powers
        .iter()
        .filter(|(b, e)| b.is_sum() && e.is_one())
        .map(|(b, _)| b.clone())
        .collect();
    let expanded_terms: usize = bare_sums.iter().map(|s| flatten_sum(s).len()).product();
    if let Some(sum) = bare_sums.into_iter().next() {
        if expanded_terms <= DISTRIBUTE_TERM_LIMIT {
            m.powers.remove(&sum);
            let rest = m.into_expr();
            let products = flatten_sum(&sum)
                .into_iter()
                .map(|term| product_of(vec![rest.clone(), term]))
                .collect::<Result<Vec<_>>>()?;
            return Ok(sum_of(products));
        }
    }

    Ok(m.into_expr())
}

// exp(a)^j * exp(b)^k => exp(j*a + k*b)
fn merge_exponentials(m: &mut Monomial) -> Result<()> {
    let exps: Vec<Expr> = m
        .powers
        .keys()
        .filter(|b| matches!(b, Expr::Call(Func::Exp, _)))
        .cloned()
        .collect();
    let single_plain = exps.len() == 1 && m.powers.get(&exps[0]).is_some_and(|e| e.is_one());
    if exps.is_empty() || single_plain {
        return Ok(());
    }

    let mut args = Vec::with_capacity(exps.len());
    for base in exps {
        let k = m.powers.remove(&base).unwrap_or_else(Rational::zero);
        if let Expr::Call(_, arg) = base {
            args.push(product_of(vec![Expr::Constant(k), *arg])?);
        }
    }
    let merged = simplify_call(Func::Exp, sum_of(args))?;
    m.absorb(&merged, &Rational::one());
    m.powers.retain(|_, e| !e.is_zero());
    Ok(())
}

fn fold_constant_bases(m: &mut Monomial) -> Result<()> {
    let constants: Vec<(Rational, Rational)> = m
        .powers
        .iter()
        .filter_map(|(b, e)| match b {
            Expr::Constant(c) => Some((c.clone(), e.clone())),
            _ => None,
        })
        .collect();

    for (base, exp) in constants {
        let key = Expr::Constant(base.clone());
        if base.is_zero() {
            if exp.is_negative() {
                return Err(CasError::DivisionByZero);
            }
            m.coeff = Rational::zero();
            m.powers.remove(&key);
            continue;
        }
        if exp.is_integer() {
            if let Some(value) = pow_rational(&base, &exp)? {
                m.coeff *= value;
                m.powers.remove(&key);
            }
            continue;
        }
        if base.is_negative() {
            continue;
        }
        let Some(q) = exp.denom().to_u32() else {
            continue;
        };
        if let Some(root) = exact_root(&base, q) {
            let whole = Rational::from_integer(exp.numer().clone());
            if let Some(value) = pow_rational(&root, &whole)? {
                m.coeff *= value;
                m.powers.remove(&key);
            }
            continue;
        }
        // 2^(3/2) => 2*2^(1/2)
        let whole = exp.floor();
        if let Some(value) = pow_rational(&base, &whole)? {
            m.coeff *= value;
            m.powers.insert(key, exp - whole);
        }
    }
    Ok(())
}

/// `base^exp` for integer `exp`, or `None` when the exponent is too large to evaluate.
pub(crate) fn pow_rational(base: &Rational, exp: &Rational) -> Result<Option<Rational>> {
    if exp.is_zero() {
        return Ok(Some(Rational::one()));
    }
    if !exp.is_integer() {
        return Ok(None);
    }
    let n = exp.to_integer();
    let Some(power) = n.abs().to_u32().filter(|p| *p <= MAX_EVALUATED_EXPONENT) else {
        return Ok(None);
    };
    if n.is_negative() && base.is_zero() {
        return Err(CasError::DivisionByZero);
    }
    let num = base.numer().pow(power);
    let den = base.denom().pow(power);
    Ok(Some(if n.is_negative() {
        Rational::new(den, num)
    } else {
        Rational::new(num, den)
    }))
}

fn exact_root(value: &Rational, q: u32) -> Option<Rational> {
    if value.is_negative() || q == 0 {
        return None;
    }
    let n = value.numer().nth_root(q);
    let d = value.denom().nth_root(q);
    (n.pow(q) == *value.numer() && d.pow(q) == *value.denom()).then(|| Rational::new(n, d))
}

fn gamma_of_integer(n: &Rational) -> Option<Rational> {
    if !n.is_integer() {
        return None;
    }
    let k = n.to_integer().to_u32().filter(|k| (1..=20).contains(k))?;
    let factorial = (1..k).fold(BigInt::one(), |acc, i| acc * BigInt::from(i));
    Some(Rational::from_integer(factorial))
}

/// For arguments that read as `-u`, returns canonical `u`.
fn extract_minus_sign(arg: &Expr) -> Option<Expr> {
    let terms = flatten_sum(arg);
    let all_negative = terms.iter().all(|t| decompose(t).coeff.is_negative());
    all_negative.then(|| simplify_neg(arg.clone()))
}

pub(crate) fn power_factor(base: Expr, exp: Rational) -> Expr {
    if exp.is_one() {
        base
    } else {
        Expr::Pow(base.boxed(), Expr::Constant(exp).boxed())
    }
}

pub(crate) fn term_from(coef: &Rational, base: Expr) -> Expr {
    if coef.is_zero() {
        return zero();
    }

    if base.is_one() {
        return Expr::Constant(coef.clone());
    }

    if coef.is_one() {
        return base;
    }

    if coef == &-Rational::one() {
        return Expr::Neg(base.boxed());
    }

    Expr::Mul(Expr::Constant(coef.clone()).boxed(), base.boxed())
}

pub(crate) fn mk_add_list(items: Vec<Expr>) -> Expr {
    items.into_iter().reduce(|acc, item| Expr::Add(acc.boxed(), item.boxed())).unwrap_or_else(zero)
}

pub(crate) fn mk_mul_list(mut items: Vec<Expr>) -> Expr {
    items.retain(|e| !e.is_one());
    items.into_iter().reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed())).unwrap_or_else(one)
}
