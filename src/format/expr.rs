use crate::expr::{Expr, Func, Rational};
use num_traits::{One, Signed, Zero};

const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const POWER: u8 = 3;
const ATOM: u8 = 4;

/// Plain text in the input syntax: `**` powers, `sqrt`, spaced `+`/`-`.
///
/// Output built only from whitelisted functions parses back to the same tree shape;
/// derivatives of `gamma` mention `polygamma`, which the parser does not accept.
pub fn pretty(expr: &Expr) -> String {
    pp(0, expr)
}

fn pp(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(v) => v.clone(),
        Expr::Pi => "pi".to_string(),
        Expr::Constant(r) => {
            let prec = if r.is_integer() && !r.is_negative() { ATOM } else { PRODUCT };
            bracket(ctx, prec, show_rational(r))
        }

        Expr::Add(..) | Expr::Sub(..) => bracket(ctx, SUM, show_sum(expr)),

        Expr::Mul(..) | Expr::Div(..) | Expr::Neg(_) => bracket(ctx, PRODUCT, show_product(expr)),
        Expr::Pow(_, e) if is_negative_constant(e) => bracket(ctx, PRODUCT, show_product(expr)),

        Expr::Pow(b, e) if is_half(e) => format!("sqrt({})", pp(0, b)),
        Expr::Pow(b, e) => bracket(ctx, POWER, format!("{}**{}", pp(ATOM, b), pp(ATOM, e))),

        Expr::Call(Func::Polygamma(n), a) => format!("polygamma({n}, {})", pp(0, a)),
        Expr::Call(func, a) => format!("{}({})", func.name(), pp(0, a)),
    }
}

fn show_sum(expr: &Expr) -> String {
    let mut terms = Vec::new();
    signed_terms(expr, false, &mut terms);
    lead_with_positive(&mut terms);

    let mut out = String::new();
    for (i, (negative, term)) in terms.iter().enumerate() {
        let body = pp(PRODUCT, term);
        match (i, negative) {
            (0, true) => out.push_str(&format!("-{body}")),
            (0, false) => out.push_str(&body),
            (_, true) => out.push_str(&format!(" - {body}")),
            (_, false) => out.push_str(&format!(" + {body}")),
        }
    }
    out
}

fn show_product(expr: &Expr) -> String {
    let mut factors = Factors::new();
    factors.collect(expr, false);

    let coeff_num = Rational::from_integer(factors.coeff.numer().clone());
    let coeff_den = Rational::from_integer(factors.coeff.denom().clone());

    let mut top: Vec<String> = Vec::new();
    if !coeff_num.is_one() || factors.num.is_empty() {
        top.push(show_rational(&coeff_num));
    }
    top.extend(ordered(&factors.num).map(|f| pp(PRODUCT, f)));

    let mut bottom: Vec<String> = Vec::new();
    if !coeff_den.is_one() {
        bottom.push(show_rational(&coeff_den));
    }
    let single_bottom = bottom.len() + factors.den.len() == 1;
    let bottom_ctx = if single_bottom { POWER } else { PRODUCT };
    bottom.extend(ordered(&factors.den).map(|f| pp(bottom_ctx, f)));

    let sign = if factors.negative { "-" } else { "" };
    let numerator = top.join("*");
    match bottom.len() {
        0 => format!("{sign}{numerator}"),
        1 => format!("{sign}{numerator}/{}", bottom[0]),
        _ => format!("{sign}{numerator}/({})", bottom.join("*")),
    }
}

/// A product split into sign, rational coefficient, numerator and denominator factors.
pub(crate) struct Factors {
    pub negative: bool,
    pub coeff: Rational,
    pub num: Vec<Expr>,
    pub den: Vec<Expr>,
}

impl Factors {
    pub fn new() -> Self {
        Factors {
            negative: false,
            coeff: Rational::one(),
            num: Vec::new(),
            den: Vec::new(),
        }
    }

    pub fn collect(&mut self, expr: &Expr, inverted: bool) {
        match expr {
            Expr::Mul(a, b) => {
                self.collect(a, inverted);
                self.collect(b, inverted);
            }
            Expr::Div(a, b) => {
                self.collect(a, inverted);
                self.collect(b, !inverted);
            }
            Expr::Neg(a) => {
                self.negative = !self.negative;
                self.collect(a, inverted);
            }
            Expr::Constant(r) if !(inverted && r.is_zero()) => {
                if r.is_negative() {
                    self.negative = !self.negative;
                }
                let magnitude = r.abs();
                if inverted {
                    self.coeff /= magnitude;
                } else {
                    self.coeff *= magnitude;
                }
            }
            Expr::Pow(b, e) if is_negative_constant(e) => {
                let flipped = match &**e {
                    Expr::Constant(k) if (-k).is_one() => (**b).clone(),
                    Expr::Constant(k) => Expr::Pow(b.clone(), Expr::Constant(-k).boxed()),
                    _ => expr.clone(),
                };
                self.push(flipped, !inverted);
            }
            other => self.push(other.clone(), inverted),
        }
    }

    fn push(&mut self, factor: Expr, inverted: bool) {
        if inverted {
            self.den.push(factor);
        } else {
            self.num.push(factor);
        }
    }
}

// Sums go last so `2*x*(x + 1)` reads naturally.
fn ordered(factors: &[Expr]) -> impl Iterator<Item = &Expr> {
    factors
        .iter()
        .filter(|f| !f.is_sum())
        .chain(factors.iter().filter(|f| f.is_sum()))
}

/// Flatten a sum into `(negative, magnitude)` terms.
pub(crate) fn signed_terms(expr: &Expr, negated: bool, out: &mut Vec<(bool, Expr)>) {
    match expr {
        Expr::Add(a, b) => {
            signed_terms(a, negated, out);
            signed_terms(b, negated, out);
        }
        Expr::Sub(a, b) => {
            signed_terms(a, negated, out);
            signed_terms(b, !negated, out);
        }
        other => {
            let (negative, magnitude) = split_neg(other);
            out.push((negative ^ negated, magnitude));
        }
    }
}

/// `-sin(x) + cos(x)` reads better as `cos(x) - sin(x)`.
pub(crate) fn lead_with_positive(terms: &mut Vec<(bool, Expr)>) {
    if terms.first().is_some_and(|(negative, _)| *negative) {
        if let Some(pos) = terms.iter().position(|(negative, _)| !negative) {
            let term = terms.remove(pos);
            terms.insert(0, term);
        }
    }
}

pub(crate) fn split_neg(expr: &Expr) -> (bool, Expr) {
    match expr {
        Expr::Neg(inner) => {
            let (negative, magnitude) = split_neg(inner);
            (!negative, magnitude)
        }
        Expr::Constant(r) if r.is_negative() => (true, Expr::Constant(-r)),
        Expr::Mul(a, b) => match split_neg(a) {
            (true, m) if m.is_one() => (true, (**b).clone()),
            (true, m) => (true, Expr::Mul(m.boxed(), b.clone())),
            (false, _) => (false, expr.clone()),
        },
        Expr::Div(a, b) => match split_neg(a) {
            (true, m) => (true, Expr::Div(m.boxed(), b.clone())),
            (false, _) => (false, expr.clone()),
        },
        other => (false, other.clone()),
    }
}

pub(crate) fn is_negative_constant(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_negative())
}

pub(crate) fn is_half(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if *r == Rational::new(1.into(), 2.into()))
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

fn show_rational(r: &Rational) -> String {
    if r.is_integer() {
        format!("{}", r.numer())
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, div, mul, neg, pow};

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn sums_lead_with_a_positive_term() {
        let e = add(neg(Expr::call(Func::Sin, x())), Expr::call(Func::Cos, x()));
        assert_eq!(pretty(&e), "cos(x) - sin(x)");
        assert_eq!(pretty(&neg(add(x(), Expr::integer(1)))), "-(x + 1)");
    }

    #[test]
    fn negative_powers_become_denominators() {
        assert_eq!(pretty(&pow(x(), Expr::integer(-1))), "1/x");
        assert_eq!(
            pretty(&mul(Expr::integer(3), pow(x(), Expr::integer(-2)))),
            "3/x**2"
        );
        assert_eq!(
            pretty(&mul(Expr::constant(1, 2), mul(x(), pow(Expr::var("y"), Expr::integer(-1))))),
            "x/(2*y)"
        );
        assert_eq!(
            pretty(&div(x(), add(x(), Expr::integer(1)))),
            "x/(x + 1)"
        );
    }

    #[test]
    fn powers_bracket_compound_operands() {
        assert_eq!(pretty(&pow(add(x(), Expr::integer(1)), Expr::integer(2))), "(x + 1)**2");
        assert_eq!(pretty(&pow(x(), Expr::constant(3, 2))), "x**(3/2)");
        assert_eq!(pretty(&pow(neg(x()), Expr::integer(2))), "(-x)**2");
        assert_eq!(pretty(&pow(x(), Expr::constant(1, 2))), "sqrt(x)");
        assert_eq!(pretty(&pow(x(), Expr::constant(-1, 2))), "1/sqrt(x)");
    }

    #[test]
    fn products_put_sums_last() {
        let e = mul(add(x(), Expr::integer(1)), mul(Expr::integer(2), x()));
        assert_eq!(pretty(&e), "2*x*(x + 1)");
    }

    #[test]
    fn special_names() {
        assert_eq!(pretty(&Expr::call(Func::Polygamma(1), x())), "polygamma(1, x)");
        assert_eq!(pretty(&mul(Expr::integer(2), Expr::Pi)), "2*pi");
        assert_eq!(pretty(&Expr::constant(-3, 4)), "-3/4");
    }
}
