use crate::expr::{Expr, Func, Rational};
use num_traits::{One, Signed};

use super::expr::{Factors, is_half, is_negative_constant, lead_with_positive, signed_terms};

const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const ATOM: u8 = 4;

/// LaTeX rendering: `\frac`, `\sqrt`, `e^{u}` and named operators.
pub fn latex(expr: &Expr) -> String {
    tex(0, expr)
}

fn tex(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(v) => v.clone(),
        Expr::Pi => "\\pi".to_string(),
        Expr::Constant(r) => {
            let prec = if r.is_integer() && !r.is_negative() { ATOM } else { PRODUCT };
            bracket(ctx, prec, show_rational(r))
        }

        Expr::Add(..) | Expr::Sub(..) => bracket(ctx, SUM, show_sum(expr)),

        Expr::Mul(..) | Expr::Div(..) | Expr::Neg(_) => bracket(ctx, PRODUCT, show_product(expr)),
        Expr::Pow(_, e) if is_negative_constant(e) => bracket(ctx, PRODUCT, show_product(expr)),

        Expr::Pow(b, e) if is_half(e) => format!("\\sqrt{{{}}}", tex(0, b)),
        Expr::Pow(b, e) => show_power(b, e),

        Expr::Call(Func::Exp, a) => format!("e^{{{}}}", tex(0, a)),
        Expr::Call(func, a) => format!("{}\\left({}\\right)", head(*func), tex(0, a)),
    }
}

fn show_power(base: &Expr, exp: &Expr) -> String {
    let exponent = tex(0, exp);
    match base {
        // sin^{2}(x) rather than (sin(x))^{2}
        Expr::Call(func, arg) if !matches!(func, Func::Exp | Func::Polygamma(_)) => {
            format!("{}^{{{exponent}}}\\left({}\\right)", head(*func), tex(0, arg))
        }
        Expr::Variable(_) | Expr::Pi => format!("{}^{{{exponent}}}", tex(ATOM, base)),
        Expr::Constant(r) if r.is_integer() && !r.is_negative() => {
            format!("{}^{{{exponent}}}", show_rational(r))
        }
        other => format!("\\left({}\\right)^{{{exponent}}}", tex(0, other)),
    }
}

fn show_sum(expr: &Expr) -> String {
    let mut terms = Vec::new();
    signed_terms(expr, false, &mut terms);
    lead_with_positive(&mut terms);

    let mut out = String::new();
    for (i, (negative, term)) in terms.iter().enumerate() {
        let body = tex(PRODUCT, term);
        match (i, negative) {
            (0, true) => out.push_str(&format!("- {body}")),
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
    top.extend(factors.num.iter().map(factor_tex));

    let mut bottom: Vec<String> = Vec::new();
    if !coeff_den.is_one() {
        bottom.push(show_rational(&coeff_den));
    }
    bottom.extend(factors.den.iter().map(factor_tex));

    let sign = if factors.negative { "- " } else { "" };
    let numerator = top.join(" ");
    if bottom.is_empty() {
        format!("{sign}{numerator}")
    } else {
        format!("{sign}\\frac{{{numerator}}}{{{}}}", bottom.join(" "))
    }
}

fn factor_tex(factor: &Expr) -> String {
    if factor.is_sum() {
        format!("\\left({}\\right)", tex(0, factor))
    } else {
        tex(PRODUCT, factor)
    }
}

fn head(func: Func) -> String {
    match func {
        Func::Sin => "\\sin".into(),
        Func::Cos => "\\cos".into(),
        Func::Tan => "\\tan".into(),
        Func::Cot => "\\cot".into(),
        Func::Sec => "\\sec".into(),
        Func::Csc => "\\csc".into(),
        Func::Sinh => "\\sinh".into(),
        Func::Cosh => "\\cosh".into(),
        Func::Tanh => "\\tanh".into(),
        Func::Log => "\\log".into(),
        Func::Exp => "\\exp".into(),
        Func::Gamma => "\\Gamma".into(),
        Func::Polygamma(n) => format!("\\psi^{{({n})}}"),
        Func::Asin | Func::Acos | Func::Atan | Func::Erf => {
            format!("\\operatorname{{{}}}", func.name())
        }
    }
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("\\left({body}\\right)")
    } else {
        body
    }
}

fn show_rational(r: &Rational) -> String {
    if r.is_integer() {
        format!("{}", r.numer())
    } else if r.is_negative() {
        format!("- \\frac{{{}}}{{{}}}", -r.numer(), r.denom())
    } else {
        format!("\\frac{{{}}}{{{}}}", r.numer(), r.denom())
    }
}
