use crate::error::Result;
use crate::expr::{Expr, Func, Rational, add, check_size, div, mul, neg, one, pow, sub, zero};
use num_traits::One;

/// Differentiate `expr` once with respect to `var`.
///
/// The result is left unsimplified; callers run [`crate::simplify::simplify`] on it.
pub fn differentiate(var: &str, expr: &Expr) -> Result<Expr> {
    let derivative = Differentiator { var }.derive(expr);
    check_size(&derivative)?;
    Ok(derivative)
}

struct Differentiator<'a> {
    var: &'a str,
}

impl<'a> Differentiator<'a> {
    fn derive(&self, expr: &Expr) -> Expr {
        if !expr.contains_var(self.var) {
            return zero();
        }
        match expr {
            Expr::Variable(_) => one(),
            Expr::Constant(_) | Expr::Pi => zero(),

            Expr::Add(a, b) => add(self.derive(a), self.derive(b)),
            Expr::Sub(a, b) => sub(self.derive(a), self.derive(b)),
            Expr::Mul(a, b) => self.product_rule(a, b),
            Expr::Div(a, b) => self.quotient_rule(a, b),
            Expr::Pow(a, b) => self.power_rule(a, b),
            Expr::Neg(a) => neg(self.derive(a)),

            Expr::Call(func, arg) => self.chain_rule(arg, outer_derivative(*func, arg)),
        }
    }

    fn product_rule(&self, a: &Expr, b: &Expr) -> Expr {
        add(
            self.strip_one(mul(self.derive(a), b.clone())),
            self.strip_one(mul(a.clone(), self.derive(b))),
        )
    }

    fn quotient_rule(&self, a: &Expr, b: &Expr) -> Expr {
        div(
            sub(
                mul(self.derive(a), b.clone()),
                mul(a.clone(), self.derive(b)),
            ),
            pow(b.clone(), Expr::integer(2)),
        )
    }

    fn power_rule(&self, base: &Expr, exp: &Expr) -> Expr {
        if !exp.contains_var(self.var) {
            // d(u^n) = n*u^(n-1)*du
            let lowered = match exp {
                Expr::Constant(n) => Expr::Constant(n - Rational::one()),
                other => sub(other.clone(), one()),
            };
            return self.strip_one(mul(
                mul(exp.clone(), pow(base.clone(), lowered)),
                self.derive(base),
            ));
        }

        let f = pow(base.clone(), exp.clone());
        if !base.contains_var(self.var) {
            // d(a^v) = a^v*log(a)*dv
            return mul(
                mul(f, Expr::call(Func::Log, base.clone())),
                self.derive(exp),
            );
        }

        // d(u^v) = u^v*(dv*log(u) + v*du/u)
        mul(
            f,
            add(
                mul(self.derive(exp), Expr::call(Func::Log, base.clone())),
                div(mul(exp.clone(), self.derive(base)), base.clone()),
            ),
        )
    }

    fn chain_rule(&self, arg: &Expr, outer: Expr) -> Expr {
        let da = self.strip_one(self.derive(arg));
        self.strip_one(mul(outer, da))
    }

    fn flatten_mul(&self, expr: &Expr) -> Vec<Expr> {
        match expr {
            Expr::Mul(a, b) => {
                let mut out = self.flatten_mul(a);
                out.extend(self.flatten_mul(b));
                out
            }
            other => vec![other.clone()],
        }
    }

    fn strip_one(&self, expr: Expr) -> Expr {
        if !self.contains_one(&expr) {
            return expr;
        }
        self.flatten_mul(&expr)
            .into_iter()
            .filter(|e| !e.is_one())
            .reduce(mul)
            .unwrap_or_else(one)
    }

    fn contains_one(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Mul(a, b) => self.contains_one(a) || self.contains_one(b),
            other => other.is_one(),
        }
    }
}

/// `f'(u)` for each supported function, before the inner derivative is applied.
fn outer_derivative(func: Func, u: &Expr) -> Expr {
    let arg = || u.clone();
    let call = |f: Func| Expr::call(f, arg());
    let square = |e: Expr| pow(e, Expr::integer(2));
    match func {
        Func::Sin => call(Func::Cos),
        Func::Cos => neg(call(Func::Sin)),
        Func::Tan => pow(call(Func::Cos), Expr::integer(-2)),
        Func::Cot => neg(pow(call(Func::Sin), Expr::integer(-2))),
        Func::Sec => mul(call(Func::Sec), call(Func::Tan)),
        Func::Csc => neg(mul(call(Func::Csc), call(Func::Cot))),
        Func::Asin => pow(sub(one(), square(arg())), Expr::constant(-1, 2)),
        Func::Acos => neg(pow(sub(one(), square(arg())), Expr::constant(-1, 2))),
        Func::Atan => pow(add(one(), square(arg())), Expr::integer(-1)),
        Func::Sinh => call(Func::Cosh),
        Func::Cosh => call(Func::Sinh),
        Func::Tanh => pow(call(Func::Cosh), Expr::integer(-2)),
        Func::Exp => call(Func::Exp),
        Func::Log => pow(arg(), Expr::integer(-1)),
        Func::Gamma => mul(call(Func::Gamma), call(Func::Polygamma(0))),
        Func::Polygamma(n) => call(Func::Polygamma(n + 1)),
        // 2/sqrt(pi)*exp(-u^2)
        Func::Erf => mul(
            mul(Expr::integer(2), pow(Expr::Pi, Expr::constant(-1, 2))),
            Expr::call(Func::Exp, neg(square(arg()))),
        ),
    }
}
