use rdiff::expr::{Expr, Func, mul};
use rdiff::{differentiate, parse_expr, simplify, standard_table};

fn parsed(input: &str) -> Expr {
    parse_expr(input, standard_table()).expect("parse input")
}

fn assert_diff_eq(var: &str, input: &str, expected: &str) {
    let expr = parsed(input);
    let got = simplify(differentiate(var, &expr).expect("differentiate")).expect("simplify");
    let expected_expr = simplify(parsed(expected)).expect("simplify expected");
    assert_eq!(got, expected_expr, "d/d{var} {input}");
}

#[test]
fn basic_vars_and_constants() {
    assert_diff_eq("x", "x", "1");
    assert_diff_eq("x", "y", "0");
    assert_diff_eq("x", "5", "0");
    assert_diff_eq("x", "pi*x", "pi");
}

#[test]
fn polynomials_and_products() {
    assert_diff_eq("x", "x^3", "3*x^2");
    assert_diff_eq("x", "x*y", "y");
    assert_diff_eq("x", "2*x^2+3*x", "4*x+3");
    assert_diff_eq("x", "x*exp(x)", "exp(x)*(x + 1)");
    assert_diff_eq("y", "x**2*y**3", "3*x**2*y**2");
}

#[test]
fn quotients() {
    assert_diff_eq("x", "x/(x + 1)", "1/(x + 1)^2");
    assert_diff_eq("x", "1/x", "-1/x^2");
}

#[test]
fn trig_and_exponentials() {
    assert_diff_eq("x", "sin(x)", "cos(x)");
    assert_diff_eq("x", "cos(x)", "-sin(x)");
    assert_diff_eq("x", "tan(x)", "1/cos(x)^2");
    assert_diff_eq("x", "cot(x)", "-1/sin(x)^2");
    assert_diff_eq("x", "sec(x)", "sec(x)*tan(x)");
    assert_diff_eq("x", "csc(x)", "-csc(x)*cot(x)");
    assert_diff_eq("x", "exp(x^2)", "2*x*exp(x^2)");
    assert_diff_eq("x", "sin(3*x)", "3*cos(3*x)");
}

#[test]
fn inverse_and_hyperbolic() {
    assert_diff_eq("x", "asin(x)", "1/sqrt(1 - x^2)");
    assert_diff_eq("x", "acos(x)", "-1/sqrt(1 - x^2)");
    assert_diff_eq("x", "atan(x)", "1/(1 + x^2)");
    assert_diff_eq("x", "sinh(x)", "cosh(x)");
    assert_diff_eq("x", "cosh(x)", "sinh(x)");
    assert_diff_eq("x", "tanh(x)", "1/cosh(x)^2");
}

#[test]
fn general_power_rule() {
    assert_diff_eq("x", "x^x", "x^x*(log(x)+1)");
    assert_diff_eq("x", "log(x)", "1/x");
    assert_diff_eq("x", "2^x", "2^x*log(2)");
    assert_diff_eq("x", "sqrt(x)", "1/(2*sqrt(x))");
}

#[test]
fn special_functions() {
    assert_diff_eq("x", "erf(x)", "2*exp(-x^2)/sqrt(pi)");

    let x = Expr::var("x");
    let got = simplify(differentiate("x", &parsed("gamma(x)")).unwrap()).unwrap();
    let expected = simplify(mul(
        Expr::call(Func::Gamma, x.clone()),
        Expr::call(Func::Polygamma(0), x),
    ))
    .unwrap();
    assert_eq!(got, expected);
}
