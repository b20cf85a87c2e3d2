use std::cell::{Cell, RefCell};

use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use crate::functions::FunctionTable;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, not, opt, recognize};
use nom::error::{VerboseError, VerboseErrorKind, convert_error};
use nom::multi::{fold_many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use num_bigint::BigInt;
use num_traits::{Num, One};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

const REJECTED: &str = "rejected input";

/// Deepest run of brackets, signs, exponents and call arguments accepted.
pub const MAX_NESTING: usize = 128;

/// Deepest tree accepted after parsing; long flat sums and products nest one level per operand.
pub const MAX_TREE_DEPTH: usize = 512;

const TOO_DEEP: &str = "expression nested too deeply";

/// Parse `input`, resolving every function call against `table`.
pub fn parse_expr(input: &str, table: &FunctionTable) -> Result<Expr> {
    let parser = Parser {
        table,
        rejection: RefCell::new(None),
        depth: Cell::new(0),
    };
    let outcome = all_consuming(ws(|i| parser.add_sub(i)))(input);
    if let Some(err) = parser.rejection.into_inner() {
        return Err(err);
    }
    match outcome {
        Ok((_, expr)) if tree_depth(&expr) > MAX_TREE_DEPTH => {
            Err(CasError::Parse(TOO_DEEP.into()))
        }
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(CasError::Parse(convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(CasError::Parse("unexpected end of input".into())),
    }
}

struct Parser<'t> {
    table: &'t FunctionTable,
    // Holds the precise reason when a call is rejected; nom only carries static contexts.
    rejection: RefCell<Option<CasError>>,
    depth: Cell<usize>,
}

impl<'t> Parser<'t> {
    fn add_sub<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, init) = self.mul_div(input)?;
        fold_many0(
            pair(ws(alt((char('+'), char('-')))), |i: &'a str| self.mul_div(i)),
            move || init.clone(),
            |acc, (op, rhs)| match op {
                '+' => Expr::Add(acc.boxed(), rhs.boxed()),
                _ => Expr::Sub(acc.boxed(), rhs.boxed()),
            },
        )(rest)
    }

    fn mul_div<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, init) = self.unary(input)?;
        fold_many0(
            pair(
                ws(alt((terminated(char('*'), not(char('*'))), char('/')))),
                |i: &'a str| self.unary(i),
            ),
            move || init.clone(),
            |acc, (op, rhs)| match op {
                '*' => Expr::Mul(acc.boxed(), rhs.boxed()),
                _ => Expr::Div(acc.boxed(), rhs.boxed()),
            },
        )(rest)
    }

    // Brackets, signs, exponents and call arguments all pass through here.
    fn unary<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            return self.reject(input, CasError::Parse(TOO_DEEP.into()));
        }
        self.depth.set(depth + 1);
        let outcome = self.signed(input);
        self.depth.set(depth);
        outcome
    }

    // Unary minus binds looser than powers: -x**2 is -(x**2).
    fn signed<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        if let (rest, Some(sign)) = opt(ws(alt((char('-'), char('+')))))(input)? {
            let (rest, operand) = self.unary(rest)?;
            let expr = if sign == '-' {
                Expr::Neg(operand.boxed())
            } else {
                operand
            };
            return Ok((rest, expr));
        }
        self.power(input)
    }

    fn power<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, base) = self.primary(input)?;
        match opt(preceded(ws(alt((tag("**"), tag("^")))), |i: &'a str| self.unary(i)))(rest)? {
            (next, Some(exp)) => Ok((next, Expr::Pow(base.boxed(), exp.boxed()))),
            (next, None) => Ok((next, base)),
        }
    }

    fn primary<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        alt((
            |i: &'a str| self.parens(i),
            parse_number,
            |i: &'a str| self.call(i),
            parse_symbol,
        ))(input)
    }

    fn parens<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        delimited(ws(char('(')), |i: &'a str| self.add_sub(i), ws(char(')')))(input)
    }

    fn call<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, name) = ws(identifier)(input)?;
        let (rest, args) = delimited(
            char('('),
            separated_list1(char(','), ws(|i: &'a str| self.add_sub(i))),
            ws(char(')')),
        )(rest)?;

        let Some(spec) = self.table.get(name) else {
            return self.reject(
                input,
                CasError::UnknownFunction {
                    name: name.to_string(),
                    supported: self.table.names().join(", "),
                },
            );
        };
        if spec.arity != args.len() {
            return self.reject(
                input,
                CasError::Arity {
                    name: name.to_string(),
                    expected: spec.arity,
                    found: args.len(),
                },
            );
        }
        Ok((rest, spec.apply(args)))
    }

    fn reject<'a, O>(&self, at: &'a str, err: CasError) -> PResult<'a, O> {
        let mut slot = self.rejection.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        Err(nom::Err::Failure(VerboseError {
            errors: vec![(at, VerboseErrorKind::Context(REJECTED))],
        }))
    }
}

// Measured with an explicit stack.
fn tree_depth(expr: &Expr) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(expr, 1)];
    while let Some((node, depth)) = pending.pop() {
        deepest = deepest.max(depth);
        match node {
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                pending.push((a, depth + 1));
                pending.push((b, depth + 1));
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => pending.push((inner, depth + 1)),
            Expr::Variable(_) | Expr::Constant(_) | Expr::Pi => {}
        }
    }
    deepest
}

fn parse_symbol(input: &str) -> PResult<'_, Expr> {
    map(ws(identifier), |name: &str| match name {
        "pi" => Expr::Pi,
        other => Expr::Variable(other.to_string()),
    })(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

// Decimal literals are kept exact: 2.5 becomes 5/2.
fn parse_number(input: &str) -> PResult<'_, Expr> {
    map(
        ws(pair(digit1, opt(preceded(char('.'), digit1)))),
        |(whole, frac): (&str, Option<&str>)| {
            let digits = format!("{whole}{}", frac.unwrap_or(""));
            let numer = BigInt::from_str_radix(&digits, 10).unwrap_or_default();
            let denom = BigInt::from(10).pow(frac.map_or(0, |f| f.len() as u32));
            if denom.is_one() {
                Expr::Constant(Rational::from_integer(numer))
            } else {
                Expr::Constant(Rational::new(numer, denom))
            }
        },
    )(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Func, add, mul, neg, pow};
    use crate::functions::standard_table;

    fn parse(input: &str) -> Result<Expr> {
        parse_expr(input, standard_table())
    }

    #[test]
    fn python_and_caret_powers_agree() {
        assert_eq!(parse("x**2").unwrap(), parse("x^2").unwrap());
        assert_eq!(
            parse("x**2").unwrap(),
            pow(Expr::var("x"), Expr::integer(2))
        );
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_minus() {
        assert_eq!(
            parse("-x**2").unwrap(),
            neg(pow(Expr::var("x"), Expr::integer(2)))
        );
        assert_eq!(
            parse("2**3**2").unwrap(),
            pow(Expr::integer(2), pow(Expr::integer(3), Expr::integer(2)))
        );
        assert_eq!(
            parse("x**-1").unwrap(),
            pow(Expr::var("x"), neg(Expr::integer(1)))
        );
    }

    #[test]
    fn calls_resolve_through_the_table() {
        assert_eq!(
            parse("exp(x)*cos(x)").unwrap(),
            mul(
                Expr::call(Func::Exp, Expr::var("x")),
                Expr::call(Func::Cos, Expr::var("x"))
            )
        );
        assert_eq!(
            parse("sin( x + 1 )").unwrap(),
            Expr::call(Func::Sin, add(Expr::var("x"), Expr::integer(1)))
        );
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse("2.5").unwrap(), Expr::constant(5, 2));
        assert_eq!(parse("0.125").unwrap(), Expr::constant(1, 8));
    }

    #[test]
    fn identifiers_allow_underscores_and_pi_is_a_constant() {
        assert_eq!(parse("x_1").unwrap(), Expr::var("x_1"));
        assert_eq!(parse("_t").unwrap(), Expr::var("_t"));
        assert_eq!(parse("pi").unwrap(), Expr::Pi);
        assert_eq!(parse("pi2").unwrap(), Expr::var("pi2"));
    }

    #[test]
    fn unknown_function_names_are_reported_by_name() {
        match parse("2*foo(x)") {
            Err(CasError::UnknownFunction { name, supported }) => {
                assert_eq!(name, "foo");
                assert!(supported.contains("sin"));
            }
            other => panic!("expected unknown function, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert_eq!(
            parse("log(x, 2)"),
            Err(CasError::Arity {
                name: "log".into(),
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for input in ["2x", "x +", "(x", "sin()", "x ** ", "1..2"] {
            assert!(
                matches!(parse(input), Err(CasError::Parse(_))),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let shallow = format!("{}x{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse(&shallow).unwrap(), Expr::var("x"));

        let deep = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&deep), Err(CasError::Parse(TOO_DEEP.into())));

        let signs = format!("{}x", "-".repeat(1000));
        assert_eq!(parse(&signs), Err(CasError::Parse(TOO_DEEP.into())));

        let calls = format!("{}x{}", "sin(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&calls), Err(CasError::Parse(TOO_DEEP.into())));
    }

    #[test]
    fn long_flat_sums_are_bounded_by_tree_depth() {
        let ok = vec!["x"; 100].join(" + ");
        assert!(parse(&ok).is_ok());

        let long = vec!["x"; MAX_TREE_DEPTH + 10].join(" + ");
        assert_eq!(parse(&long), Err(CasError::Parse(TOO_DEEP.into())));
    }
}
