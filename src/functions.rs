//! The closed vocabulary of callable functions accepted by the parser.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::expr::{Expr, Func, pow, rational};

#[derive(Clone, Copy, Debug)]
enum Builder {
    Unary(Func),
    Custom(fn(Vec<Expr>) -> Expr),
}

/// How a whitelisted name turns its parsed arguments into an expression.
#[derive(Clone, Copy, Debug)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub arity: usize,
    build: Builder,
}

impl FunctionSpec {
    pub const fn unary(name: &'static str, func: Func) -> Self {
        FunctionSpec {
            name,
            arity: 1,
            build: Builder::Unary(func),
        }
    }

    pub const fn custom(name: &'static str, arity: usize, build: fn(Vec<Expr>) -> Expr) -> Self {
        FunctionSpec {
            name,
            arity,
            build: Builder::Custom(build),
        }
    }

    /// Callers check `arity` first; the parser does.
    pub fn apply(&self, args: Vec<Expr>) -> Expr {
        match self.build {
            Builder::Unary(func) => Expr::call(func, first(args)),
            Builder::Custom(build) => build(args),
        }
    }
}

/// Immutable name -> constructor mapping handed to the parser.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    entries: BTreeMap<&'static str, FunctionSpec>,
}

impl FunctionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trigonometric, inverse trigonometric, hyperbolic, exp/log, gamma, erf and sqrt.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for (name, func) in [
            ("sin", Func::Sin),
            ("cos", Func::Cos),
            ("tan", Func::Tan),
            ("cot", Func::Cot),
            ("sec", Func::Sec),
            ("csc", Func::Csc),
            ("asin", Func::Asin),
            ("acos", Func::Acos),
            ("atan", Func::Atan),
            ("sinh", Func::Sinh),
            ("cosh", Func::Cosh),
            ("tanh", Func::Tanh),
            ("exp", Func::Exp),
            ("log", Func::Log),
            ("gamma", Func::Gamma),
            ("erf", Func::Erf),
        ] {
            table = table.with(FunctionSpec::unary(name, func));
        }
        table.with(FunctionSpec::custom("sqrt", 1, |args| {
            pow(first(args), Expr::rational(rational(1, 2)))
        }))
    }

    pub fn with(mut self, spec: FunctionSpec) -> Self {
        self.entries.insert(spec.name, spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted names, for diagnostics.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static STANDARD: OnceLock<FunctionTable> = OnceLock::new();

/// Process-wide standard table, built on first use.
pub fn standard_table() -> &'static FunctionTable {
    STANDARD.get_or_init(FunctionTable::standard)
}

fn first(args: Vec<Expr>) -> Expr {
    args.into_iter().next().unwrap_or_else(crate::expr::zero)
}
