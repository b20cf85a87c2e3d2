use tracing::{debug, info};

use super::builder::build;
use super::config::{Config, DEFAULT_VARIABLE, MAX_ORDER};
use super::error::DiffError;
use super::validate::validate;
use crate::calculus::differentiate;
use crate::expr::Expr;
use crate::functions::FunctionTable;
use crate::simplify::simplify;

/// Input followed by each simplified derivative; entry `i` is the i-th derivative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepTrace(Vec<Expr>);

impl StepTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expr: Expr) {
        self.0.push(expr);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Expr] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivative {
    pub result: Expr,
    pub steps: Option<StepTrace>,
}

/// One derivative to compute, as received from the caller and not yet validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivativeRequest {
    pub expression: String,
    pub variable: String,
    pub order: i64,
    pub track_steps: bool,
    pub max_order: u32,
}

impl DerivativeRequest {
    pub fn new(expression: impl Into<String>, order: i64) -> Self {
        DerivativeRequest {
            expression: expression.into(),
            variable: DEFAULT_VARIABLE.to_string(),
            order,
            track_steps: false,
            max_order: MAX_ORDER,
        }
    }

    pub fn from_config(config: &Config, expression: impl Into<String>, order: i64) -> Self {
        DerivativeRequest {
            variable: config.default_variable.clone(),
            max_order: config.max_order,
            ..Self::new(expression, order)
        }
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    pub fn with_steps(mut self, track_steps: bool) -> Self {
        self.track_steps = track_steps;
        self
    }

    pub fn with_max_order(mut self, max_order: u32) -> Self {
        self.max_order = max_order;
        self
    }
}

/// Validate, build and differentiate in one go.
pub fn calculate_derivative(
    request: &DerivativeRequest,
    table: &FunctionTable,
) -> Result<Derivative, DiffError> {
    info!(
        expression = %request.expression,
        variable = %request.variable,
        order = request.order,
        "calculating derivative"
    );
    validate(
        &request.expression,
        &request.variable,
        request.order,
        request.max_order,
    )?;
    let expr = build(&request.expression, table)?;
    run(
        &expr,
        &request.variable,
        request.order as u32,
        request.track_steps,
    )
}

/// Differentiate `order` times, simplifying after every step.
pub fn run(
    expr: &Expr,
    variable: &str,
    order: u32,
    track_steps: bool,
) -> Result<Derivative, DiffError> {
    let mut steps = track_steps.then(|| {
        let mut trace = StepTrace::new();
        trace.push(expr.clone());
        trace
    });

    let mut current = expr.clone();
    for step in 1..=order {
        let raw = differentiate(variable, &current).map_err(DiffError::calculation)?;
        current = simplify(raw).map_err(DiffError::calculation)?;
        debug!(step, nodes = current.node_count(), result = %current, "differentiated");
        if let Some(trace) = steps.as_mut() {
            trace.push(current.clone());
        }
    }

    Ok(Derivative {
        result: current,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Func, div, one, sub};

    #[test]
    fn trace_starts_with_the_input() {
        let e = Expr::call(Func::Sin, Expr::var("x"));
        let out = run(&e, "x", 2, true).unwrap();
        let steps = out.steps.unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps.as_slice()[0], e);
        assert_eq!(steps.as_slice()[2], out.result);
    }

    #[test]
    fn engine_failures_are_calculation_errors() {
        // d/dx x/(1-1)
        let e = div(Expr::var("x"), sub(one(), one()));
        assert!(matches!(
            run(&e, "x", 1, false),
            Err(DiffError::Calculation { .. })
        ));
    }

    #[test]
    fn request_builders_override_defaults() {
        let config = Config {
            default_variable: "t".into(),
            max_order: 3,
        };
        let req = DerivativeRequest::from_config(&config, "t**2", 2).with_steps(true);
        assert_eq!(req.variable, "t");
        assert_eq!(req.max_order, 3);
        assert!(req.track_steps);
    }
}
