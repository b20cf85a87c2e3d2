use clap::Parser;

use crate::derivative::{
    Config, DEFAULT_VARIABLE, DerivativeRequest, DiffError, MAX_ORDER, calculate_derivative,
    parse_order,
};
use crate::format::{RenderMode, step_table};
use crate::functions::standard_table;

#[derive(Parser, Debug)]
#[command(name = "rdiff", version)]
#[command(about = "Symbolic n-th derivative calculator", long_about = None)]
pub struct Cli {
    /// Expression to differentiate, e.g. "x**2*sin(x)"
    #[arg(allow_hyphen_values = true)]
    pub expression: String,

    /// Derivative order
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub order: String,

    /// Variable to differentiate with respect to
    #[arg(short, long, default_value = DEFAULT_VARIABLE)]
    pub variable: String,

    /// Print every intermediate derivative before the result
    #[arg(short, long)]
    pub steps: bool,

    /// Render expressions as LaTeX
    #[arg(short, long)]
    pub latex: bool,

    /// Highest order accepted
    #[arg(long, default_value_t = MAX_ORDER, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_order: u32,

    /// Diagnostics written to stderr at this level and above
    #[arg(long, default_value_t = tracing::Level::WARN)]
    pub log_level: tracing::Level,
}

impl Cli {
    pub fn mode(&self) -> RenderMode {
        if self.latex {
            RenderMode::Latex
        } else {
            RenderMode::Plain
        }
    }

    pub fn request(&self) -> Result<DerivativeRequest, DiffError> {
        let order = parse_order(&self.order)?;
        Ok(DerivativeRequest::from_config(&Config::default(), self.expression.clone(), order)
            .with_variable(self.variable.clone())
            .with_steps(self.steps)
            .with_max_order(self.max_order))
    }
}

/// Everything printed on stdout for a successful run.
pub fn run(cli: &Cli) -> Result<String, DiffError> {
    let request = cli.request()?;
    let derivative = calculate_derivative(&request, standard_table())?;
    let mode = cli.mode();
    let result = mode.render(&derivative.result);

    Ok(match &derivative.steps {
        Some(steps) => format!(
            "{}\n\nFinal result:\n{result}",
            step_table(steps, &request.variable, mode)
        ),
        None => result,
    })
}

/// Process exit code for every failed invocation.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Classified errors pass through untouched; anything else is reported as unknown.
pub fn classify(error: &anyhow::Error) -> DiffError {
    match error.downcast_ref::<DiffError>() {
        Some(known) => known.clone(),
        None => DiffError::Unknown(format!("{error:#}")),
    }
}

/// The single stderr line and the exit code for a failed invocation.
pub fn report(error: &anyhow::Error) -> (String, i32) {
    (classify(error).to_string(), FAILURE_EXIT_CODE)
}
