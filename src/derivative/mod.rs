//! Validated derivative requests: input checks, whitelisted parsing and the
//! differentiate-then-simplify loop.

mod builder;
mod config;
mod error;
mod pipeline;
mod validate;

pub use builder::build;
pub use config::{Config, DEFAULT_VARIABLE, MAX_ORDER};
pub use error::DiffError;
pub use pipeline::{Derivative, DerivativeRequest, StepTrace, calculate_derivative, run};
pub use validate::{is_identifier, parse_order, validate};
