use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown function `{name}` (supported: {supported})")]
    UnknownFunction { name: String, supported: String },
    #[error("`{name}` takes {expected} argument(s) but {found} were given")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression grew past {limit} nodes")]
    TooLarge { limit: usize },
}
