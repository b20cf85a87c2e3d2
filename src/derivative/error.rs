use crate::error::CasError;
use thiserror::Error;

/// Every failure a derivative request can end in. Display is prefixed by the kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("input error: {0}")]
    InputValidation(String),

    #[error("unsupported expression: {message}")]
    FunctionNotSupported {
        message: String,
        #[source]
        source: CasError,
    },

    #[error("calculation error: {message}")]
    Calculation {
        message: String,
        #[source]
        source: CasError,
    },

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl DiffError {
    pub(crate) fn unsupported(source: CasError) -> Self {
        DiffError::FunctionNotSupported {
            message: source.to_string(),
            source,
        }
    }

    pub(crate) fn calculation(source: CasError) -> Self {
        DiffError::Calculation {
            message: source.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DiffError::InputValidation(_) => "input",
            DiffError::FunctionNotSupported { .. } => "unsupported",
            DiffError::Calculation { .. } => "calculation",
            DiffError::Unknown(_) => "unknown",
        }
    }
}
