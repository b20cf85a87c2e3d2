use tracing::debug;

use super::error::DiffError;
use crate::expr::Expr;
use crate::functions::FunctionTable;
use crate::parser::parse_expr;

/// Parse `text` against `table`; every rejection is reported as [`DiffError::FunctionNotSupported`].
pub fn build(text: &str, table: &FunctionTable) -> Result<Expr, DiffError> {
    debug!(expression = text, "building expression");
    parse_expr(text, table).map_err(|err| {
        debug!(error = %err, "expression rejected");
        DiffError::unsupported(err)
    })
}
