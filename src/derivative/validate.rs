use super::error::DiffError;

/// Checks run before any symbolic work.
pub fn validate(
    expression: &str,
    variable: &str,
    order: i64,
    max_order: u32,
) -> Result<(), DiffError> {
    if expression.trim().is_empty() {
        return Err(DiffError::InputValidation("expression must not be empty".into()));
    }
    if !is_identifier(variable) {
        return Err(DiffError::InputValidation(format!(
            "`{variable}` is not a valid variable name"
        )));
    }
    if order < 1 || order > i64::from(max_order) {
        return Err(DiffError::InputValidation(format!(
            "order must be between 1 and {max_order}, got {order}"
        )));
    }
    Ok(())
}

/// Order as typed on the command line.
pub fn parse_order(text: &str) -> Result<i64, DiffError> {
    text.trim().parse::<i64>().map_err(|_| {
        DiffError::InputValidation(format!("order must be an integer, got `{text}`"))
    })
}

/// ASCII letter or `_`, then letters, digits or `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        for ok in ["x", "_", "x_1", "Theta", "_t2"] {
            assert!(is_identifier(ok), "{ok}");
        }
        for bad in ["", "2x", "x-y", "x y", "é"] {
            assert!(!is_identifier(bad), "{bad}");
        }
    }

    #[test]
    fn order_text() {
        assert_eq!(parse_order(" 3 "), Ok(3));
        assert_eq!(parse_order("-1"), Ok(-1));
        assert!(matches!(parse_order("1.5"), Err(DiffError::InputValidation(_))));
        assert!(matches!(parse_order("two"), Err(DiffError::InputValidation(_))));
    }
}
