use crate::derivative::StepTrace;

use super::RenderMode;

/// Box-drawn table of every step, first row is the input expression.
///
/// ```text
/// Derivative steps (d/dx)
/// +--------+--------+
/// | Step 1 | sin(x) |
/// | Step 2 | cos(x) |
/// +--------+--------+
/// ```
pub fn step_table(steps: &StepTrace, variable: &str, mode: RenderMode) -> String {
    let rows: Vec<(String, String)> = steps
        .iter()
        .enumerate()
        .map(|(i, expr)| (format!("Step {}", i + 1), mode.render(expr)))
        .collect();

    let label_width = column_width(rows.iter().map(|(label, _)| label));
    let expr_width = column_width(rows.iter().map(|(_, body)| body));
    let rule = format!("+{}+{}+", "-".repeat(label_width + 2), "-".repeat(expr_width + 2));

    let mut out = format!("Derivative steps (d/d{variable})\n{rule}\n");
    for (label, body) in &rows {
        out.push_str(&format!(
            "| {label:<label_width$} | {body:<expr_width$} |\n"
        ));
    }
    out.push_str(&rule);
    out
}

fn column_width<'a>(cells: impl Iterator<Item = &'a String>) -> usize {
    cells.map(|cell| cell.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, Func};

    #[test]
    fn rows_are_padded_to_the_widest_cell() {
        let mut trace = StepTrace::new();
        trace.push(Expr::call(Func::Sin, Expr::var("x")));
        trace.push(Expr::call(Func::Cos, Expr::var("x")));
        let table = step_table(&trace, "x", RenderMode::Plain);
        assert_eq!(
            table,
            "Derivative steps (d/dx)\n\
             +--------+--------+\n\
             | Step 1 | sin(x) |\n\
             | Step 2 | cos(x) |\n\
             +--------+--------+"
        );
    }
}
