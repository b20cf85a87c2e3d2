//! Rendering of expressions and derivation steps.

pub mod expr;
pub mod latex;
pub mod steps;

pub use expr::pretty;
pub use latex::latex;
pub use steps::step_table;

use crate::expr::Expr;

/// Output notation chosen on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Plain,
    Latex,
}

impl RenderMode {
    pub fn render(self, expr: &Expr) -> String {
        match self {
            RenderMode::Plain => pretty(expr),
            RenderMode::Latex => latex(expr),
        }
    }
}
