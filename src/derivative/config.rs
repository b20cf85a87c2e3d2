/// Variable differentiated against when none is given.
pub const DEFAULT_VARIABLE: &str = "x";

/// Highest derivative order accepted unless overridden.
pub const MAX_ORDER: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub default_variable: String,
    pub max_order: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_variable: DEFAULT_VARIABLE.to_string(),
            max_order: MAX_ORDER,
        }
    }
}
