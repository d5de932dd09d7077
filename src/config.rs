//! Runtime settings. The binary always runs with [`Config::default`].

use crate::simplify::DEFAULT_ITERATIONS;

pub const BOUNDS_PREFIX: &str = "Bounds   : ";
pub const FUNCTION_PREFIX: &str = "Function : ";

/// Environment variable holding the `env_logger` filter for the binary.
pub const LOG_ENV: &str = "INTEGRAL_TEX_LOG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Literal prefix of the first input line.
    pub bounds_prefix: String,
    /// Literal prefix of the second input line.
    pub function_prefix: String,
    /// Integration variable; the integrand may not use any other symbol.
    pub variable: String,
    /// Cap on fixed-point simplification passes over the integrand.
    pub simplify_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bounds_prefix: BOUNDS_PREFIX.to_string(),
            function_prefix: FUNCTION_PREFIX.to_string(),
            variable: "x".to_string(),
            simplify_iterations: DEFAULT_ITERATIONS,
        }
    }
}
