//! Formatting helpers for rendering expressions.

pub mod expr;
pub mod integral;
pub mod latex;

pub use expr::pretty;
pub use integral::integral_latex;
pub use latex::latex;
