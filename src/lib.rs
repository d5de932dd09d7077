//! Render definite integrals as LaTeX from a two line textual description.
//!
//! The library side is a small computer algebra core: a parser for
//! mathematical expressions, a rule based simplifier and a LaTeX printer.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod expr;
pub mod format;
pub mod input;
pub mod integral;
pub mod parser;
pub mod polynomial;
pub mod simplify;

pub use config::Config;
pub use error::{AppError, CasError, Result};
pub use expr::{add, div, mul, neg, one, pow, rational, sub, zero, Expr, Rational};
pub use format::{integral_latex, latex, pretty};
pub use integral::{parse_bound, parse_integrand, DefiniteIntegral};
pub use parser::{parse_expr, parse_statement, RelOp, Statement};
pub use polynomial::Poly;
pub use simplify::{canonicalize, expand, normalize, simplify, simplify_fully, simplify_with_limit};
