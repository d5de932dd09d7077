//! Definite integrals assembled from validated input pieces.

use log::trace;

use crate::config::Config;
use crate::domain::{check_determinate, check_finite, check_single_variable};
use crate::error::Result;
use crate::expr::Expr;
use crate::format::{integral_latex, latex};
use crate::parser::parse_statement;
use crate::simplify::{canonicalize, simplify};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefiniteIntegral {
    pub lower: Expr,
    pub upper: Expr,
    pub integrand: Expr,
    pub variable: String,
}

impl DefiniteIntegral {
    pub fn new(lower: Expr, upper: Expr, integrand: Expr, variable: impl Into<String>) -> Self {
        DefiniteIntegral {
            lower,
            upper,
            integrand,
            variable: variable.into(),
        }
    }

    /// Parse and validate all three pieces in input order.
    pub fn parse(lower: &str, upper: &str, function: &str, config: &Config) -> Result<Self> {
        let lower = parse_bound(lower)?;
        let upper = parse_bound(upper)?;
        let integrand = parse_integrand(function, config)?;
        Ok(DefiniteIntegral::new(lower, upper, integrand, &config.variable))
    }

    pub fn to_latex(&self) -> String {
        integral_latex(
            &latex(&self.lower),
            &latex(&self.upper),
            &latex(&self.integrand),
            &self.variable,
        )
    }
}

/// A bound is any scalar expression with a value: `oo` is allowed but
/// `oo - oo` is not. Only light simplification is applied so that `2*pi`
/// stays `2 \pi` rather than being rearranged.
pub fn parse_bound(text: &str) -> Result<Expr> {
    let expr = parse_statement(text)?.into_expr()?;
    check_finite(&expr)?;
    let expr = simplify(expr);
    check_determinate(&expr, text)?;
    trace!("bound {text:?} -> {expr}");
    Ok(expr)
}

/// The integrand is canonicalized and may only mention the integration variable.
pub fn parse_integrand(text: &str, config: &Config) -> Result<Expr> {
    let expr = parse_statement(text)?.into_expr()?;
    check_finite(&expr)?;
    let expr = canonicalize(expr, config.simplify_iterations);
    check_determinate(&expr, text)?;
    check_single_variable(&expr, &config.variable)?;
    trace!("integrand {text:?} -> {expr}");
    Ok(expr)
}
