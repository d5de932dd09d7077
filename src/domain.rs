//! Checks that a well-formed expression also denotes a value.

use num_traits::Signed;

use crate::error::{CasError, Result};
use crate::expr::Expr;
use crate::simplify::simplify_fully;

/// Reject divisions by zero, negative powers of zero and functions evaluated
/// at a pole (`log`, `cot` and `csc` at zero) anywhere in `expr`.
///
/// Divisors and arguments are simplified before the test, so `1/(x - x)` is
/// caught as well as `1/0`.
pub fn check_finite(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) | Expr::Pi | Expr::Infinity => Ok(()),
        Expr::Div(a, b) => {
            check_finite(a)?;
            check_finite(b)?;
            if simplify_fully((**b).clone()).is_zero() {
                return Err(CasError::Value(format!("division by zero in '{expr}'")));
            }
            Ok(())
        }
        Expr::Pow(base, exp) => {
            check_finite(base)?;
            check_finite(exp)?;
            if !simplify_fully((**base).clone()).is_zero() {
                return Ok(());
            }
            match simplify_fully((**exp).clone()) {
                Expr::Constant(k) if k.is_negative() => Err(CasError::Value(format!(
                    "zero raised to a negative power in '{expr}'"
                ))),
                _ => Ok(()),
            }
        }
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
            check_finite(a)?;
            check_finite(b)
        }
        Expr::Neg(inner) => check_finite(inner),
        Expr::Log(arg) | Expr::Cot(arg) | Expr::Csc(arg) => {
            check_finite(arg)?;
            if simplify_fully((**arg).clone()).is_zero() {
                return Err(CasError::Value(format!("'{expr}' is undefined at zero")));
            }
            Ok(())
        }
        other => match other.function_arg() {
            Some(arg) => check_finite(arg),
            None => Ok(()),
        },
    }
}

/// Reject a simplified expression that contains an indeterminate form such
/// as `oo - oo` or `0*oo`. `source` is the text the user wrote.
pub fn check_determinate(expr: &Expr, source: &str) -> Result<()> {
    if contains_undefined(expr) {
        return Err(CasError::Value(format!(
            "indeterminate form in '{}'",
            source.trim()
        )));
    }
    Ok(())
}

fn contains_undefined(expr: &Expr) -> bool {
    match expr {
        Expr::Undefined => true,
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
            contains_undefined(a) || contains_undefined(b)
        }
        Expr::Neg(inner) => contains_undefined(inner),
        other => other.function_arg().is_some_and(contains_undefined),
    }
}

/// Reject any free symbol other than `var`.
pub fn check_single_variable(expr: &Expr, var: &str) -> Result<()> {
    let strays: Vec<String> = expr
        .free_symbols()
        .into_iter()
        .filter(|name| name != var)
        .collect();
    if strays.is_empty() {
        Ok(())
    } else {
        Err(CasError::Value(format!(
            "the function may only depend on {var}, found {}",
            strays.join(", ")
        )))
    }
}
