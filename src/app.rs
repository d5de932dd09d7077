//! The read, validate, render pipeline behind the binary.

use std::io::{BufRead, Write};

use log::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::input::{read_prefixed, split_bounds};
use crate::integral::{parse_bound, parse_integrand, DefiniteIntegral};

/// Read the bounds line and the function line from `input` and write the
/// LaTeX integral to `output`.
///
/// Bounds are fully validated before the function line is read, so a bad
/// bound is reported even when the stream ends early.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &Config,
) -> Result<(), AppError> {
    let bounds = read_prefixed(input, &config.bounds_prefix)?;
    let (lower_text, upper_text) = split_bounds(&bounds)?;
    let lower = parse_bound(lower_text)?;
    let upper = parse_bound(upper_text)?;
    debug!("bounds: lower = {lower}, upper = {upper}");

    let function = read_prefixed(input, &config.function_prefix)?;
    let integrand = parse_integrand(&function, config)?;
    debug!("integrand: {integrand}");

    let integral = DefiniteIntegral::new(lower, upper, integrand, &config.variable);
    writeln!(output, "{}", integral.to_latex())?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn render(input: &str) -> Result<String, AppError> {
        let mut out = Vec::new();
        run(&mut Cursor::new(input), &mut out, &Config::default())?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn renders_a_simple_integral() {
        let out = render("Bounds   : 0, 1\nFunction : x**2\n").unwrap();
        assert_eq!(out, "\\int_{0}^{1} x^{2} \\mathrm{d}x\n");
    }

    #[test]
    fn nothing_is_written_on_failure() {
        let mut out = Vec::new();
        let result = run(
            &mut Cursor::new("Bounds   : 0, 1\nFunction : y\n"),
            &mut out,
            &Config::default(),
        );
        assert!(matches!(result, Err(AppError::Value(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn bounds_are_checked_before_the_function_line_is_read() {
        let err = render("Bounds   : 1/0, 1\n").unwrap_err();
        assert!(matches!(err, AppError::Value(_)), "{err:?}");
        let err = render("Bounds   : 0, 1\n").unwrap_err();
        assert!(matches!(err, AppError::UnexpectedEof), "{err:?}");
    }

    #[test]
    fn function_prefix_is_enforced() {
        let err = render("Bounds   : 0, 1\nFunc : x\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input format. Expected 'Function : ...'");
    }

    #[test]
    fn tuples_are_attribute_errors() {
        let err = render("Bounds   : 0, 1\nFunction : x, x\n").unwrap_err();
        assert!(matches!(err, AppError::Attribute(_)), "{err:?}");
    }
}
