//! Line-oriented input validation.

use std::io::BufRead;

use crate::error::AppError;

const BOUNDS_SEPARATOR: &str = ", ";

/// Read one line and return what follows `prefix`, trimmed.
///
/// The prefix must match exactly, including its internal spacing, and
/// something other than whitespace must follow it.
pub fn read_prefixed<R: BufRead>(reader: &mut R, prefix: &str) -> Result<String, AppError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(AppError::UnexpectedEof);
    }
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line.as_str());

    let rest = line
        .strip_prefix(prefix)
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| AppError::Format {
            prefix: prefix.to_string(),
        })?;
    Ok(rest.to_string())
}

/// Split `a, b` into its two halves.
pub fn split_bounds(text: &str) -> Result<(&str, &str), AppError> {
    let parts: Vec<&str> = text.split(BOUNDS_SEPARATOR).collect();
    match parts.as_slice() {
        [lower, upper] if !lower.trim().is_empty() && !upper.trim().is_empty() => {
            Ok((lower.trim(), upper.trim()))
        }
        _ => Err(AppError::Bounds),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const PREFIX: &str = "Bounds   : ";

    fn read(input: &str) -> Result<String, AppError> {
        read_prefixed(&mut Cursor::new(input), PREFIX)
    }

    #[test]
    fn strips_prefix_and_whitespace() {
        assert_eq!(read("Bounds   : 0, 1\n").unwrap(), "0, 1");
        assert_eq!(read("Bounds   :    0, 1   \r\n").unwrap(), "0, 1");
        assert_eq!(read("Bounds   : 0, 1").unwrap(), "0, 1");
    }

    #[test]
    fn prefix_must_match_exactly() {
        for line in ["Bounds  : 0, 1\n", "bounds: 0, 1\n", " Bounds   : 0, 1\n", "0, 1\n"] {
            let err = read(line).unwrap_err();
            assert!(matches!(err, AppError::Format { .. }), "{line:?} gave {err:?}");
        }
    }

    #[test]
    fn empty_remainder_is_a_format_error() {
        for line in ["Bounds   : \n", "Bounds   :    \t \n", "Bounds   : "] {
            let err = read(line).unwrap_err();
            assert_eq!(err.to_string(), "Invalid input format. Expected 'Bounds   : ...'");
        }
    }

    #[test]
    fn exhausted_stream_is_reported() {
        assert!(matches!(read("").unwrap_err(), AppError::UnexpectedEof));
    }

    #[test]
    fn consumes_exactly_one_line() {
        let mut cursor = Cursor::new("Bounds   : 0, 1\nFunction : x\n");
        read_prefixed(&mut cursor, PREFIX).unwrap();
        assert_eq!(read_prefixed(&mut cursor, "Function : ").unwrap(), "x");
    }

    #[test]
    fn bounds_need_exactly_two_parts() {
        assert_eq!(split_bounds("0, 1").unwrap(), ("0", "1"));
        assert_eq!(split_bounds("-pi/2, pi/2").unwrap(), ("-pi/2", "pi/2"));
        for text in ["0", "0,1", "0, 1, 2", ", 1", "0, ", "0,  , 1"] {
            assert!(matches!(split_bounds(text), Err(AppError::Bounds)), "{text:?}");
        }
    }
}
