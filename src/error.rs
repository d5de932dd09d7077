use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Failures raised while parsing and evaluating expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CasError {
    /// The text is not a well-formed expression.
    #[error("could not parse '{input}': {detail}")]
    Parse { input: String, detail: String },
    /// The expression is well formed but has no meaningful value.
    #[error("{0}")]
    Value(String),
    /// The parsed value does not support the requested operation.
    #[error("{0}")]
    Unsupported(String),
}

/// Every way a run of the command line tool can fail. The `Display` text is
/// the line written to stderr.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input format. Expected '{prefix}...'")]
    Format { prefix: String },
    #[error("Invalid bounds format. Expected 'a, b'")]
    Bounds,
    #[error("Input ended unexpectedly.")]
    UnexpectedEof,
    #[error("Value error: {0}")]
    Value(String),
    #[error("Attribute error: {0}")]
    Attribute(String),
    #[error("Error processing input: {0}")]
    Processing(String),
    #[error("Process interrupted by user.")]
    Interrupted,
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<CasError> for AppError {
    fn from(err: CasError) -> Self {
        match err {
            CasError::Parse { .. } | CasError::Value(_) => AppError::Value(err.to_string()),
            CasError::Unsupported(detail) => AppError::Attribute(detail),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => AppError::UnexpectedEof,
            io::ErrorKind::Interrupted => AppError::Interrupted,
            _ => AppError::Processing(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_onto_cli_categories() {
        let parse = CasError::Parse {
            input: "x**".into(),
            detail: "expected an exponent at position 3".into(),
        };
        assert_eq!(
            AppError::from(parse).to_string(),
            "Value error: could not parse 'x**': expected an exponent at position 3"
        );
        assert_eq!(
            AppError::from(CasError::Value("division by zero in '1/0'".into())).to_string(),
            "Value error: division by zero in '1/0'"
        );
        assert_eq!(
            AppError::from(CasError::Unsupported("no".into())).to_string(),
            "Attribute error: no"
        );
    }

    #[test]
    fn io_errors_map_onto_cli_categories() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(AppError::from(eof), AppError::UnexpectedEof));
        let bad = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert_eq!(
            AppError::from(bad).to_string(),
            "Error processing input: stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn format_error_names_the_prefix() {
        let err = AppError::Format {
            prefix: "Bounds   : ".into(),
        };
        assert_eq!(err.to_string(), "Invalid input format. Expected 'Bounds   : ...'");
        assert_eq!(err.exit_code(), 1);
    }
}
