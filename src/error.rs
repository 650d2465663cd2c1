//! Error types for MBO → MBP reconstruction.
//!
//! Clean error handling using `thiserror` for ergonomic error definitions.
//! Book-level anomalies (unknown orders, over-cancels) are not errors; they
//! are reported through [`crate::lob::CancelOutcome`] and the book statistics.

use thiserror::Error;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, MbpError>;

/// Main error type for reconstruction operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MbpError {
    /// Action code not in {R, A, C, T, F}
    #[error("Invalid action: {0:?}")]
    InvalidAction(String),

    /// Side code not in {B, A, N}
    #[error("Invalid side: {0:?}")]
    InvalidSide(String),

    /// Price text that is not an exact decimal with at most 9 fractional digits
    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    /// A numeric field that failed to parse
    #[error("Invalid value for field `{field}` on line {line}: {value:?}")]
    InvalidField {
        field: &'static str,
        value: String,
        line: u64,
    },

    /// A field required by the event's action is absent
    #[error("Missing field `{field}` on line {line}")]
    MissingField { field: &'static str, line: u64 },

    /// Book aggregates disagree with the order registry
    #[error("Book inconsistency: {0}")]
    InconsistentState(String),

    /// Add for an order id that is already live (under the reject policy)
    #[error("Duplicate order ID: {0}")]
    DuplicateOrderId(u64),

    /// CSV reader/writer failure
    #[error("CSV error: {0}")]
    Csv(String),

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Generic(String),
}

impl MbpError {
    /// Create a generic error from any string-like type.
    pub fn generic(msg: impl Into<String>) -> Self {
        MbpError::Generic(msg.into())
    }

    /// Whether the error concerns a single input row (and may be skipped).
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            MbpError::InvalidAction(_)
                | MbpError::InvalidSide(_)
                | MbpError::InvalidPrice(_)
                | MbpError::InvalidField { .. }
                | MbpError::MissingField { .. }
                | MbpError::DuplicateOrderId(_)
        )
    }
}

impl From<std::io::Error> for MbpError {
    fn from(err: std::io::Error) -> Self {
        MbpError::Io(err.to_string())
    }
}

impl From<csv::Error> for MbpError {
    fn from(err: csv::Error) -> Self {
        MbpError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for MbpError {
    fn from(err: serde_json::Error) -> Self {
        MbpError::Config(err.to_string())
    }
}

impl From<String> for MbpError {
    fn from(err: String) -> Self {
        MbpError::Generic(err)
    }
}

impl From<&str> for MbpError {
    fn from(err: &str) -> Self {
        MbpError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MbpError::DuplicateOrderId(12345);
        assert_eq!(err.to_string(), "Duplicate order ID: 12345");

        let err = MbpError::MissingField {
            field: "price",
            line: 7,
        };
        assert_eq!(err.to_string(), "Missing field `price` on line 7");
    }

    #[test]
    fn test_row_errors_are_skippable() {
        assert!(MbpError::InvalidPrice("abc".into()).is_row_error());
        assert!(MbpError::DuplicateOrderId(1).is_row_error());
        assert!(!MbpError::Io("disk".into()).is_row_error());
        assert!(!MbpError::Config("levels".into()).is_row_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: MbpError = io.into();
        assert!(matches!(err, MbpError::Io(_)));
    }
}
