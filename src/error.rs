//! Error types for the query surface.

use thiserror::Error;

/// Result type for agent queries.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors reported to the caller of a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The location permission needed for cell info is not granted.
    #[error("location permission not granted")]
    PermissionDenied,

    /// The platform returned no data for the requested source.
    #[error("{0} source unavailable")]
    SourceUnavailable(&'static str),

    /// A newer query replaced this one before it resolved.
    #[error("request overwritten by a newer request")]
    Overwritten,

    /// A report could not be turned into its wire representation.
    #[error("serialization failure: {0}")]
    SerializationFailure(String),

    /// The acquisition layer shut down while the query was pending.
    #[error("request cancelled during shutdown")]
    Cancelled,
}

impl From<serde_json::Error> for SignalError {
    fn from(e: serde_json::Error) -> Self {
        SignalError::SerializationFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SignalError::SourceUnavailable("cell info").to_string(),
            "cell info source unavailable"
        );
        assert!(SignalError::Overwritten.to_string().contains("overwritten"));
    }
}
