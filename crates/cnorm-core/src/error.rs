//! # Error Types
//!
//! Errors raised by the foundational types. Higher crates wrap these in
//! their own enums (`PolicyError`, `RepoError`) via `#[from]`.

use thiserror::Error;

/// Error from a foundational type constructor or conversion.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier (target, param, namespace, document id) was rejected.
    #[error("invalid {kind} {value:?}: {reason}")]
    InvalidIdentifier {
        /// Which identifier family was being constructed.
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp string was malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no place in a document; values are bool, int or str.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_identifier_display_names_kind_and_value() {
        let err = CoreError::InvalidIdentifier {
            kind: "param",
            value: "".into(),
            reason: "must not be empty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("param"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn canonicalization_converts_into_core_error() {
        let err: CoreError = CanonicalizationError::FloatRejected(0.5).into();
        assert!(err.to_string().contains("0.5"));
    }
}
