//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised when constructing a normalised identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgoraError {
    #[error("national ID must be 8 digits followed by a letter: {0:?}")]
    NationalIdFormat(String),

    #[error("national ID checksum letter mismatch: expected {expected}, got {got}")]
    NationalIdChecksum { expected: char, got: char },

    #[error("phone number must be in international format: {0:?}")]
    PhoneFormat(String),

    #[error("SMS code must be exactly {expected} characters, got {got}")]
    SmsCodeLength { expected: usize, got: usize },

    #[error("tracker token must be 64 lowercase hexadecimal characters")]
    TrackerFormat,

    #[error("{0}")]
    Other(String),
}
