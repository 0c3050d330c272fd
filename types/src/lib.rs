//! Fundamental types for the agora election identity portal.
//!
//! This crate defines the data shared by every other crate in the workspace:
//! the voter's personal data, normalised identifiers (phone, national ID,
//! SMS code, tracker token), challenge tokens, and the server error codes.

pub mod challenge;
pub mod error;
pub mod error_code;
pub mod identity;
pub mod tracker;

pub use challenge::{ChallengeAnswer, ChallengeToken};
pub use error::AgoraError;
pub use error_code::{ErrorBody, ErrorCode};
pub use identity::{NationalId, PersonalInfo, Phone, SmsCode};
pub use tracker::TrackerToken;
