//! Tracker tokens identifying an anonymised cast vote.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AgoraError;

/// A 64-character lowercase hexadecimal vote tracker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackerToken(String);

impl TrackerToken {
    pub const LENGTH: usize = 64;

    /// Accept exactly `^[0-9a-f]{64}$` after trimming surrounding whitespace.
    ///
    /// Upper-case hex is rejected rather than folded.
    pub fn parse(raw: &str) -> Result<Self, AgoraError> {
        let raw = raw.trim();
        let valid = raw.len() == Self::LENGTH
            && raw
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(AgoraError::TrackerFormat);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
