//! Server-reported error codes.
//!
//! The portal API answers a failed request with a JSON body carrying an
//! `error_codename`. The set of codes the client reacts to is closed; any
//! other string is kept verbatim in [`ErrorCode::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed `error_codename`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The phone number has already completed the voting process.
    AlreadyVoted,
    /// The phone number or source address is blacklisted.
    Blacklisted,
    /// Too many requests within the last hour.
    WaitHour,
    /// Too many requests within the last day.
    WaitDay,
    /// An SMS was issued recently and is still valid.
    WaitExpire,
    /// A submitted field failed a server-side constraint.
    InvalidKeyConstraint,
    /// No SMS is pending verification for this phone.
    SmsNotSent,
    /// Guess attempts exhausted or code expired.
    NeedNewToken,
    /// The SMS code did not match.
    InvalidToken,
    /// The request body was not JSON.
    NotJson,
    /// The request carried keys the server does not accept.
    UnknownKeys,
    /// Any code this client does not know about.
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AlreadyVoted => "already_voted",
            Self::Blacklisted => "blacklisted",
            Self::WaitHour => "wait_hour",
            Self::WaitDay => "wait_day",
            Self::WaitExpire => "wait_expire",
            Self::InvalidKeyConstraint => "invalid_key_constraint",
            Self::SmsNotSent => "sms_notsent",
            Self::NeedNewToken => "need_new_token",
            Self::InvalidToken => "invalid_token",
            Self::NotJson => "not_json",
            Self::UnknownKeys => "unknown_keys",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "already_voted" => Self::AlreadyVoted,
            "blacklisted" => Self::Blacklisted,
            "wait_hour" => Self::WaitHour,
            "wait_day" => Self::WaitDay,
            "wait_expire" => Self::WaitExpire,
            "invalid_key_constraint" => Self::InvalidKeyConstraint,
            "sms_notsent" => Self::SmsNotSent,
            "need_new_token" => Self::NeedNewToken,
            "invalid_token" => Self::InvalidToken,
            "not_json" => Self::NotJson,
            "unknown_keys" => Self::UnknownKeys,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON body of a failed API response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    /// The request field the error is tied to, if any.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub error_codename: Option<String>,
}

impl ErrorBody {
    /// The parsed error code, or `None` when the server sent none.
    pub fn code(&self) -> Option<ErrorCode> {
        self.error_codename.as_deref().map(ErrorCode::from)
    }

    /// Whether the error is tied to the given request field.
    pub fn is_for_field(&self, field: &str) -> bool {
        self.field.as_deref() == Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_str() {
        for code in [
            ErrorCode::AlreadyVoted,
            ErrorCode::Blacklisted,
            ErrorCode::WaitHour,
            ErrorCode::WaitDay,
            ErrorCode::WaitExpire,
            ErrorCode::InvalidKeyConstraint,
            ErrorCode::SmsNotSent,
            ErrorCode::NeedNewToken,
            ErrorCode::InvalidToken,
        ] {
            assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code.clone()));
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        let code: ErrorCode = "something_new".parse().unwrap();
        assert_eq!(code, ErrorCode::Other("something_new".into()));
        assert_eq!(code.to_string(), "something_new");
    }

    #[test]
    fn error_body_parses_with_missing_fields() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error_codename": "invalid_token"}"#).unwrap();
        assert_eq!(body.code(), Some(ErrorCode::InvalidToken));
        assert!(body.field.is_none());

        let body: ErrorBody = serde_json::from_str(
            r#"{"message": "bad", "field": "challenge_text", "error_codename": null}"#,
        )
        .unwrap();
        assert_eq!(body.code(), None);
        assert!(body.is_for_field("challenge_text"));
    }
}
