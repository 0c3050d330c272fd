//! Voter identity data and its normalised identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AgoraError;

/// Personal data supplied by a voter on the Identify form.
///
/// Every field has been validated locally before a value of this type is
/// built; `phone` and `national_id` hold normalised forms, never raw text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: NationalId,
    pub phone: Phone,
    pub postal_code: u32,
    pub above_age: bool,
    pub accept_conditions: bool,
    pub receive_updates: bool,
}

/// Replace all but the last three characters with `*`, for log output.
fn mask(raw: &str) -> String {
    let count = raw.chars().count();
    raw.chars()
        .enumerate()
        .map(|(i, c)| if i + 3 < count { '*' } else { c })
        .collect()
}

// ── Phone ───────────────────────────────────────────────────────────────

/// A phone number in international format, starting with `+`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
    /// Wrap an already-normalised number.
    ///
    /// Only the leading `+` and a non-empty remainder are checked. What may
    /// follow the `+` is decided by the deployment's phone pattern, which
    /// the caller has already applied.
    pub fn from_normalized(raw: impl Into<String>) -> Result<Self, AgoraError> {
        let raw = raw.into();
        match raw.strip_prefix('+') {
            Some(rest) if !rest.is_empty() => Ok(Self(raw)),
            _ => Err(AgoraError::PhoneFormat(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── NationalId ──────────────────────────────────────────────────────────

/// A national identity number: 8 digits and a mod-23 checksum letter.
///
/// The stored form always carries an upper-case letter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(String);

impl NationalId {
    /// Checksum alphabet, indexed by `digits mod 23`.
    pub const CHECKSUM_LETTERS: &'static [u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";

    /// Expected checksum letter for the numeric part of an ID.
    pub fn checksum_letter(number: u32) -> char {
        Self::CHECKSUM_LETTERS[(number % 23) as usize] as char
    }

    /// Parse and checksum-verify an ID such as `12345678Z`.
    ///
    /// The letter is matched case-insensitively. The 8 digits are read as a
    /// base-10 integer, so leading zeros carry no weight in the checksum.
    pub fn parse(raw: &str) -> Result<Self, AgoraError> {
        let raw = raw.trim();
        let bytes = raw.as_bytes();
        let well_formed = bytes.len() == 9
            && bytes[..8].iter().all(u8::is_ascii_digit)
            && bytes[8].is_ascii_alphabetic();
        if !well_formed {
            return Err(AgoraError::NationalIdFormat(raw.to_string()));
        }

        let number: u32 = raw[..8]
            .parse()
            .map_err(|_| AgoraError::NationalIdFormat(raw.to_string()))?;
        let expected = Self::checksum_letter(number);
        let got = (bytes[8] as char).to_ascii_uppercase();
        if got != expected {
            return Err(AgoraError::NationalIdChecksum { expected, got });
        }

        Ok(Self(format!("{}{}", &raw[..8], got)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── SmsCode ─────────────────────────────────────────────────────────────

/// The one-time code delivered by SMS, upper-cased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsCode(String);

impl SmsCode {
    pub const LENGTH: usize = 8;

    /// Trim and upper-case the user's input; only the length is enforced.
    pub fn parse(raw: &str) -> Result<Self, AgoraError> {
        let code = raw.trim().to_uppercase();
        let got = code.chars().count();
        if got != Self::LENGTH {
            return Err(AgoraError::SmsCodeLength {
                expected: Self::LENGTH,
                got,
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_example() {
        // 12345678 mod 23 = 10 -> 'Z'
        assert_eq!(NationalId::checksum_letter(12_345_678), 'Z');
        assert!(NationalId::parse("12345678Z").is_ok());
        assert_eq!(
            NationalId::parse("12345678A"),
            Err(AgoraError::NationalIdChecksum {
                expected: 'Z',
                got: 'A'
            })
        );
    }

    #[test]
    fn checksum_letter_is_case_insensitive_and_normalised() {
        let id = NationalId::parse(" 12345678z ").unwrap();
        assert_eq!(id.as_str(), "12345678Z");
    }

    #[test]
    fn leading_zeros_are_not_significant() {
        // 23 mod 23 = 0 -> 'T'
        assert!(NationalId::parse("00000023T").is_ok());
        assert!(NationalId::parse("00000000T").is_ok());
    }

    #[test]
    fn malformed_national_ids_rejected() {
        for raw in ["", "1234567Z", "123456789", "1234567AZ", "12345678ZZ", "１２345678Z"] {
            assert!(
                matches!(NationalId::parse(raw), Err(AgoraError::NationalIdFormat(_))),
                "{raw:?} should be a format error"
            );
        }
    }

    #[test]
    fn phone_requires_plus_and_number() {
        assert!(Phone::from_normalized("+34666666666").is_ok());
        assert!(Phone::from_normalized("+34-666-666-666").is_ok());
        assert!(Phone::from_normalized("34666666666").is_err());
        assert!(Phone::from_normalized("+").is_err());
        assert!(Phone::from_normalized("").is_err());
    }

    #[test]
    fn masked_keeps_last_three() {
        let phone = Phone::from_normalized("+34666666123").unwrap();
        assert_eq!(phone.masked(), "*********123");
        assert_eq!(mask("ab"), "ab");
    }

    #[test]
    fn sms_code_is_uppercased_and_length_checked() {
        assert_eq!(SmsCode::parse(" aa4tl219 ").unwrap().as_str(), "AA4TL219");
        assert_eq!(
            SmsCode::parse("AA4TL21"),
            Err(AgoraError::SmsCodeLength {
                expected: 8,
                got: 7
            })
        );
    }
}
