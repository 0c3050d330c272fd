//! Scalar field checks shared by the portal forms.

use agora_types::{NationalId, SmsCode, TrackerToken};

/// Character count of the trimmed value lies in `min..max`.
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    len >= min && len < max
}

/// Checksum-validate a national ID (8 digits + mod-23 letter).
pub fn validate_national_id(s: &str) -> bool {
    NationalId::parse(s).is_ok()
}

/// Exactly 8 characters once trimmed; case is normalised, not checked.
pub fn validate_sms_code(s: &str) -> bool {
    SmsCode::parse(s).is_ok()
}

/// Exactly 64 lowercase hexadecimal characters.
pub fn validate_tracker_token(s: &str) -> bool {
    TrackerToken::parse(s).is_ok()
}

/// Postal codes are all-digit strings with a value in `1..=100000`.
pub fn parse_postal_code(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>()
        .ok()
        .filter(|code| (1..=100_000).contains(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_bounds_are_half_open() {
        assert!(!length_between("ab", 3, 60));
        assert!(length_between("abc", 3, 60));
        assert!(length_between(&"x".repeat(59), 3, 60));
        assert!(!length_between(&"x".repeat(60), 3, 60));
        assert!(!length_between("  ab  ", 3, 60));
    }

    #[test]
    fn national_id_worked_example() {
        assert!(validate_national_id("12345678Z"));
        assert!(!validate_national_id("12345678A"));
        assert!(validate_national_id("12345678z"));
    }

    #[test]
    fn postal_codes() {
        assert_eq!(parse_postal_code("41010"), Some(41010));
        assert_eq!(parse_postal_code("00001"), Some(1));
        assert_eq!(parse_postal_code("100000"), Some(100_000));
        assert_eq!(parse_postal_code("100001"), None);
        assert_eq!(parse_postal_code("0"), None);
        assert_eq!(parse_postal_code("41O10"), None);
        assert_eq!(parse_postal_code("-5"), None);
        assert_eq!(parse_postal_code("99999999999"), None);
    }

    #[test]
    fn sms_and_tracker() {
        assert!(validate_sms_code("aa4tl219"));
        assert!(!validate_sms_code("short"));
        assert!(validate_tracker_token(&"f".repeat(64)));
        assert!(!validate_tracker_token(&"F".repeat(64)));
    }
}
