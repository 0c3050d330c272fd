use proptest::prelude::*;

use agora_types::{AgoraError, NationalId, SmsCode, TrackerToken};

proptest! {
    /// An ID is valid iff its letter is CHECKSUM_LETTERS[digits mod 23].
    #[test]
    fn national_id_valid_iff_checksum_matches(
        number in 0u32..100_000_000,
        letter in prop::char::range('A', 'Z'),
        lowercase in any::<bool>(),
    ) {
        let supplied = if lowercase { letter.to_ascii_lowercase() } else { letter };
        let raw = format!("{number:08}{supplied}");
        let expected = NationalId::CHECKSUM_LETTERS[(number % 23) as usize] as char;
        prop_assert_eq!(NationalId::parse(&raw).is_ok(), letter == expected);
    }

    /// The computed checksum letter always parses back.
    #[test]
    fn computed_checksum_always_accepted(number in 0u32..100_000_000) {
        let raw = format!("{number:08}{}", NationalId::checksum_letter(number));
        let id = NationalId::parse(&raw).unwrap();
        prop_assert_eq!(id.as_str(), raw.as_str());
    }

    /// Anything not shaped like 8 digits + a letter is a format error.
    #[test]
    fn non_grammar_inputs_are_format_errors(raw in "[0-9]{0,7}[A-Z]|[0-9]{9,12}|[A-Z]{9}") {
        prop_assert!(matches!(
            NationalId::parse(&raw),
            Err(AgoraError::NationalIdFormat(_))
        ));
    }

    /// SMS codes accept exactly 8 characters, upper-cased.
    #[test]
    fn sms_code_length_decides(raw in "[a-zA-Z0-9]{1,12}") {
        let parsed = SmsCode::parse(&raw);
        prop_assert_eq!(parsed.is_ok(), raw.len() == 8);
        if let Ok(code) = parsed {
            prop_assert_eq!(code.as_str(), raw.to_uppercase());
        }
    }

    /// Tracker tokens accept exactly 64 lowercase hex digits.
    #[test]
    fn tracker_token_accepts_lower_hex(raw in "[0-9a-f]{64}") {
        prop_assert!(TrackerToken::parse(&raw).is_ok());
    }

    #[test]
    fn tracker_token_rejects_any_uppercase(raw in "[0-9a-f]{10}[A-F][0-9a-f]{53}") {
        prop_assert!(TrackerToken::parse(&raw).is_err());
    }
}
