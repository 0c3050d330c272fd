use proptest::prelude::*;

use agora_validation::{normalize_phone, validate_email, PhonePattern};

fn spanish() -> PhonePattern {
    PhonePattern::new(r"^\+34\d{9}$").unwrap()
}

proptest! {
    /// normalize(normalize(x)) == normalize(x) for every accepted input.
    #[test]
    fn phone_normalisation_is_idempotent(
        prefix in prop::sample::select(vec!["", "34", "0034", "+34", " +34 "]),
        digits in "[6-9][0-9]{8}",
        spaced in any::<bool>(),
    ) {
        let body = if spaced {
            format!("{} {} {}", &digits[..3], &digits[3..6], &digits[6..])
        } else {
            digits.clone()
        };
        let raw = format!("{prefix}{body}");
        let pattern = spanish();
        let once = normalize_phone(&raw, &pattern);
        prop_assert!(once.is_some(), "{raw:?} should normalise");
        let once = once.unwrap();
        prop_assert_eq!(once.as_str(), format!("+34{digits}"));
        let twice = normalize_phone(once.as_str(), &pattern).unwrap();
        prop_assert_eq!(twice, once);
    }

    /// Inputs made only of spaces never normalise.
    #[test]
    fn blank_phone_is_absent(raw in " {0,8}") {
        prop_assert!(normalize_phone(&raw, &spanish()).is_none());
    }

    /// Simple dot-atom addresses are always accepted.
    #[test]
    fn dot_atom_addresses_accepted(
        local in "[a-z0-9]{1,12}(\\.[a-z0-9]{1,8}){0,2}",
        domain in "[a-z0-9]{1,12}(\\.[a-z]{2,6}){1,2}",
    ) {
        let address = format!("{local}@{domain}");
        prop_assert!(validate_email(&address));
    }

    /// An address without `@` is never accepted.
    #[test]
    fn addresses_without_at_rejected(s in "[a-z0-9.]{0,30}") {
        prop_assert!(!validate_email(&s));
    }
}
