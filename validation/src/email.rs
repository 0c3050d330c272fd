//! RFC-822 address grammar check.

use once_cell::sync::Lazy;
use regex::Regex;

// local-part: atom or quoted-string, dot separated; domain: atom or
// bracketed domain literal, dot separated. Code points above U+00FF are
// outside every excluded range and so count as atom characters.
static RFC822: Lazy<Regex> = Lazy::new(|| {
    let atom = r"[^\x00-\x20\x22\x28\x29\x2c\x2e\x3a-\x3c\x3e\x40\x5b-\x5d\x7f-\xff]+";
    let quoted = r"\x22(?:[^\x0d\x22\x5c\x80-\xff]|\x5c[\x00-\x7f])*\x22";
    let literal = r"\x5b(?:[^\x0d\x5b-\x5d\x80-\xff]|\x5c[\x00-\x7f])*\x5d";
    let word = format!("(?:{atom}|{quoted})");
    let sub_domain = format!("(?:{atom}|{literal})");
    let pattern = format!(r"^{word}(?:\x2e{word})*\x40{sub_domain}(?:\x2e{sub_domain})*$");
    Regex::new(&pattern).expect("RFC-822 grammar is a valid regex")
});

/// Whether `s` is a syntactically valid address. Length is not checked.
pub fn validate_email(s: &str) -> bool {
    RFC822.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_addresses() {
        assert!(validate_email("email@example.com"));
        assert!(validate_email("first.last+tag@sub.example.org"));
        assert!(validate_email("a@b"));
    }

    #[test]
    fn quoted_local_part_and_domain_literal() {
        assert!(validate_email(r#""john doe"@example.com"#));
        assert!(validate_email("user@[192.168.0.1]"));
        assert!(validate_email(r#""a\"b"@example.com"#));
    }

    #[test]
    fn malformed_addresses() {
        for s in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@@example.com",
            "user.@example.com",
            ".user@example.com",
            "us er@example.com",
            "user@exa mple.com",
            "user@example..com",
            "user@[1.2.3.4",
            "user(comment)@example.com",
        ] {
            assert!(!validate_email(s), "{s:?} should be rejected");
        }
    }

    #[test]
    fn length_is_not_a_concern() {
        let long = format!("{}@example.com", "a".repeat(500));
        assert!(validate_email(&long));
    }
}
