//! Phone number normalisation.
//!
//! The accepted numbering plan is not hard-coded: deployments deliver a
//! regular expression with the portal configuration and every normalised
//! number must match it.

use agora_types::Phone;
use regex::Regex;

use crate::ValidationError;

/// Country prefix injected when the user omits one.
pub const COUNTRY_PREFIX: &str = "+34";
/// International trunk form of the country prefix.
const TRUNK_PREFIX: &str = "0034";
const BARE_PREFIX: &str = "34";

/// The deployment-provided phone-number pattern.
#[derive(Clone, Debug)]
pub struct PhonePattern(Regex);

impl PhonePattern {
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| ValidationError::InvalidPhonePattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search; anchors belong in the pattern itself.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.is_match(candidate)
    }
}

/// Normalise a user-typed phone number to `+34`-prefixed form.
///
/// Returns `None` for blank input, or when the normalised string does not
/// satisfy `pattern`. Only the pattern decides which characters may follow
/// the prefix. Normalising an already-normalised number is a no-op.
pub fn normalize_phone(raw: &str, pattern: &PhonePattern) -> Option<Phone> {
    let compact: String = raw.trim().chars().filter(|&c| c != ' ').collect();
    if compact.is_empty() {
        return None;
    }

    let rewritten = if let Some(rest) = compact.strip_prefix(TRUNK_PREFIX) {
        format!("{COUNTRY_PREFIX}{rest}")
    } else if let Some(rest) = compact.strip_prefix(BARE_PREFIX) {
        format!("{COUNTRY_PREFIX}{rest}")
    } else if compact.starts_with(COUNTRY_PREFIX) {
        compact
    } else {
        format!("{COUNTRY_PREFIX}{compact}")
    };

    if !pattern.matches(&rewritten) {
        return None;
    }
    Phone::from_normalized(rewritten).ok()
}
