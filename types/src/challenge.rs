//! Human-verification (CAPTCHA) challenge tokens.

use serde::{Deserialize, Serialize};

/// A challenge issued by the CAPTCHA service.
///
/// The `key` identifies the challenge server-side; `image_url` points at the
/// rendered image the voter must read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeToken {
    pub key: String,
    pub image_url: String,
}

impl ChallengeToken {
    /// Pair this challenge with the text the voter typed.
    pub fn answer(&self, text: &str) -> ChallengeAnswer {
        ChallengeAnswer::new(&self.key, text)
    }
}

/// The challenge fields embedded in every protected submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeAnswer {
    pub challenge_key: String,
    /// Always lower-cased; the issuing service compares case-insensitively.
    pub challenge_text: String,
}

impl ChallengeAnswer {
    /// Field name the server reports when the challenge text is rejected.
    pub const TEXT_FIELD: &'static str = "challenge_text";

    pub fn new(key: &str, text: &str) -> Self {
        Self {
            challenge_key: key.to_string(),
            challenge_text: text.trim().to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_text_is_lowercased_and_trimmed() {
        let token = ChallengeToken {
            key: "k1".into(),
            image_url: "/captcha/k1.png".into(),
        };
        let answer = token.answer("  AbC9 ");
        assert_eq!(answer.challenge_key, "k1");
        assert_eq!(answer.challenge_text, "abc9");
    }
}
