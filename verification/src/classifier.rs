//! Server failure classification.
//!
//! Maps a failed request to a user-facing [`Notice`]: a message, whether the
//! same form may be submitted again, and where the user should go next.
//! Codes that mean the current form is fixable (challenge text, SMS code)
//! are retryable; codes that mean the session or eligibility is invalid are
//! not. Unknown codes and unparseable responses are internal errors.

use agora_client::ApiFailure;
use agora_types::{ChallengeAnswer, ErrorCode};
use serde::Serialize;

/// The form a failure was reported on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Identify,
    VerifySms,
    Contact,
    TrackerLookup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AlreadyVoted,
    Blacklisted,
    RateLimitedHour,
    RateLimitedDay,
    SmsAlreadySent,
    ChallengeMismatch,
    SmsNotSent,
    SmsAttemptsExhausted,
    InvalidSmsCode,
    TrackerNotFound,
    Internal,
}

/// Where the user is sent when the current form cannot continue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Contact,
    VerifySms,
    Identify,
}

/// A user-visible failure message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: FailureKind,
    pub message: &'static str,
    /// Whether the submit control is re-enabled for the same form.
    pub retryable: bool,
    pub next_step: Option<NextStep>,
}

impl Notice {
    pub const fn new(
        kind: FailureKind,
        retryable: bool,
        next_step: Option<NextStep>,
    ) -> Self {
        Self {
            kind,
            message: message_for(kind),
            retryable,
            next_step,
        }
    }

    /// An internal error directing the user to the contact form.
    pub const fn internal(retryable: bool) -> Self {
        Self::new(FailureKind::Internal, retryable, Some(NextStep::Contact))
    }
}

/// Result of classifying a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub notice: Notice,
    /// The cached challenge must be discarded and a new one fetched.
    pub refresh_challenge: bool,
}

impl From<Notice> for Classification {
    fn from(notice: Notice) -> Self {
        Self {
            notice,
            refresh_challenge: false,
        }
    }
}

pub const fn message_for(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::AlreadyVoted => "You have already voted. A vote cannot be cast twice.",
        FailureKind::Blacklisted => {
            "Your request has been blocked. If you think this is a mistake, please contact us."
        }
        FailureKind::RateLimitedHour => {
            "Too many requests in a row. For security you must wait one hour before trying again, or contact us."
        }
        FailureKind::RateLimitedDay => {
            "Too many requests today. Your requests are blocked for 24 hours; contact us if you need help."
        }
        FailureKind::SmsAlreadySent => {
            "We have just sent you an SMS. Wait until it arrives and verify the code it contains."
        }
        FailureKind::ChallengeMismatch => {
            "The text does not match the image. A new image has been loaded, please try again."
        }
        FailureKind::SmsNotSent => {
            "You have no SMS pending verification. Please identify yourself first."
        }
        FailureKind::SmsAttemptsExhausted => {
            "You have run out of attempts to enter the SMS code. Identify yourself again to receive a new one."
        }
        FailureKind::InvalidSmsCode => "The SMS code you entered is incorrect, please check it.",
        FailureKind::TrackerNotFound => {
            "We could not find the tracker you entered. Please check that it is correct."
        }
        FailureKind::Internal => {
            "An internal error occurred sending the form. Please contact us explaining the steps you followed so we can fix it."
        }
    }
}

fn challenge_mismatch() -> Classification {
    Classification {
        notice: Notice::new(FailureKind::ChallengeMismatch, true, None),
        refresh_challenge: true,
    }
}

/// Classify `failure` as reported on the `phase` form.
pub fn classify(phase: Phase, failure: &ApiFailure) -> Classification {
    use ErrorCode::*;

    let internal: Classification = Notice::internal(phase == Phase::TrackerLookup).into();
    let Some(body) = failure.error_body() else {
        return internal;
    };
    let Some(code) = body.code() else {
        return internal;
    };
    let on_challenge = body.is_for_field(ChallengeAnswer::TEXT_FIELD);

    match phase {
        Phase::Identify => match code {
            AlreadyVoted => Notice::new(FailureKind::AlreadyVoted, false, None).into(),
            Blacklisted => {
                Notice::new(FailureKind::Blacklisted, false, Some(NextStep::Contact)).into()
            }
            WaitHour => {
                Notice::new(FailureKind::RateLimitedHour, false, Some(NextStep::Contact)).into()
            }
            WaitDay => {
                Notice::new(FailureKind::RateLimitedDay, false, Some(NextStep::Contact)).into()
            }
            WaitExpire => {
                Notice::new(FailureKind::SmsAlreadySent, false, Some(NextStep::VerifySms)).into()
            }
            InvalidKeyConstraint if on_challenge => challenge_mismatch(),
            InvalidKeyConstraint | SmsNotSent | NeedNewToken | InvalidToken | NotJson
            | UnknownKeys | Other(_) => internal,
        },
        Phase::VerifySms => match code {
            AlreadyVoted => Notice::new(FailureKind::AlreadyVoted, false, None).into(),
            SmsNotSent => {
                Notice::new(FailureKind::SmsNotSent, false, Some(NextStep::Identify)).into()
            }
            NeedNewToken => {
                Notice::new(FailureKind::SmsAttemptsExhausted, false, Some(NextStep::Identify))
                    .into()
            }
            InvalidToken => Notice::new(FailureKind::InvalidSmsCode, true, None).into(),
            Blacklisted | WaitHour | WaitDay | WaitExpire | InvalidKeyConstraint | NotJson
            | UnknownKeys | Other(_) => internal,
        },
        Phase::Contact => match code {
            InvalidKeyConstraint if on_challenge => challenge_mismatch(),
            AlreadyVoted | Blacklisted | WaitHour | WaitDay | WaitExpire | InvalidKeyConstraint
            | SmsNotSent | NeedNewToken | InvalidToken | NotJson | UnknownKeys | Other(_) => {
                internal
            }
        },
        Phase::TrackerLookup => internal,
    }
}
