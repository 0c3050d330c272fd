//! Workflow and form state exposed to the rendering layer.

use agora_validation::FieldErrors;
use url::Url;

use crate::classifier::{FailureKind, Notice};

/// Where an identity workflow stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    /// Identify form shown, nothing submitted yet (or a retryable failure).
    Idle,
    /// Registration request outstanding.
    Identifying,
    /// Registered; the voter must enter the SMS code.
    AwaitingSmsVerification,
    /// SMS code accepted; the client must navigate to `url`.
    Redirecting { url: Url },
    /// A terminal failure. Submission stays disabled.
    Blocked { kind: FailureKind },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Identifying => "identifying",
            Self::AwaitingSmsVerification => "awaiting_sms_verification",
            Self::Redirecting { .. } => "redirecting",
            Self::Blocked { .. } => "blocked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirecting { .. } | Self::Blocked { .. })
    }
}

/// Result of one submit action on a workflow form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    /// A submission was already outstanding; nothing happened.
    Busy,
    /// Local validation failed; no request was sent.
    Invalid(FieldErrors),
    /// The server refused the request.
    Failed(Notice),
    /// The form's view was replaced while the request was outstanding; its
    /// result was dropped.
    Stale,
    /// The workflow moved to a new state.
    Advanced(WorkflowState),
}

/// Plain-data snapshot of a form for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    pub state: WorkflowState,
    pub notice: Option<Notice>,
    pub field_errors: FieldErrors,
    pub submit_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!WorkflowState::Idle.is_terminal());
        assert!(!WorkflowState::AwaitingSmsVerification.is_terminal());
        assert!(WorkflowState::Blocked {
            kind: FailureKind::AlreadyVoted
        }
        .is_terminal());
        let url = Url::parse("https://example.org/vote").unwrap();
        assert_eq!(WorkflowState::Redirecting { url }.name(), "redirecting");
    }
}
