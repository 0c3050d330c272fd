//! Identity submission workflow: Identify → VerifySMS → Redirect.
//!
//! One [`IdentityWorkflow`] drives both forms of a voter's verification. It
//! owns the session context that carries the validated phone and national
//! ID from the first step to the second, a single-flight guard per form, and
//! the challenge cache of the Identify form.
//!
//! Every submit action returns a [`FormOutcome`]. Server and validation
//! failures are values; `Err` is reserved for misuse of the state machine
//! (e.g. verifying an SMS code before registering).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use agora_client::{ApiFailure, PortalApi, RegisterRequest, SmsAuthRequest, SmsGrant};
use agora_types::{ChallengeAnswer, ChallengeToken, NationalId, PersonalInfo, SmsCode};
use agora_validation::{
    length_between, normalize_phone, parse_postal_code, validate_email, Field, FieldErrors,
};
use url::Url;

use crate::challenge::ChallengeClient;
use crate::classifier::{classify, FailureKind, Notice, Phase};
use crate::config::WorkflowSettings;
use crate::guard::SubmissionGuard;
use crate::session::SessionContext;
use crate::state::{FormOutcome, FormView, WorkflowState};
use crate::view::{ViewKind, ViewRegistry, ViewToken};
use crate::WorkflowError;

const MSG_FIRST_NAME: &str = "First name must be between 3 and 60 characters.";
const MSG_LAST_NAME: &str = "Last name must be between 3 and 100 characters.";
const MSG_EMAIL: &str = "Enter a valid email address.";
const MSG_PHONE: &str = "Enter a valid mobile phone number.";
const MSG_NATIONAL_ID: &str = "Enter a valid national ID: 8 digits and the control letter.";
const MSG_POSTAL_CODE: &str = "Enter a valid postal code.";
const MSG_ABOVE_AGE: &str = "You must be of voting age to take part.";
const MSG_CONDITIONS: &str = "You must accept the conditions to take part.";
const MSG_CHALLENGE: &str = "Type the text shown in the image.";
const MSG_SMS_CODE: &str = "The SMS code has 8 characters.";

/// Raw Identify form input, as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id: String,
    pub postal_code: String,
    pub above_age: bool,
    pub accept_conditions: bool,
    pub receive_updates: bool,
    /// Only read when the Identify form carries a challenge.
    pub challenge_text: Option<String>,
}

/// Raw SMS verification form input.
///
/// `phone` and `national_id` are only read when the session does not
/// already hold them (e.g. the voter opened the verification page directly).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmsInput {
    pub sms_code: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
}

/// Validate every Identify field, reporting all failures at once.
pub fn validate_identity(
    input: &IdentityInput,
    settings: &WorkflowSettings,
) -> Result<PersonalInfo, FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.check(
        length_between(&input.first_name, 3, 60),
        Field::FirstName,
        MSG_FIRST_NAME,
    );
    errors.check(
        length_between(&input.last_name, 3, 100),
        Field::LastName,
        MSG_LAST_NAME,
    );
    errors.check(
        length_between(&input.email, 3, 140) && validate_email(input.email.trim()),
        Field::Email,
        MSG_EMAIL,
    );
    let phone = errors.require(
        normalize_phone(&input.phone, &settings.phone_pattern),
        Field::Phone,
        MSG_PHONE,
    );
    let national_id = errors.require(
        NationalId::parse(&input.national_id).ok(),
        Field::NationalId,
        MSG_NATIONAL_ID,
    );
    let postal_code = errors.require(
        parse_postal_code(&input.postal_code),
        Field::PostalCode,
        MSG_POSTAL_CODE,
    );
    errors.check(input.above_age, Field::AboveAge, MSG_ABOVE_AGE);
    errors.check(
        input.accept_conditions,
        Field::AcceptConditions,
        MSG_CONDITIONS,
    );
    if settings.register_requires_challenge {
        let answered = input
            .challenge_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        errors.check(answered, Field::ChallengeText, MSG_CHALLENGE);
    }

    let (Some(phone), Some(national_id), Some(postal_code)) = (phone, national_id, postal_code)
    else {
        return Err(errors);
    };
    errors.into_result(|| PersonalInfo {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: input.email.trim().to_string(),
        national_id,
        phone,
        postal_code,
        above_age: input.above_age,
        accept_conditions: input.accept_conditions,
        receive_updates: input.receive_updates,
    })
}

/// `<election>/vote?message=..&sha1_hmac=..`.
///
/// Both values use `application/x-www-form-urlencoded` encoding: a space
/// becomes `+`, and `#`, `&` and `+` are percent-escaped. Any form-aware
/// server decodes them to the exact signed values.
pub fn redirect_url(election_url: &Url, grant: &SmsGrant) -> Url {
    let mut url = election_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("vote");
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("message", &grant.message)
        .append_pair("sha1_hmac", &grant.sha1_hmac);
    url
}

/// The voter's verification workflow.
pub struct IdentityWorkflow<A> {
    api: Rc<A>,
    settings: Rc<WorkflowSettings>,
    views: Rc<ViewRegistry>,
    view: Cell<ViewToken>,
    session: SessionContext,
    challenge: ChallengeClient<A>,
    identify_guard: SubmissionGuard,
    verify_guard: SubmissionGuard,
    state: RefCell<WorkflowState>,
    notice: Cell<Option<Notice>>,
    field_errors: RefCell<FieldErrors>,
}

impl<A: PortalApi> IdentityWorkflow<A> {
    /// Start a workflow on a freshly shown Identify form.
    pub fn start(api: Rc<A>, settings: Rc<WorkflowSettings>, views: Rc<ViewRegistry>) -> Self {
        let view = views.navigate(ViewKind::Identify);
        Self {
            challenge: ChallengeClient::new(api.clone()),
            api,
            settings,
            views,
            view: Cell::new(view),
            session: SessionContext::new(),
            identify_guard: SubmissionGuard::new(),
            verify_guard: SubmissionGuard::new(),
            state: RefCell::new(WorkflowState::Idle),
            notice: Cell::new(None),
            field_errors: RefCell::new(FieldErrors::new()),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The challenge currently shown on the Identify form, if any.
    pub fn challenge(&self) -> Option<ChallengeToken> {
        self.challenge.cached()
    }

    /// Fetch the Identify form's challenge, reusing a cached one.
    pub async fn prepare_challenge(&self) -> Result<ChallengeToken, ApiFailure> {
        self.challenge.acquire(false).await
    }

    /// Snapshot of the form currently shown, for rendering.
    pub fn view(&self) -> FormView {
        let state = self.state();
        let guard = match state {
            WorkflowState::AwaitingSmsVerification => &self.verify_guard,
            _ => &self.identify_guard,
        };
        let notice = self.notice.get();
        FormView {
            submit_enabled: !guard.is_outstanding()
                && !state.is_terminal()
                && notice.map_or(true, |n| n.retryable),
            state,
            notice,
            field_errors: self.field_errors.borrow().clone(),
        }
    }

    /// Validate and submit the Identify form.
    pub async fn submit_identity(&self, input: &IdentityInput) -> Result<FormOutcome, WorkflowError> {
        let Some(_permit) = self.identify_guard.try_acquire() else {
            tracing::debug!("identify submission already outstanding");
            return Ok(FormOutcome::Busy);
        };
        self.expect_state("submit identity", |s| {
            matches!(s, WorkflowState::Idle | WorkflowState::Identifying)
        })?;
        let view = self.view.get();
        if !self.views.is_current(&view) {
            tracing::debug!("identify view replaced; not submitting");
            return Ok(FormOutcome::Stale);
        }

        let info = match validate_identity(input, &self.settings) {
            Ok(info) => info,
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields(), "identify input rejected");
                *self.field_errors.borrow_mut() = errors.clone();
                return Ok(FormOutcome::Invalid(errors));
            }
        };
        self.session
            .remember(info.phone.clone(), info.national_id.clone());

        let challenge = match self.challenge_answer(input).await {
            Ok(answer) => answer,
            Err(failure) => {
                tracing::warn!(?failure, "challenge fetch failed");
                if !self.views.is_current(&view) {
                    return Ok(FormOutcome::Stale);
                }
                let notice = Notice::internal(true);
                self.notice.set(Some(notice));
                return Ok(FormOutcome::Failed(notice));
            }
        };
        if !self.views.is_current(&view) {
            return Ok(FormOutcome::Stale);
        }

        self.set_state(WorkflowState::Identifying);
        self.notice.set(None);
        self.field_errors.borrow_mut().clear();
        tracing::info!(
            phone = %info.phone.masked(),
            national_id = %info.national_id.masked(),
            "submitting identity"
        );

        let result = self
            .api
            .register(&RegisterRequest::new(&info, challenge))
            .await;
        if !self.views.is_current(&view) {
            tracing::debug!("identify view replaced; dropping registration result");
            return Ok(FormOutcome::Stale);
        }

        match result {
            Ok(()) => {
                tracing::info!(phone = %info.phone.masked(), "registered; awaiting SMS code");
                self.enter(ViewKind::VerifySms, WorkflowState::AwaitingSmsVerification);
                Ok(FormOutcome::Advanced(self.state()))
            }
            Err(failure) => Ok(self.fail(Phase::Identify, view, &failure).await),
        }
    }

    /// Validate and submit the SMS verification form.
    pub async fn submit_sms(&self, input: &SmsInput) -> Result<FormOutcome, WorkflowError> {
        let Some(_permit) = self.verify_guard.try_acquire() else {
            tracing::debug!("SMS verification already outstanding");
            return Ok(FormOutcome::Busy);
        };
        self.expect_state("verify SMS code", |s| {
            matches!(s, WorkflowState::AwaitingSmsVerification)
        })?;
        let view = self.view.get();
        if !self.views.is_current(&view) {
            tracing::debug!("verification view replaced; not submitting");
            return Ok(FormOutcome::Stale);
        }

        let mut errors = FieldErrors::new();
        let phone = self.session.phone().or_else(|| {
            input
                .phone
                .as_deref()
                .and_then(|raw| normalize_phone(raw, &self.settings.phone_pattern))
        });
        let phone = errors.require(phone, Field::Phone, MSG_PHONE);
        let national_id = self.session.national_id().or_else(|| {
            input
                .national_id
                .as_deref()
                .and_then(|raw| NationalId::parse(raw).ok())
        });
        let national_id = errors.require(national_id, Field::NationalId, MSG_NATIONAL_ID);
        let token = errors.require(
            SmsCode::parse(&input.sms_code).ok(),
            Field::SmsCode,
            MSG_SMS_CODE,
        );
        let (Some(phone), Some(national_id), Some(token)) = (phone, national_id, token) else {
            tracing::debug!(fields = ?errors.fields(), "SMS input rejected");
            *self.field_errors.borrow_mut() = errors.clone();
            return Ok(FormOutcome::Invalid(errors));
        };

        self.notice.set(None);
        self.field_errors.borrow_mut().clear();
        tracing::info!(phone = %phone.masked(), "verifying SMS code");

        let request = SmsAuthRequest {
            phone,
            token,
            national_id,
        };
        let result = self.api.authenticate_sms(&request).await;
        if !self.views.is_current(&view) {
            tracing::debug!("verification view replaced; dropping SMS result");
            return Ok(FormOutcome::Stale);
        }

        match result {
            Ok(grant) => {
                let url = redirect_url(&self.settings.election_url, &grant);
                tracing::info!(phone = %request.phone.masked(), "SMS code accepted; redirecting");
                self.session.clear();
                self.set_state(WorkflowState::Redirecting { url });
                Ok(FormOutcome::Advanced(self.state()))
            }
            Err(failure) => Ok(self.fail(Phase::VerifySms, view, &failure).await),
        }
    }

    /// Go to the SMS verification form without registering again, e.g.
    /// when the server reports a code was already sent.
    pub fn enter_sms_verification(&self) -> Result<(), WorkflowError> {
        self.expect_state("enter SMS verification", |s| match s {
            WorkflowState::Idle | WorkflowState::Identifying => true,
            WorkflowState::Blocked { kind } => *kind == FailureKind::SmsAlreadySent,
            _ => false,
        })?;
        self.notice.set(None);
        self.field_errors.borrow_mut().clear();
        self.enter(ViewKind::VerifySms, WorkflowState::AwaitingSmsVerification);
        Ok(())
    }

    /// Back to an empty Identify form. The session is cleared.
    pub fn restart(&self) {
        self.session.clear();
        self.notice.set(None);
        self.field_errors.borrow_mut().clear();
        self.enter(ViewKind::Identify, WorkflowState::Idle);
    }

    /// Leave the workflow. The session is cleared and pending results dropped.
    pub fn abandon(&self) {
        self.session.clear();
        self.notice.set(None);
        self.field_errors.borrow_mut().clear();
        self.challenge.invalidate();
        self.enter(ViewKind::Home, WorkflowState::Idle);
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn challenge_answer(
        &self,
        input: &IdentityInput,
    ) -> Result<Option<ChallengeAnswer>, ApiFailure> {
        if !self.settings.register_requires_challenge {
            return Ok(None);
        }
        let token = self.challenge.acquire(false).await?;
        let text = input.challenge_text.as_deref().unwrap_or_default();
        Ok(Some(token.answer(text)))
    }

    /// Apply a classified failure to the form `view` was taken from. If
    /// that form is replaced while the challenge refreshes, nothing is applied.
    async fn fail(&self, phase: Phase, view: ViewToken, failure: &ApiFailure) -> FormOutcome {
        let classification = classify(phase, failure);
        let notice = classification.notice;
        tracing::warn!(?phase, kind = ?notice.kind, retryable = notice.retryable, ?failure, "submission failed");

        if classification.refresh_challenge {
            if let Err(e) = self.challenge.acquire(true).await {
                tracing::warn!(failure = ?e, "challenge refresh failed");
            }
            if !self.views.is_current(&view) {
                tracing::debug!(?phase, "view replaced during challenge refresh; dropping failure");
                return FormOutcome::Stale;
            }
        }

        self.notice.set(Some(notice));
        if !notice.retryable {
            self.set_state(WorkflowState::Blocked { kind: notice.kind });
        }
        FormOutcome::Failed(notice)
    }

    fn enter(&self, kind: ViewKind, state: WorkflowState) {
        self.view.set(self.views.navigate(kind));
        self.set_state(state);
    }

    fn set_state(&self, next: WorkflowState) {
        let prev = self.state.replace(next);
        tracing::debug!(from = prev.name(), to = self.state.borrow().name(), "workflow state");
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: impl Fn(&WorkflowState) -> bool,
    ) -> Result<(), WorkflowError> {
        let state = self.state.borrow();
        if allowed(&*state) {
            Ok(())
        } else {
            Err(WorkflowError::UnexpectedState {
                operation,
                state: state.name(),
            })
        }
    }
}
