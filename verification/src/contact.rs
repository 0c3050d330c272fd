//! Contact form: a challenge-protected message to the organisers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use agora_client::{ApiFailure, ContactRequest, PortalApi};
use agora_types::{ChallengeToken, Phone};
use agora_validation::{length_between, normalize_phone, validate_email, Field, FieldErrors};

use crate::challenge::ChallengeClient;
use crate::classifier::{classify, Notice, Phase};
use crate::config::WorkflowSettings;
use crate::guard::SubmissionGuard;
use crate::view::{ViewKind, ViewRegistry, ViewToken};

const MSG_NAME: &str = "Name must be between 3 and 60 characters.";
const MSG_EMAIL: &str = "Enter a valid email address.";
const MSG_PHONE: &str = "Enter a valid mobile phone number, or leave it empty.";
const MSG_BODY: &str = "The message must be between 10 and 4000 characters.";
const MSG_CHALLENGE: &str = "Type the text shown in the image.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    /// Optional; blank means not given.
    pub phone: String,
    pub body: String,
    pub challenge_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    Busy,
    Invalid(FieldErrors),
    Failed(Notice),
    Stale,
    /// The message was accepted; the mail-sent page is shown.
    Sent,
}

pub struct ContactForm<A> {
    api: Rc<A>,
    settings: Rc<WorkflowSettings>,
    views: Rc<ViewRegistry>,
    view: Cell<ViewToken>,
    challenge: ChallengeClient<A>,
    guard: SubmissionGuard,
    notice: Cell<Option<Notice>>,
    field_errors: RefCell<FieldErrors>,
}

struct ValidContact {
    name: String,
    email: String,
    phone: Option<Phone>,
    body: String,
}

fn validate_contact(
    input: &ContactInput,
    settings: &WorkflowSettings,
) -> Result<ValidContact, FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.check(length_between(&input.name, 3, 60), Field::Name, MSG_NAME);
    errors.check(
        length_between(&input.email, 3, 140) && validate_email(input.email.trim()),
        Field::Email,
        MSG_EMAIL,
    );
    let phone = if input.phone.trim().is_empty() {
        None
    } else {
        errors.require(
            normalize_phone(&input.phone, &settings.phone_pattern),
            Field::Phone,
            MSG_PHONE,
        )
    };
    errors.check(length_between(&input.body, 10, 4000), Field::Body, MSG_BODY);
    errors.check(
        !input.challenge_text.trim().is_empty(),
        Field::ChallengeText,
        MSG_CHALLENGE,
    );
    errors.into_result(|| ValidContact {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone,
        body: input.body.trim().to_string(),
    })
}

impl<A: PortalApi> ContactForm<A> {
    /// Show the contact form.
    pub fn open(api: Rc<A>, settings: Rc<WorkflowSettings>, views: Rc<ViewRegistry>) -> Self {
        let view = views.navigate(ViewKind::Contact);
        Self {
            challenge: ChallengeClient::new(api.clone()),
            api,
            settings,
            views,
            view: Cell::new(view),
            guard: SubmissionGuard::new(),
            notice: Cell::new(None),
            field_errors: RefCell::new(FieldErrors::new()),
        }
    }

    /// Fetch the form's challenge, reusing a cached one.
    pub async fn prepare_challenge(&self) -> Result<ChallengeToken, ApiFailure> {
        self.challenge.acquire(false).await
    }

    pub fn challenge(&self) -> Option<ChallengeToken> {
        self.challenge.cached()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice.get()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.field_errors.borrow().clone()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.guard.is_outstanding() && self.notice.get().map_or(true, |n| n.retryable)
    }

    pub async fn submit(&self, input: &ContactInput) -> ContactOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            return ContactOutcome::Busy;
        };
        let view = self.view.get();
        if !self.views.is_current(&view) {
            tracing::debug!("contact view replaced; not sending");
            return ContactOutcome::Stale;
        }

        let contact = match validate_contact(input, &self.settings) {
            Ok(contact) => contact,
            Err(errors) => {
                *self.field_errors.borrow_mut() = errors.clone();
                return ContactOutcome::Invalid(errors);
            }
        };
        self.field_errors.borrow_mut().clear();
        self.notice.set(None);

        let token = match self.challenge.acquire(false).await {
            Ok(token) => token,
            Err(failure) => {
                tracing::warn!(?failure, "challenge fetch failed");
                if !self.views.is_current(&view) {
                    return ContactOutcome::Stale;
                }
                let notice = Notice::internal(true);
                self.notice.set(Some(notice));
                return ContactOutcome::Failed(notice);
            }
        };
        if !self.views.is_current(&view) {
            return ContactOutcome::Stale;
        }

        let request = ContactRequest {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            body: contact.body,
            challenge: token.answer(&input.challenge_text),
        };
        tracing::info!(challenge = %token.key, "sending contact message");
        let result = self.api.send_contact(&request).await;
        if !self.views.is_current(&view) {
            return ContactOutcome::Stale;
        }

        match result {
            Ok(()) => {
                self.challenge.invalidate();
                self.view.set(self.views.navigate(ViewKind::MailSent));
                ContactOutcome::Sent
            }
            Err(failure) => {
                let classification = classify(Phase::Contact, &failure);
                tracing::warn!(kind = ?classification.notice.kind, ?failure, "contact message rejected");
                if classification.refresh_challenge {
                    if let Err(e) = self.challenge.acquire(true).await {
                        tracing::warn!(failure = ?e, "challenge refresh failed");
                    }
                    if !self.views.is_current(&view) {
                        return ContactOutcome::Stale;
                    }
                }
                self.notice.set(Some(classification.notice));
                ContactOutcome::Failed(classification.notice)
            }
        }
    }
}
