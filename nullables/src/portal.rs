//! Nullable portal — record requests and answer from a script.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use agora_client::{
    ApiFailure, ContactRequest, PortalApi, RegisterRequest, SmsAuthRequest, SmsGrant, VoteLookup,
    VoteRecord,
};
use agora_types::{ChallengeToken, ErrorBody, TrackerToken};
use async_trait::async_trait;

/// A request received by [`NullPortal`].
#[derive(Clone, Debug, PartialEq)]
pub enum PortalCall {
    Register(RegisterRequest),
    AuthenticateSms(SmsAuthRequest),
    IssueChallenge,
    LookupVote(TrackerToken),
    SendContact(ContactRequest),
}

/// A test portal that records requests instead of sending them.
///
/// Each operation answers from its own queue of scripted results. When a
/// queue is empty the operation succeeds with a neutral default (challenges
/// are numbered `challenge-1`, `challenge-2`, ...; SMS verification fails
/// with a transport error since no grant can be invented).
///
/// Every call yields to the event loop once before answering, so a request
/// is observably outstanding while other tasks run.
#[derive(Default)]
pub struct NullPortal {
    calls: RefCell<Vec<PortalCall>>,
    register: RefCell<VecDeque<Result<(), ApiFailure>>>,
    sms_auth: RefCell<VecDeque<Result<SmsGrant, ApiFailure>>>,
    challenges: RefCell<VecDeque<Result<ChallengeToken, ApiFailure>>>,
    lookups: RefCell<VecDeque<Result<VoteLookup, ApiFailure>>>,
    contact: RefCell<VecDeque<Result<(), ApiFailure>>>,
    issued_challenges: Cell<u32>,
    challenge_delay: Cell<u32>,
}

/// A structured rejection carrying `code`, optionally tied to `field`.
pub fn rejection(code: &str, field: Option<&str>) -> ApiFailure {
    ApiFailure::Rejected {
        status: 400,
        body: ErrorBody {
            message: Some(format!("scripted {code}")),
            field: field.map(str::to_string),
            error_codename: Some(code.to_string()),
        },
    }
}

impl NullPortal {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn script_register(&self, result: Result<(), ApiFailure>) {
        self.register.borrow_mut().push_back(result);
    }

    pub fn script_sms_auth(&self, result: Result<SmsGrant, ApiFailure>) {
        self.sms_auth.borrow_mut().push_back(result);
    }

    pub fn script_challenge(&self, result: Result<ChallengeToken, ApiFailure>) {
        self.challenges.borrow_mut().push_back(result);
    }

    pub fn script_lookup(&self, result: Result<VoteLookup, ApiFailure>) {
        self.lookups.borrow_mut().push_back(result);
    }

    /// Script a lookup that finds one vote with the given public data.
    pub fn script_vote_found(&self, public_data: serde_json::Value) {
        self.script_lookup(Ok(VoteLookup {
            objects: vec![VoteRecord { public_data }],
        }));
    }

    pub fn script_contact(&self, result: Result<(), ApiFailure>) {
        self.contact.borrow_mut().push_back(result);
    }

    /// Keep each challenge fetch outstanding for `yields` extra turns of
    /// the event loop.
    pub fn delay_challenges(&self, yields: u32) {
        self.challenge_delay.set(yields);
    }

    // ── Assertions ──────────────────────────────────────────────────────

    /// All requests received, in order.
    pub fn calls(&self) -> Vec<PortalCall> {
        self.calls.borrow().clone()
    }

    pub fn register_calls(&self) -> Vec<RegisterRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PortalCall::Register(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn sms_auth_calls(&self) -> Vec<SmsAuthRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PortalCall::AuthenticateSms(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn contact_calls(&self) -> Vec<ContactRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                PortalCall::SendContact(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn challenge_calls(&self) -> usize {
        self.count(|c| matches!(c, PortalCall::IssueChallenge))
    }

    pub fn lookup_calls(&self) -> usize {
        self.count(|c| matches!(c, PortalCall::LookupVote(_)))
    }

    fn count(&self, predicate: impl Fn(&PortalCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    /// Clear recorded calls and all scripts.
    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
        self.register.borrow_mut().clear();
        self.sms_auth.borrow_mut().clear();
        self.challenges.borrow_mut().clear();
        self.lookups.borrow_mut().clear();
        self.contact.borrow_mut().clear();
        self.challenge_delay.set(0);
    }

    async fn record(&self, call: PortalCall) {
        self.calls.borrow_mut().push(call);
        tokio::task::yield_now().await;
    }

    fn next_challenge(&self) -> ChallengeToken {
        let n = self.issued_challenges.get() + 1;
        self.issued_challenges.set(n);
        ChallengeToken {
            key: format!("challenge-{n}"),
            image_url: format!("/captcha/challenge-{n}.png"),
        }
    }
}

#[async_trait(?Send)]
impl PortalApi for NullPortal {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure> {
        self.record(PortalCall::Register(request.clone())).await;
        self.register.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    async fn authenticate_sms(&self, request: &SmsAuthRequest) -> Result<SmsGrant, ApiFailure> {
        self.record(PortalCall::AuthenticateSms(request.clone())).await;
        self.sms_auth
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiFailure::Transport("no scripted SMS grant".into())))
    }

    async fn issue_challenge(&self) -> Result<ChallengeToken, ApiFailure> {
        self.record(PortalCall::IssueChallenge).await;
        for _ in 0..self.challenge_delay.get() {
            tokio::task::yield_now().await;
        }
        let scripted = self.challenges.borrow_mut().pop_front();
        scripted.unwrap_or_else(|| Ok(self.next_challenge()))
    }

    async fn lookup_vote(&self, tracker: &TrackerToken) -> Result<VoteLookup, ApiFailure> {
        self.record(PortalCall::LookupVote(tracker.clone())).await;
        self.lookups
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(VoteLookup { objects: Vec::new() }))
    }

    async fn send_contact(&self, request: &ContactRequest) -> Result<(), ApiFailure> {
        self.record(PortalCall::SendContact(request.clone())).await;
        self.contact.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_answers_from_script() {
        let portal = NullPortal::new();
        portal.script_challenge(Err(rejection("boom", None)));

        assert!(portal.issue_challenge().await.is_err());
        let token = portal.issue_challenge().await.unwrap();
        assert_eq!(token.key, "challenge-1");
        assert_eq!(portal.challenge_calls(), 2);
    }

    #[tokio::test]
    async fn delayed_challenge_stays_outstanding() {
        let portal = NullPortal::new();
        portal.delay_challenges(5);
        let answered = Cell::new(false);
        let (token, answered_early) = tokio::join!(
            async {
                let token = portal.issue_challenge().await;
                answered.set(true);
                token
            },
            async {
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                answered.get()
            }
        );
        assert!(!answered_early);
        assert_eq!(portal.challenge_calls(), 1);
        assert_eq!(token.unwrap().key, "challenge-1");
    }

    #[tokio::test]
    async fn unscripted_sms_auth_fails() {
        let portal = NullPortal::new();
        let request = SmsAuthRequest {
            phone: agora_types::Phone::from_normalized("+34666666666").unwrap(),
            token: agora_types::SmsCode::parse("AA4TL219").unwrap(),
            national_id: agora_types::NationalId::parse("12345678Z").unwrap(),
        };
        assert!(matches!(
            portal.authenticate_sms(&request).await,
            Err(ApiFailure::Transport(_))
        ));
        assert_eq!(portal.sms_auth_calls(), vec![request]);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let portal = NullPortal::new();
        portal.script_register(Err(rejection("blacklisted", None)));
        let _ = portal.issue_challenge().await;
        portal.reset();
        assert!(portal.calls().is_empty());
    }
}
