//! Vote tracker lookup.
//!
//! Stateless apart from the single-flight guard: validate the tracker,
//! query the vote store for at most one match, report what was found.

use std::cell::Cell;
use std::rc::Rc;

use agora_client::PortalApi;
use agora_types::TrackerToken;
use agora_validation::{Field, FieldErrors};

use crate::classifier::{classify, FailureKind, Notice, Phase};
use crate::guard::SubmissionGuard;
use crate::view::{ViewKind, ViewRegistry, ViewToken};

const MSG_TRACKER: &str = "A tracker is 64 lowercase hexadecimal characters.";

#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    /// A lookup was already outstanding.
    Busy,
    /// The tracker is malformed; no request was sent.
    Invalid(FieldErrors),
    /// No vote carries this tracker. The user may correct it and retry.
    NotFound(Notice),
    /// The vote's public, anonymised payload, verbatim.
    Found(serde_json::Value),
    Failed(Notice),
    /// The lookup page was replaced while the query was outstanding.
    Stale,
}

pub struct TrackerLookup<A> {
    api: Rc<A>,
    views: Rc<ViewRegistry>,
    view: Cell<ViewToken>,
    guard: SubmissionGuard,
}

impl<A: PortalApi> TrackerLookup<A> {
    /// Show the lookup page.
    pub fn open(api: Rc<A>, views: Rc<ViewRegistry>) -> Self {
        let view = views.navigate(ViewKind::SecurityCenter);
        Self {
            api,
            views,
            view: Cell::new(view),
            guard: SubmissionGuard::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_outstanding()
    }

    pub async fn lookup(&self, raw: &str) -> LookupOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            return LookupOutcome::Busy;
        };
        let view = self.view.get();
        if !self.views.is_current(&view) {
            return LookupOutcome::Stale;
        }

        let Ok(tracker) = TrackerToken::parse(raw) else {
            let mut errors = FieldErrors::new();
            errors.add(Field::Tracker, MSG_TRACKER);
            return LookupOutcome::Invalid(errors);
        };

        tracing::debug!(tracker = %tracker.as_str(), "looking up vote");
        let result = self.api.lookup_vote(&tracker).await;
        if !self.views.is_current(&view) {
            return LookupOutcome::Stale;
        }

        match result {
            Ok(lookup) => match lookup.objects.into_iter().next() {
                Some(record) => {
                    tracing::info!(tracker = %tracker.as_str(), "vote found");
                    LookupOutcome::Found(record.public_data)
                }
                None => {
                    tracing::info!(tracker = %tracker.as_str(), "no vote for tracker");
                    LookupOutcome::NotFound(Notice::new(FailureKind::TrackerNotFound, true, None))
                }
            },
            Err(failure) => {
                tracing::warn!(?failure, "vote lookup failed");
                LookupOutcome::Failed(classify(Phase::TrackerLookup, &failure).notice)
            }
        }
    }
}
