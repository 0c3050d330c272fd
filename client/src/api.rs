//! The portal API seam.

use agora_types::{ChallengeToken, TrackerToken};
use async_trait::async_trait;

use crate::wire::{ContactRequest, RegisterRequest, SmsAuthRequest, SmsGrant, VoteLookup};
use crate::ApiFailure;

/// Remote operations the portal workflow depends on.
///
/// Futures are not required to be `Send`: the workflow runs on a single
/// cooperative event loop.
#[async_trait(?Send)]
pub trait PortalApi {
    /// Register a voter; on success the server sends an SMS code.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure>;

    /// Exchange phone + SMS code for a signed voting grant.
    async fn authenticate_sms(&self, request: &SmsAuthRequest) -> Result<SmsGrant, ApiFailure>;

    /// Fetch a fresh human-verification challenge.
    async fn issue_challenge(&self) -> Result<ChallengeToken, ApiFailure>;

    /// Look up at most one cast vote by tracker.
    async fn lookup_vote(&self, tracker: &TrackerToken) -> Result<VoteLookup, ApiFailure>;

    /// Send a message to the portal operators.
    async fn send_contact(&self, request: &ContactRequest) -> Result<(), ApiFailure>;
}
