//! Human-verification challenge client.
//!
//! Holds at most one [`ChallengeToken`]. The same token is reused across
//! re-renders of a form (e.g. after a validation error) and is only replaced
//! when a refresh is forced, which happens when the server rejects the
//! challenge text.

use std::cell::RefCell;
use std::rc::Rc;

use agora_client::{ApiFailure, PortalApi};
use agora_types::{ChallengeAnswer, ChallengeToken};

pub struct ChallengeClient<A> {
    api: Rc<A>,
    cached: RefCell<Option<ChallengeToken>>,
}

impl<A: PortalApi> ChallengeClient<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self {
            api,
            cached: RefCell::new(None),
        }
    }

    /// Return the cached token, or fetch a new one.
    ///
    /// With `force_refresh` the cached token is discarded before fetching, so
    /// a failed fetch leaves the cache empty rather than stale.
    pub async fn acquire(&self, force_refresh: bool) -> Result<ChallengeToken, ApiFailure> {
        if force_refresh {
            self.invalidate();
        } else if let Some(token) = self.cached() {
            return Ok(token);
        }

        let token = self.api.issue_challenge().await?;
        tracing::debug!(key = %token.key, "challenge issued");
        *self.cached.borrow_mut() = Some(token.clone());
        Ok(token)
    }

    pub fn cached(&self) -> Option<ChallengeToken> {
        self.cached.borrow().clone()
    }

    pub fn invalidate(&self) {
        self.cached.borrow_mut().take();
    }

    /// Pair the cached token with the user's text, if a token is held.
    pub fn answer(&self, text: &str) -> Option<ChallengeAnswer> {
        self.cached.borrow().as_ref().map(|token| token.answer(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nullables::{rejection, NullPortal};

    #[tokio::test]
    async fn cached_token_is_reused_without_network() {
        let portal = Rc::new(NullPortal::new());
        let client = ChallengeClient::new(portal.clone());

        let first = client.acquire(false).await.unwrap();
        let second = client.acquire(false).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(portal.challenge_calls(), 1);
    }

    #[tokio::test]
    async fn forced_refresh_replaces_token() {
        let portal = Rc::new(NullPortal::new());
        let client = ChallengeClient::new(portal.clone());

        let first = client.acquire(false).await.unwrap();
        let refreshed = client.acquire(true).await.unwrap();
        assert_ne!(first.key, refreshed.key);
        assert_eq!(client.cached(), Some(refreshed));
        assert_eq!(portal.challenge_calls(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_cache_empty() {
        let portal = Rc::new(NullPortal::new());
        let client = ChallengeClient::new(portal.clone());
        client.acquire(false).await.unwrap();

        portal.script_challenge(Err(rejection("unavailable", None)));
        assert!(client.acquire(true).await.is_err());
        assert!(client.cached().is_none());
        assert!(client.answer("abc").is_none());
    }

    #[tokio::test]
    async fn answer_uses_cached_key_and_lowercases() {
        let portal = Rc::new(NullPortal::new());
        let client = ChallengeClient::new(portal);
        let token = client.acquire(false).await.unwrap();

        let answer = client.answer("QwErTy").unwrap();
        assert_eq!(answer.challenge_key, token.key);
        assert_eq!(answer.challenge_text, "qwerty");
    }
}
