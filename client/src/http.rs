//! `reqwest`-backed implementation of [`PortalApi`].

use std::time::Duration;

use agora_types::{ChallengeToken, ErrorBody, TrackerToken};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{ContactRequest, RegisterRequest, SmsAuthRequest, SmsGrant, VoteLookup};
use crate::{ApiFailure, ClientError, Endpoints, PortalApi};

/// Request and connect timeouts for the HTTP client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            connect: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the portal API and the vote-storage service.
///
/// Wraps `reqwest::Client` with the resolved endpoint URLs and provides a
/// typed method for each remote operation.
#[derive(Clone, Debug)]
pub struct HttpPortal {
    http: reqwest::Client,
    register: Url,
    sms_auth: Url,
    challenge: Url,
    contact: Url,
    vote_lookup: Url,
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|source| ClientError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|source| ClientError::InvalidUrl {
        url: format!("{base}{path}"),
        source,
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiFailure> {
    serde_json::from_str(body).map_err(|e| ApiFailure::UnexpectedPayload(e.to_string()))
}

impl HttpPortal {
    /// Create a client for the portal at `api_base` (e.g. `https://vota.example.org`)
    /// whose votes are listed at `vote_lookup`.
    pub fn new(
        api_base: &str,
        endpoints: &Endpoints,
        vote_lookup: &str,
        timeouts: Timeouts,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let base = parse_url(api_base)?;
        Ok(Self {
            http,
            register: join(&base, &endpoints.register)?,
            sms_auth: join(&base, &endpoints.sms_auth)?,
            challenge: join(&base, &endpoints.challenge)?,
            contact: join(&base, &endpoints.contact)?,
            vote_lookup: parse_url(vote_lookup)?,
        })
    }

    /// The vote-storage query URL for `tracker`, limited to one result.
    pub fn vote_lookup_url(&self, tracker: &TrackerToken) -> Url {
        let mut url = self.vote_lookup.clone();
        url.query_pairs_mut()
            .append_pair("limit", "1")
            .append_pair("offset", "0")
            .append_pair("token", tracker.as_str());
        url
    }

    /// Send a request and return the success body as text.
    ///
    /// Error statuses are decoded into [`ErrorBody`] when possible.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, ApiFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = response.status();
        let url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiFailure::Transport(format!("failed reading body: {e}")))?;
        tracing::debug!(%url, status = status.as_u16(), "portal request completed");

        if status.is_success() {
            return Ok(body);
        }

        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => Err(ApiFailure::Rejected {
                status: status.as_u16(),
                body: parsed,
            }),
            Err(_) => Err(ApiFailure::Malformed {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait(?Send)]
impl PortalApi for HttpPortal {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure> {
        self.execute(self.http.post(self.register.clone()).json(request))
            .await
            .map(|_| ())
    }

    async fn authenticate_sms(&self, request: &SmsAuthRequest) -> Result<SmsGrant, ApiFailure> {
        let body = self
            .execute(self.http.post(self.sms_auth.clone()).json(request))
            .await?;
        decode(&body)
    }

    async fn issue_challenge(&self) -> Result<ChallengeToken, ApiFailure> {
        let body = self.execute(self.http.get(self.challenge.clone())).await?;
        decode(&body)
    }

    async fn lookup_vote(&self, tracker: &TrackerToken) -> Result<VoteLookup, ApiFailure> {
        let body = self
            .execute(self.http.get(self.vote_lookup_url(tracker)))
            .await?;
        decode(&body)
    }

    async fn send_contact(&self, request: &ContactRequest) -> Result<(), ApiFailure> {
        self.execute(self.http.post(self.contact.clone()).json(request))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal() -> HttpPortal {
        HttpPortal::new(
            "https://vota.example.org",
            &Endpoints::default(),
            "https://agora.example.org/api/v1/election/7/all_votes/",
            Timeouts::default(),
        )
        .expect("valid URLs")
    }

    #[test]
    fn endpoints_are_joined_onto_base() {
        let portal = portal();
        assert_eq!(
            portal.register.as_str(),
            "https://vota.example.org/api/v1/register/"
        );
        assert_eq!(
            portal.challenge.as_str(),
            "https://vota.example.org/api/v1/captcha/new/"
        );
    }

    #[test]
    fn vote_lookup_url_carries_limit_offset_and_token() {
        let tracker = TrackerToken::parse(&"ab".repeat(32)).unwrap();
        let url = portal().vote_lookup_url(&tracker);
        assert_eq!(
            url.as_str(),
            format!(
                "https://agora.example.org/api/v1/election/7/all_votes/?limit=1&offset=0&token={}",
                "ab".repeat(32)
            )
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = HttpPortal::new(
            "not a url",
            &Endpoints::default(),
            "https://agora.example.org/",
            Timeouts::default(),
        );
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }

    #[test]
    fn decode_reports_unexpected_payload() {
        let result: Result<SmsGrant, _> = decode("<html>oops</html>");
        assert!(matches!(result, Err(ApiFailure::UnexpectedPayload(_))));
        let grant: SmsGrant = decode(r#"{"message": "1#2", "sha1_hmac": "ff"}"#).unwrap();
        assert_eq!(grant.message, "1#2");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let portal = HttpPortal::new(
            "http://127.0.0.1:1",
            &Endpoints::default(),
            "http://127.0.0.1:1/votes/",
            Timeouts {
                request: Duration::from_secs(2),
                connect: Duration::from_secs(1),
            },
        )
        .unwrap();
        let result = portal.issue_challenge().await;
        assert!(matches!(result, Err(ApiFailure::Transport(_))));
    }
}
