//! Portal configuration with TOML file support.

use std::time::Duration;

use agora_client::{Endpoints, HttpPortal, Timeouts};
use agora_validation::PhonePattern;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::WorkflowError;

/// Host part of an election page URL: `https://host/<org>/<slug>/election/...`.
static ELECTION_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[^/]+)/[^/]+/[^/]+/election/").expect("static pattern compiles")
});

/// Configuration for the identity portal client.
///
/// Can be loaded from a TOML file via [`PortalConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL the API paths are resolved against.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Regular expression every normalised phone number must match.
    #[serde(default = "default_phone_pattern")]
    pub phone_pattern: String,

    /// Whether the Identify form carries a human-verification challenge.
    #[serde(default)]
    pub register_requires_challenge: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter (e.g. "info", "debug", "agora_verification=trace").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub election: ElectionConfig,
}

/// The election voters are redirected to once verified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(default = "default_election_id")]
    pub id: u64,

    /// Public election page; the signed redirect goes to `<url>/vote`.
    #[serde(default = "default_election_url")]
    pub url: String,
}

/// What the workflow needs from the configuration, parsed and checked.
#[derive(Clone, Debug)]
pub struct WorkflowSettings {
    pub phone_pattern: PhonePattern,
    pub election_url: Url,
    pub register_requires_challenge: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_phone_pattern() -> String {
    r"^\+34\d{9}$".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_election_id() -> u64 {
    1
}

fn default_election_url() -> String {
    "http://127.0.0.1:8000/agora/demo/election/demo".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PortalConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, WorkflowError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WorkflowError> {
        toml::from_str(s).map_err(|e| WorkflowError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("PortalConfig is always serializable to TOML")
    }

    /// Compile the phone pattern and parse the election URL.
    pub fn settings(&self) -> Result<WorkflowSettings, WorkflowError> {
        let phone_pattern = PhonePattern::new(&self.phone_pattern)?;
        let election_url = Url::parse(&self.election.url).map_err(|e| {
            WorkflowError::Config(format!("election url {:?}: {e}", self.election.url))
        })?;
        if election_url.cannot_be_a_base() {
            return Err(WorkflowError::Config(format!(
                "election url {:?} cannot carry a path",
                self.election.url
            )));
        }
        Ok(WorkflowSettings {
            phone_pattern,
            election_url,
            register_requires_challenge: self.register_requires_challenge,
        })
    }

    /// Vote-storage listing for the configured election, on the election's host.
    pub fn vote_lookup_url(&self) -> Result<String, WorkflowError> {
        let host = ELECTION_HOST
            .captures(&self.election.url)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                WorkflowError::Config(format!(
                    "election url {:?} is not of the form <host>/<org>/<slug>/election/...",
                    self.election.url
                ))
            })?;
        Ok(format!(
            "{}/api/v1/election/{}/all_votes/",
            host.as_str(),
            self.election.id
        ))
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            request: Duration::from_secs(self.request_timeout_secs),
            connect: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    /// Build the HTTP client for the configured portal.
    pub fn http_portal(&self) -> Result<HttpPortal, WorkflowError> {
        let portal = HttpPortal::new(
            &self.api_base_url,
            &self.endpoints,
            &self.vote_lookup_url()?,
            self.timeouts(),
        )?;
        Ok(portal)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            phone_pattern: default_phone_pattern(),
            register_requires_challenge: false,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            endpoints: Endpoints::default(),
            election: ElectionConfig::default(),
        }
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            id: default_election_id(),
            url: default_election_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = PortalConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = PortalConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.api_base_url, config.api_base_url);
        assert_eq!(parsed.phone_pattern, config.phone_pattern);
        assert_eq!(parsed.endpoints, config.endpoints);
        assert_eq!(parsed.election, config.election);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = PortalConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.endpoints.register, "/api/v1/register/");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.register_requires_challenge);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            phone_pattern = '^\+33\d{9}$'
            register_requires_challenge = true

            [endpoints]
            register = "/v2/register/"

            [election]
            id = 42
            url = "https://vota.example.org/agora/primarias/election/p2024"
        "#;
        let config = PortalConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.phone_pattern, r"^\+33\d{9}$");
        assert!(config.register_requires_challenge);
        assert_eq!(config.endpoints.register, "/v2/register/");
        assert_eq!(config.endpoints.sms_auth, "/api/v1/sms_auth/"); // default
        assert_eq!(config.election.id, 42);
    }

    #[test]
    fn vote_lookup_is_derived_from_election_host() {
        let mut config = PortalConfig::default();
        config.election.id = 7;
        config.election.url = "https://vota.example.org/agora/primarias/election/p2024".into();
        assert_eq!(
            config.vote_lookup_url().unwrap(),
            "https://vota.example.org/api/v1/election/7/all_votes/"
        );
    }

    #[test]
    fn unrecognised_election_url_is_a_config_error() {
        let mut config = PortalConfig::default();
        config.election.url = "https://vota.example.org/vote".into();
        assert!(matches!(
            config.vote_lookup_url(),
            Err(WorkflowError::Config(_))
        ));
    }

    #[test]
    fn invalid_phone_pattern_is_rejected() {
        let config = PortalConfig {
            phone_pattern: "(+34".into(),
            ..PortalConfig::default()
        };
        assert!(matches!(
            config.settings(),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn default_config_builds_an_http_portal() {
        assert!(PortalConfig::default().http_portal().is_ok());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://vota.example.org\"").unwrap();
        let path = file.path().to_str().unwrap();
        let config = PortalConfig::from_toml_file(path).expect("should load");
        assert_eq!(config.api_base_url, "https://vota.example.org");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = PortalConfig::from_toml_file("/nonexistent/agora.toml");
        assert!(matches!(result, Err(WorkflowError::Config(_))));
    }
}
