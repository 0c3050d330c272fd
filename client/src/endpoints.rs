//! API paths, relative to the portal base URL.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_register")]
    pub register: String,
    #[serde(default = "default_sms_auth")]
    pub sms_auth: String,
    #[serde(default = "default_challenge")]
    pub challenge: String,
    #[serde(default = "default_contact")]
    pub contact: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_register() -> String {
    "/api/v1/register/".to_string()
}

fn default_sms_auth() -> String {
    "/api/v1/sms_auth/".to_string()
}

fn default_challenge() -> String {
    "/api/v1/captcha/new/".to_string()
}

fn default_contact() -> String {
    "/api/v1/contact/".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: default_register(),
            sms_auth: default_sms_auth(),
            challenge: default_challenge(),
            contact: default_contact(),
        }
    }
}
