//! JSON request and response bodies.
//!
//! Field names follow what the portal server accepts (`tlf`, `dni`), which
//! differ from the names used in the rest of the workspace.

use agora_types::{ChallengeAnswer, NationalId, PersonalInfo, Phone, SmsCode};
use serde::{Deserialize, Serialize};

/// Body of a registration (Identify) request.
///
/// `above_age` and `accept_conditions` gate submission locally and are not
/// transmitted; the server rejects unknown keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "tlf")]
    pub phone: Phone,
    pub postal_code: u32,
    pub receive_updates: bool,
    #[serde(rename = "dni")]
    pub national_id: NationalId,
    #[serde(flatten)]
    pub challenge: Option<ChallengeAnswer>,
}

impl RegisterRequest {
    pub fn new(info: &PersonalInfo, challenge: Option<ChallengeAnswer>) -> Self {
        Self {
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
            postal_code: info.postal_code,
            receive_updates: info.receive_updates,
            national_id: info.national_id.clone(),
            challenge,
        }
    }
}

/// Body of an SMS code verification request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SmsAuthRequest {
    #[serde(rename = "tlf")]
    pub phone: Phone,
    pub token: SmsCode,
    #[serde(rename = "dni")]
    pub national_id: NationalId,
}

/// Signed grant returned on successful SMS verification.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SmsGrant {
    /// Opaque `<timestamp>#<voter id>` string.
    pub message: String,
    pub sha1_hmac: String,
}

/// Vote-storage query result.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VoteLookup {
    #[serde(default)]
    pub objects: Vec<VoteRecord>,
}

/// A cast, anonymised vote.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VoteRecord {
    pub public_data: serde_json::Value,
}

/// Body of a contact-form message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(rename = "tlf", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    pub body: String,
    #[serde(flatten)]
    pub challenge: ChallengeAnswer,
}
