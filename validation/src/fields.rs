//! Field-scoped validation failures.

use serde::Serialize;
use std::fmt;

/// A form field a validation failure can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Name,
    Email,
    Phone,
    NationalId,
    PostalCode,
    AboveAge,
    AcceptConditions,
    SmsCode,
    ChallengeText,
    Body,
    Tracker,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::NationalId => "national_id",
            Self::PostalCode => "postal_code",
            Self::AboveAge => "above_age",
            Self::AcceptConditions => "accept_conditions",
            Self::SmsCode => "sms_code",
            Self::ChallengeText => "challenge_text",
            Self::Body => "body",
            Self::Tracker => "tracker",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every field-level failure found in one validation pass, in check order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate `field`. A field keeps only its first message.
    pub fn add(&mut self, field: Field, message: &'static str) {
        if !self.contains(field) {
            self.0.push(FieldError { field, message });
        }
    }

    /// Annotate `field` unless `ok` holds; hands back `ok` for chaining.
    pub fn check(&mut self, ok: bool, field: Field, message: &'static str) -> bool {
        if !ok {
            self.add(field, message);
        }
        ok
    }

    /// Keep the value, or annotate `field` when it is absent.
    pub fn require<T>(&mut self, value: Option<T>, field: Field, message: &'static str) -> Option<T> {
        if value.is_none() {
            self.add(field, message);
        }
        value
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was annotated, otherwise the collected errors.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}
