//! Input validators for the identity portal.
//!
//! Every function here is pure: no network, no UI state. Forms run the full
//! suite over their inputs and collect every failure into [`FieldErrors`]
//! instead of stopping at the first one.

pub mod checks;
pub mod email;
pub mod error;
pub mod fields;
pub mod phone;

pub use checks::{
    length_between, parse_postal_code, validate_national_id, validate_sms_code,
    validate_tracker_token,
};
pub use email::validate_email;
pub use error::ValidationError;
pub use fields::{Field, FieldError, FieldErrors};
pub use phone::{normalize_phone, PhonePattern};
