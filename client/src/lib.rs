//! Client side of the identity portal's network contract.
//!
//! [`PortalApi`] is the seam between the form workflow and the remote
//! services; [`HttpPortal`] implements it over HTTP+JSON with `reqwest`.
//! Tests substitute a scripted implementation instead.

pub mod api;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod wire;

pub use api::PortalApi;
pub use endpoints::Endpoints;
pub use error::{ApiFailure, ClientError};
pub use http::{HttpPortal, Timeouts};
pub use wire::{ContactRequest, RegisterRequest, SmsAuthRequest, SmsGrant, VoteLookup, VoteRecord};
