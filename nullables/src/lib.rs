//! Nullable infrastructure for deterministic testing.
//!
//! The portal's external collaborators are reached through the
//! [`agora_client::PortalApi`] trait. This crate provides a test-friendly
//! implementation that:
//! - Returns scripted responses in order
//! - Records every request for assertions
//! - Never touches the network
//!
//! Usage: swap `HttpPortal` for [`NullPortal`] in tests.

pub mod portal;

pub use portal::{rejection, NullPortal, PortalCall};
