//! Shared utilities for the identity portal.

pub mod logging;

pub use logging::{init_logging, LogFormat};
