//! Voter identity verification workflow.
//!
//! Three steps take a voter from personal data to a signed voting link:
//! 1. **Identify**: personal data is validated locally and registered; the
//!    server sends a one-time code by SMS.
//! 2. **Verify**: the code is submitted with the same phone and national ID.
//! 3. **Redirect**: the signed grant becomes the voting URL.
//!
//! Alongside it, [`TrackerLookup`] verifies a cast vote by its tracker and
//! [`ContactForm`] sends a message to the organisers.
//!
//! Everything runs on one event loop. Forms take `&self` and keep their
//! state in cells; a [`SubmissionGuard`] per form keeps one request in
//! flight, and a [`ViewRegistry`] lets continuations detect that their page
//! was replaced.

pub mod challenge;
pub mod classifier;
pub mod config;
pub mod contact;
pub mod error;
pub mod guard;
pub mod identity;
pub mod session;
pub mod state;
pub mod tracker;
pub mod view;

pub use challenge::ChallengeClient;
pub use classifier::{classify, Classification, FailureKind, NextStep, Notice, Phase};
pub use config::{ElectionConfig, PortalConfig, WorkflowSettings};
pub use contact::{ContactForm, ContactInput, ContactOutcome};
pub use error::WorkflowError;
pub use guard::{FlightPermit, SubmissionGuard};
pub use identity::{redirect_url, validate_identity, IdentityInput, IdentityWorkflow, SmsInput};
pub use session::SessionContext;
pub use state::{FormOutcome, FormView, WorkflowState};
pub use tracker::{LookupOutcome, TrackerLookup};
pub use view::{ViewKind, ViewRegistry, ViewToken};
