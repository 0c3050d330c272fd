use agora_types::ErrorBody;
use thiserror::Error;

/// Errors building a client or its request URLs.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to create HTTP client: {0}")]
    Http(String),
}

/// Why a single portal request did not succeed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiFailure {
    /// The server answered with a structured error body.
    #[error("rejected with HTTP {status}: {}", .body.error_codename.as_deref().unwrap_or("<no code>"))]
    Rejected { status: u16, body: ErrorBody },

    /// The server answered with an error status and a body that is not JSON.
    #[error("HTTP {status} with unparseable body")]
    Malformed { status: u16, body: String },

    /// The request succeeded but the payload did not have the expected shape.
    #[error("unexpected success payload: {0}")]
    UnexpectedPayload(String),

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiFailure {
    /// The structured error body, when the server sent one.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}
