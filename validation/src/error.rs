use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid phone pattern {pattern:?}: {source}")]
    InvalidPhonePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
