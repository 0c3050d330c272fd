use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] agora_validation::ValidationError),

    #[error("client error: {0}")]
    Client(#[from] agora_client::ClientError),

    #[error("cannot {operation} while {state}")]
    UnexpectedState {
        operation: &'static str,
        state: &'static str,
    },
}
