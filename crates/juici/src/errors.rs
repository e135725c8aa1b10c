use thiserror::Error;

/// Failures of a single client turn
///
/// None of these abort a conversation: the transport folds them into one assistant
/// message and hands the error back to the caller for logging.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Stream interrupted: {0}")]
    Stream(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Reply was superseded by a newer one")]
    Superseded,
}

/// Failures raised by a response service
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Missing required parameters. Please provide agent_name and message.")]
    MissingParameters,

    #[error("Missing image. Please attach an image file to analyze.")]
    MissingImage,

    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the caller sent something wrong, as opposed to the service failing
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::MissingParameters | ServiceError::MissingImage
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
