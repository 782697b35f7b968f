use openai_api_rs::v1::error::APIError;
use thiserror::Error;

/// Substring the transport puts in its error description when the group
/// sender-key session is stale and the message could not be encrypted.
pub const GROUP_CRYPTO_SIGNATURE: &str = "senderMessageKeys";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Failed to access cache: {0}")]
    CacheError(String),

    #[error("Failed to access completion service: {0}")]
    CompletionError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to access storage: {0}")]
    StorageError(String),

    #[error("Failed to reach chat transport: {0}")]
    TransportError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        RelayError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(error: anyhow::Error) -> Self {
        RelayError::GeneralError(error.to_string())
    }
}

impl From<APIError> for RelayError {
    fn from(error: APIError) -> Self {
        RelayError::CompletionError(format!("OpenAI API error: {}", error))
    }
}

/// Failure reported by the chat transport's send primitive.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Whether the failure is the stale group-encryption session case that
    /// warrants a single unquoted resend.
    #[must_use]
    pub fn is_group_crypto(&self) -> bool {
        self.message.contains(GROUP_CRYPTO_SIGNATURE)
    }
}

/// Fatal outcome of a dispatch call.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("ERR_SENDING_WAPP_MSG: {0}")]
    Transport(String),

    #[error("ERR_SENDING_WAPP_MSG_GROUP_CRYPTO: {0}")]
    GroupCrypto(String),

    #[error("Attachment not found: {0}")]
    NotFound(String),

    #[error("No transport session available for account {0}")]
    SessionUnavailable(u64),
}

impl SendError {
    /// Stable short tag for callers that map failures onto API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            SendError::Transport(_) => "transport",
            SendError::GroupCrypto(_) => "group-crypto",
            SendError::NotFound(_) => "not-found",
            SendError::SessionUnavailable(_) => "session-unavailable",
        }
    }
}
