use thiserror::Error;

/// Errors raised while talking to the model or preparing a request
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("API Key is missing. Please check settings.")]
    MissingCredential,

    #[error("A request is already in progress")]
    RequestInFlight,

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Max retries exceeded")]
    RetriesExhausted,

    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential store error: {0}")]
    Credentials(String),
}
