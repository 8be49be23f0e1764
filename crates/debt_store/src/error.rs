use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the remote store client. Always returned as values; the
/// controller branches on them, nothing here panics.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected store response: {0}")]
    Invalid(String),
}
