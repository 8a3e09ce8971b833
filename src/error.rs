use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(goodash::config),
        help("check config.toml (or the file named by GOODASH_CONFIG)")
    )]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(goodash::auth),
        help("run the `authorize` binary to create a fresh token")
    )]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    #[diagnostic(code(goodash::http))]
    Http(#[from] reqwest::Error),

    #[error("{service} API error: HTTP {status} - {body}")]
    #[diagnostic(code(goodash::api))]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed payload: {0}")]
    #[diagnostic(code(goodash::payload))]
    Payload(String),

    #[error("Invalid timestamp '{input}': {source}")]
    #[diagnostic(code(goodash::time_parse))]
    TimeParse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(code(goodash::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(goodash::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(goodash::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create payload errors
pub fn payload_error(message: &str) -> Error {
    Error::Payload(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

/// Turn a non-success response into an `Error::Api`, passing successful ones through
pub async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> SyncResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(Error::Api {
        service,
        status: status.as_u16(),
        body,
    })
}
