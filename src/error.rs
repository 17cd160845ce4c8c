//! Error type shared by the client, translator and delivery method.

use thiserror::Error;

/// Errors raised while configuring, translating or delivering mail.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or an invalid reqwest configuration.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mandrill rejected the call and returned its error object.
    #[error("Mandrill API error {name} (code {code}, HTTP {status}): {message}")]
    Api {
        status: u16,
        code: i64,
        name: String,
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    ResponseParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// No API key was available when the client was built.
    #[error("you must provide a Mandrill API key")]
    MissingApiKey,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),
}
