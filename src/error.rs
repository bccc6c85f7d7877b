//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum EmtError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// HTTP-layer errors, produced by the response classification gate.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 response from the portal.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Structured rejection (envelope `Status == -1`).
    #[error("API error: {message}")]
    Api {
        message: String,
        status: u16,
        body: String,
    },

    /// Envelope `Status == -2`. Recoverable by exactly one re-login.
    #[error("Session expired")]
    SessionExpired,

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Authentication errors. Messages carry the username, never the secret.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login failed for user '{username}': {reason}")]
    LoginFailed { username: String, reason: String },

    #[error("Login failed for user '{username}' after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        username: String,
        attempts: u32,
        last_error: String,
    },
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Cannot persist a session with an empty username")]
    EmptyIdentity,
}
