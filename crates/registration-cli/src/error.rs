//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Registration error: {0}")]
    Registration(#[from] registration_client::RegistrationError),

    #[error("Lookup failed: {0}")]
    Transport(#[from] registration_client::TransportError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preferences store errors.
#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Preferences file is not a JSON object")]
    NotAnObject,
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
