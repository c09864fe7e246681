//! Registration client errors.

use crate::types::ErrorCode;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the classified registration operations.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Validation failed: {status} - {message}")]
    Validation {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    /// `expired` is set when the pending verification itself is gone (401),
    /// as opposed to a wrong code (422).
    #[error("Invalid or expired verification code")]
    InvalidCode { status: u16, expired: bool },

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
}

impl RegistrationError {
    /// Server-supplied error code, if the response carried one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RegistrationError::Validation { code, .. } => code.clone(),
            RegistrationError::InvalidCode { .. } => Some(ErrorCode::InvalidSmsCode),
            _ => None,
        }
    }
}

/// Raw transport failure, returned unclassified by the lookup operations.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status}")]
    Status { status: StatusCode, body: String },
}

impl TransportError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Request(e) => e.status(),
            TransportError::Status { status, .. } => Some(*status),
        }
    }
}
