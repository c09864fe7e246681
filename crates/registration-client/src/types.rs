//! Registration request and response types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User data collected before verification.
#[derive(Debug)]
pub struct RegistrationRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

impl RegistrationRequest {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            phone: phone.into(),
            password: SecretString::new(password.into()),
        }
    }
}

/// Verification codes delivered by email and SMS.
#[derive(Debug, Clone, Default)]
pub struct ValidationCodes {
    pub emailcode: String,
    pub phonenumbercode: String,
}

/// Final registration payload.
#[derive(Debug)]
pub struct Credentials {
    pub request: RegistrationRequest,
    pub codes: ValidationCodes,
    /// Pre-encoded query string, appended to the URL as given.
    pub redirect_params: String,
}

/// Two-factor policy declared by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorMode {
    pub no2fa: bool,
}

/// Organization logo payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationLogo {
    #[serde(default)]
    pub logo: String,
}

/// Localized organization description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationDescription {
    #[serde(default)]
    pub langkey: String,
    #[serde(default)]
    pub text: String,
}

/// Whether a pending email or SMS validation link has been opened.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfirmationStatus {
    #[serde(default)]
    pub confirmed: bool,
}

/// Success acknowledgment from a write endpoint.
#[derive(Debug, Clone)]
pub struct Ack {
    pub status: u16,
    /// Decoded JSON body, `Null` when the body was empty or not JSON.
    pub body: serde_json::Value,
}

impl Ack {
    /// Redirect target returned after registration.
    pub fn redirect_url(&self) -> Option<&str> {
        self.body
            .get("redirecturl")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Confirmation flag returned by the SMS code endpoint.
    pub fn confirmed(&self) -> Option<bool> {
        self.body.get("confirmed").and_then(|v| v.as_bool())
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.body
            .get("error")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(ErrorCode::from)
    }
}

/// Machine-readable error strings the server returns in 4xx bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidFirstName,
    InvalidLastName,
    InvalidEmailFormat,
    EmailAlreadyUsed,
    InvalidPhonenumber,
    PhoneAlreadyUsed,
    InvalidPassword,
    InvalidSmsCode,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidFirstName => "invalid_first_name",
            ErrorCode::InvalidLastName => "invalid_last_name",
            ErrorCode::InvalidEmailFormat => "invalid_email_format",
            ErrorCode::EmailAlreadyUsed => "email_already_used",
            ErrorCode::InvalidPhonenumber => "invalid_phonenumber",
            ErrorCode::PhoneAlreadyUsed => "phone_already_used",
            ErrorCode::InvalidPassword => "invalid_password",
            ErrorCode::InvalidSmsCode => "invalid_sms_code",
            ErrorCode::Other(s) => s,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "invalid_first_name" => ErrorCode::InvalidFirstName,
            "invalid_last_name" => ErrorCode::InvalidLastName,
            "invalid_email_format" => ErrorCode::InvalidEmailFormat,
            "email_already_used" => ErrorCode::EmailAlreadyUsed,
            "invalid_phonenumber" => ErrorCode::InvalidPhonenumber,
            "phone_already_used" => ErrorCode::PhoneAlreadyUsed,
            "invalid_password" => ErrorCode::InvalidPassword,
            "invalid_sms_code" => ErrorCode::InvalidSmsCode,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /register/validation`.
#[derive(Serialize)]
pub(crate) struct ValidationBody<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub langkey: Option<&'a str>,
}

/// Body of `POST /register`.
#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub emailcode: &'a str,
    pub phonenumber: &'a str,
    pub phonenumbercode: &'a str,
    pub password: &'a str,
    pub redirectparams: &'a str,
    pub langkey: Option<&'a str>,
}

/// Body of `POST /register/resendvalidation`.
#[derive(Debug, Serialize)]
pub(crate) struct ResendBody<'a> {
    pub email: &'a str,
    pub phone: &'a str,
    pub langkey: Option<&'a str>,
}

/// Body of `POST /register/smsconfirmation`.
#[derive(Debug, Serialize)]
pub(crate) struct SmsCodeBody<'a> {
    pub smscode: &'a str,
}

/// `{"error": "..."}` envelope used by 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
