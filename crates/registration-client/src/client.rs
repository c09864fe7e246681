//! Registration HTTP client.

use crate::error::{RegistrationError, TransportError};
use crate::types::*;
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Whether the request carries a verification code. A 401 on such a request
/// means the pending verification expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submission {
    Plain,
    WithCode,
}

/// Client for the registration endpoints of the identity server.
///
/// Every operation issues exactly one request. Nothing is retried or cached,
/// and the only input normalization is trimming the email on `register`.
#[derive(Clone)]
pub struct RegistrationClient {
    client: Client,
    base_url: String,
}

impl RegistrationClient {
    /// Create a client with default transport settings.
    ///
    /// The transport keeps a cookie store so the server-side registration
    /// session follows the calls made through this client. No timeout is set.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RegistrationError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_http_client(client, base_url))
    }

    /// Create a client on top of a caller-configured transport.
    pub fn with_http_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start out-of-band email and SMS verification for a new account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_email_and_phone_validation(
        &self,
        request: &RegistrationRequest,
        lang_key: Option<&str>,
    ) -> Result<Ack, RegistrationError> {
        let body = ValidationBody {
            firstname: &request.firstname,
            lastname: &request.lastname,
            email: &request.email,
            phone: &request.phone,
            password: request.password.expose_secret(),
            langkey: lang_key,
        };

        let response = self
            .client
            .post(format!("{}/register/validation", self.base_url))
            .json(&body)
            .send()
            .await?;

        let ack = self.handle_ack(response, Submission::Plain).await?;
        debug!(status = ack.status, "Validation requested");
        Ok(ack)
    }

    /// Submit the full registration bundle, including both verification codes.
    ///
    /// `redirect_params` is appended to the URL verbatim and must already be
    /// encoded by the caller.
    #[instrument(skip(self, credentials), fields(email = %credentials.request.email.trim()))]
    pub async fn register(
        &self,
        credentials: &Credentials,
        lang_key: Option<&str>,
    ) -> Result<Ack, RegistrationError> {
        let request = &credentials.request;
        let body = RegisterBody {
            firstname: &request.firstname,
            lastname: &request.lastname,
            email: request.email.trim(),
            emailcode: &credentials.codes.emailcode,
            phonenumber: &request.phone,
            phonenumbercode: &credentials.codes.phonenumbercode,
            password: request.password.expose_secret(),
            redirectparams: &credentials.redirect_params,
            langkey: lang_key,
        };

        let url = format!("{}/register?{}", self.base_url, credentials.redirect_params);
        debug!(url = %url, "Sending registration request");

        let response = self.client.post(&url).json(&body).send().await?;

        let ack = self.handle_ack(response, Submission::WithCode).await?;
        debug!(redirect = ?ack.redirect_url(), "Registration accepted");
        Ok(ack)
    }

    /// Fetch an organization's logo. Failures are returned as received.
    #[instrument(skip(self))]
    pub async fn fetch_organization_logo(
        &self,
        global_id: &str,
    ) -> Result<OrganizationLogo, TransportError> {
        let url = format!(
            "{}/api/organizations/{}/logo",
            self.base_url,
            encode(global_id)
        );
        self.fetch_raw(&url).await
    }

    /// Fetch an organization's description in `lang_key`, letting the server
    /// fall back to another language when that one is missing.
    #[instrument(skip(self))]
    pub async fn fetch_organization_description(
        &self,
        global_id: &str,
        lang_key: &str,
    ) -> Result<OrganizationDescription, TransportError> {
        let url = format!(
            "{}/api/organizations/{}/description/{}/withfallback",
            self.base_url,
            encode(global_id),
            encode(lang_key)
        );
        self.fetch_raw(&url).await
    }

    /// Read the server's two-factor policy.
    #[instrument(skip(self))]
    pub async fn check_two_factor_mode(&self) -> Result<TwoFactorMode, TransportError> {
        let url = format!("{}/register/check2famode", self.base_url);
        self.fetch_raw(&url).await
    }

    /// Ask the server to send fresh validation codes.
    #[instrument(skip(self, phone))]
    pub async fn resend_validation(
        &self,
        email: &str,
        phone: &str,
        lang_key: Option<&str>,
    ) -> Result<Ack, RegistrationError> {
        let body = ResendBody {
            email,
            phone,
            langkey: lang_key,
        };

        let response = self
            .client
            .post(format!("{}/register/resendvalidation", self.base_url))
            .json(&body)
            .send()
            .await?;

        self.handle_ack(response, Submission::Plain).await
    }

    /// Submit the SMS code. The server alone decides whether it is correct.
    #[instrument(skip(self, code))]
    pub async fn submit_sms_code(&self, code: &str) -> Result<Ack, RegistrationError> {
        let response = self
            .client
            .post(format!("{}/register/smsconfirmation", self.base_url))
            .json(&SmsCodeBody { smscode: code })
            .send()
            .await?;

        let ack = self.handle_ack(response, Submission::WithCode).await?;
        debug!(confirmed = ?ack.confirmed(), "SMS code submitted");
        Ok(ack)
    }

    /// Check whether the SMS validation link was opened on the phone.
    #[instrument(skip(self))]
    pub async fn check_sms_confirmation(&self) -> Result<ConfirmationStatus, RegistrationError> {
        self.check_confirmation("smsconfirmation").await
    }

    /// Check whether the email validation link was opened.
    #[instrument(skip(self))]
    pub async fn check_email_confirmation(
        &self,
    ) -> Result<ConfirmationStatus, RegistrationError> {
        self.check_confirmation("emailconfirmation").await
    }

    async fn check_confirmation(
        &self,
        endpoint: &str,
    ) -> Result<ConfirmationStatus, RegistrationError> {
        let response = self
            .client
            .get(format!("{}/register/{}", self.base_url, endpoint))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.extract_error(response, Submission::Plain).await);
        }

        // An expired validation key is answered with an empty 200; the server
        // means "go ahead and submit" and lets the form handler sort it out.
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ConfirmationStatus { confirmed: true });
        }

        match serde_json::from_slice(&body) {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => Err(RegistrationError::Server {
                status: status.as_u16(),
                message: format!("Malformed confirmation response: {}", e),
            }),
        }
    }

    /// GET a JSON document without classifying failures.
    async fn fetch_raw<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Lookup failed");
            return Err(TransportError::Status { status, body });
        }

        Ok(response.json().await?)
    }

    /// Turn a write-endpoint response into an [`Ack`] or a classified error.
    async fn handle_ack(
        &self,
        response: Response,
        submission: Submission,
    ) -> Result<Ack, RegistrationError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            Ok(Ack {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(self.extract_error(response, submission).await)
        }
    }

    /// Extract error information from a failed response.
    async fn extract_error(&self, response: Response, submission: Submission) -> RegistrationError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        classify(status, message, submission)
    }
}

fn classify(status: StatusCode, message: String, submission: Submission) -> RegistrationError {
    if status == StatusCode::UNAUTHORIZED && submission == Submission::WithCode {
        warn!("Verification expired");
        return RegistrationError::InvalidCode {
            status: status.as_u16(),
            expired: true,
        };
    }

    if !status.is_client_error() {
        warn!(status = %status, "Registration server error");
        return RegistrationError::Server {
            status: status.as_u16(),
            message,
        };
    }

    let code = serde_json::from_str::<ErrorBody>(&message)
        .ok()
        .filter(|b| !b.error.is_empty())
        .map(|b| ErrorCode::from(b.error.as_str()));

    match code {
        Some(ErrorCode::InvalidSmsCode) => RegistrationError::InvalidCode {
            status: status.as_u16(),
            expired: false,
        },
        code => {
            debug!(status = %status, code = ?code, "Registration rejected");
            RegistrationError::Validation {
                status: status.as_u16(),
                code,
                message,
            }
        }
    }
}
