//! Client for the self-service registration API.
//!
//! Wraps the registration endpoints of the identity server: requesting
//! email/SMS validation codes, submitting the registration form and the few
//! lookups the registration page needs (organization branding, two-factor
//! policy).

mod client;
mod error;
mod types;

pub use client::RegistrationClient;
pub use error::{RegistrationError, TransportError};
pub use types::{
    Ack, ConfirmationStatus, Credentials, ErrorCode, OrganizationDescription, OrganizationLogo,
    RegistrationRequest, TwoFactorMode, ValidationCodes,
};

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> RegistrationClient {
        RegistrationClient::new(mock_server.uri()).unwrap()
    }

    fn test_request(email: &str) -> RegistrationRequest {
        RegistrationRequest::new("Ada", "Lovelace", email, "+32471000000", "s3cret pass")
    }

    #[tokio::test]
    async fn test_request_validation_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/validation"))
            .and(body_json(serde_json::json!({
                "firstname": "Ada",
                "lastname": "Lovelace",
                "email": "ada@example.com",
                "phone": "+32471000000",
                "password": "s3cret pass",
                "langkey": "nl"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let ack = client
            .request_email_and_phone_validation(&test_request("ada@example.com"), Some("nl"))
            .await
            .unwrap();

        assert_eq!(ack.status, 201);
        assert!(ack.body.is_null());
    }

    #[tokio::test]
    async fn test_request_validation_without_locale_sends_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/validation"))
            .and(body_json(serde_json::json!({
                "firstname": "Ada",
                "lastname": "Lovelace",
                "email": "ada@example.com",
                "phone": "+32471000000",
                "password": "s3cret pass",
                "langkey": null
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .request_email_and_phone_validation(&test_request("ada@example.com"), None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_request_validation_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/validation"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({ "error": "invalid_email_format" })),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .request_email_and_phone_validation(&test_request("not-an-email"), Some("en"))
            .await;

        match result {
            Err(RegistrationError::Validation { status, code, .. }) => {
                assert_eq!(status, 422);
                assert_eq!(code, Some(ErrorCode::InvalidEmailFormat));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_trims_email_only() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(serde_json::json!({
                "firstname": " Ada ",
                "lastname": "Lovelace",
                "email": "ada@example.com",
                "emailcode": " 1234 ",
                "phonenumber": "+32471000000",
                "phonenumbercode": "5678",
                "password": "s3cret pass",
                "redirectparams": "",
                "langkey": "en"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "redirecturl": "/", "error": "" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let credentials = Credentials {
            request: RegistrationRequest::new(
                " Ada ",
                "Lovelace",
                "  ada@example.com \t",
                "+32471000000",
                "s3cret pass",
            ),
            codes: ValidationCodes {
                emailcode: " 1234 ".into(),
                phonenumbercode: "5678".into(),
            },
            redirect_params: String::new(),
        };

        let ack = client.register(&credentials, Some("en")).await.unwrap();
        assert_eq!(ack.redirect_url(), Some("/"));
        assert!(ack.error_code().is_none());
    }

    #[tokio::test]
    async fn test_register_appends_raw_redirect_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .and(query_param("a", "1"))
            .and(query_param("b", "2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let credentials = Credentials {
            request: test_request("ada@example.com"),
            codes: ValidationCodes::default(),
            redirect_params: "a=1&b=2".into(),
        };

        let result = client.register(&credentials, None).await;
        assert!(result.is_ok());

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), Some("a=1&b=2"));

        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["redirectparams"], "a=1&b=2");
    }

    #[tokio::test]
    async fn test_register_invalid_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({ "redirecturl": "", "error": "invalid_sms_code" })),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let credentials = Credentials {
            request: test_request("ada@example.com"),
            codes: ValidationCodes {
                emailcode: String::new(),
                phonenumbercode: "0000".into(),
            },
            redirect_params: String::new(),
        };

        let result = client.register(&credentials, Some("en")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidCode {
                status: 422,
                expired: false
            })
        ));
    }

    #[tokio::test]
    async fn test_register_expired_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized\n"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let credentials = Credentials {
            request: test_request("ada@example.com"),
            codes: ValidationCodes::default(),
            redirect_params: String::new(),
        };

        let err = client.register(&credentials, None).await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidCode {
                status: 401,
                expired: true
            }
        ));
        assert_eq!(err.code(), Some(ErrorCode::InvalidSmsCode));
    }

    #[tokio::test]
    async fn test_submit_sms_code_expired() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/smsconfirmation"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized\n"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.submit_sms_code("1234").await;
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidCode {
                status: 401,
                expired: true
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_logo_encodes_global_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/organizations/Acme%20Corp/logo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "logo": "data:image/png;base64,AAAA" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let logo = client.fetch_organization_logo("Acme Corp").await.unwrap();
        assert_eq!(logo.logo, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_fetch_logo_encodes_path_separators() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/organizations/acme%2F..%2Fadmin/logo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let logo = client.fetch_organization_logo("acme/../admin").await.unwrap();
        assert!(logo.logo.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_logo_failure_passthrough() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/organizations/missing/logo"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.fetch_organization_logo("missing").await;

        match result {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_description_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/organizations/org1/description/en-US/withfallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "langkey": "en",
                "text": "The first organization"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let description = client
            .fetch_organization_description("org1", "en-US")
            .await
            .unwrap();

        assert_eq!(description.langkey, "en");
        assert_eq!(description.text, "The first organization");
    }

    #[tokio::test]
    async fn test_fetch_description_encodes_segments() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/organizations/Acme%20Corp/description/en%2FUS/withfallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "langkey": "en",
                "text": "t"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let description = client
            .fetch_organization_description("Acme Corp", "en/US")
            .await
            .unwrap();

        assert_eq!(description.text, "t");
    }

    #[tokio::test]
    async fn test_check_two_factor_mode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/register/check2famode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "no2fa": true })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let mode = client.check_two_factor_mode().await.unwrap();
        assert_eq!(mode, TwoFactorMode { no2fa: true });
    }

    #[tokio::test]
    async fn test_check_two_factor_mode_unreachable() {
        // Nothing listens on port 1.
        let client = RegistrationClient::new("http://127.0.0.1:1").unwrap();
        let result = client.check_two_factor_mode().await;

        match result {
            Err(TransportError::Request(e)) => assert!(e.is_connect()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resend_validation_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/resendvalidation"))
            .and(body_json(serde_json::json!({
                "email": " ada@example.com ",
                "phone": "+32471000000",
                "langkey": "fr"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .resend_validation(" ada@example.com ", "+32471000000", Some("fr"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_submit_sms_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/smsconfirmation"))
            .and(body_json(serde_json::json!({ "smscode": "" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "", "confirmed": true })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        // Empty codes are not rejected locally; the server decides.
        let ack = client.submit_sms_code("").await.unwrap();
        assert_eq!(ack.confirmed(), Some(true));
    }

    #[tokio::test]
    async fn test_submit_sms_code_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/smsconfirmation"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.submit_sms_code("1234").await;
        assert!(matches!(
            result,
            Err(RegistrationError::Server { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_check_sms_confirmation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/register/smsconfirmation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "confirmed": false })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let status = client.check_sms_confirmation().await.unwrap();
        assert!(!status.confirmed);
    }

    #[tokio::test]
    async fn test_check_email_confirmation_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/register/emailconfirmation"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let status = client.check_email_confirmation().await.unwrap();
        assert!(status.confirmed);
    }

    #[tokio::test]
    async fn test_network_error_is_classified() {
        let client = RegistrationClient::new("http://127.0.0.1:1").unwrap();
        let result = client.submit_sms_code("1234").await;
        assert!(matches!(result, Err(RegistrationError::Network(_))));
    }

    #[test]
    fn test_error_code_round_trip_names() {
        assert_eq!(ErrorCode::from("phone_already_used"), ErrorCode::PhoneAlreadyUsed);
        assert_eq!(ErrorCode::InvalidPassword.to_string(), "invalid_password");

        let other = ErrorCode::from("user_exists");
        assert_eq!(other, ErrorCode::Other("user_exists".into()));
        assert_eq!(other.as_str(), "user_exists");
    }

    #[test]
    fn test_registration_request_debug_hides_password() {
        let request = test_request("ada@example.com");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("s3cret pass"));
        assert!(debug.contains("ada@example.com"));
    }
}
