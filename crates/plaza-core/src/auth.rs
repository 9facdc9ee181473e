//! Typed client for the Plaza `auth/*` endpoints.

use std::future::Future;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpClient, bearer};

/// `{data: T, message?}` envelope used by the service.
#[derive(Debug, Clone, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    data: T,
}

/// Result of `GET auth/exists/{username}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameAvailability {
    pub user_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_name: String,
    pub user_email: String,
    pub user_password: String,
}

/// Account data returned by `POST auth/signUp`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub access_token: String,
    pub user_email: String,
    /// Top-level `message`, when the server sends one.
    #[serde(skip)]
    pub message: Option<String>,
    /// Remaining `data` fields (user id, username, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_email: String,
    pub otp_value: String,
}

/// `{message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// The four auth operations the signup and OTP flows depend on.
///
/// Failures propagate unchanged; no retries.
pub trait AuthService: Send + Sync + 'static {
    fn check_username_availability(
        &self,
        username: &str,
    ) -> impl Future<Output = ApiResult<UsernameAvailability>> + Send;

    fn signup(
        &self,
        request: &SignupRequest,
    ) -> impl Future<Output = ApiResult<SignupResponse>> + Send;

    fn verify_otp(
        &self,
        request: &VerifyOtpRequest,
        token: &str,
    ) -> impl Future<Output = ApiResult<MessageResponse>> + Send;

    fn resend_otp(&self, token: &str) -> impl Future<Output = ApiResult<MessageResponse>> + Send;
}

/// [`AuthService`] backed by the HTTP client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self::new(HttpClient::new(base_url))
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

impl AuthService for AuthClient {
    async fn check_username_availability(
        &self,
        username: &str,
    ) -> ApiResult<UsernameAvailability> {
        let value = self
            .http
            .get(&format!("auth/exists/{username}"), HeaderMap::new())
            .await?;
        let envelope: Envelope<UsernameAvailability> = decode(value)?;
        Ok(envelope.data)
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        let body = encode(request)?;
        let value = self
            .http
            .post("auth/signUp", Some(&body), HeaderMap::new())
            .await?;
        let envelope: Envelope<SignupResponse> = decode(value)?;
        let mut response = envelope.data;
        response.message = envelope.message;
        Ok(response)
    }

    async fn verify_otp(
        &self,
        request: &VerifyOtpRequest,
        token: &str,
    ) -> ApiResult<MessageResponse> {
        let body = encode(request)?;
        let value = self
            .http
            .post("auth/verifyOtp", Some(&body), bearer(token)?)
            .await?;
        decode(value)
    }

    async fn resend_otp(&self, token: &str) -> ApiResult<MessageResponse> {
        let value = self
            .http
            .post("auth/generateOtp", None, bearer(token)?)
            .await?;
        decode(value)
    }
}

fn encode<T: Serialize>(request: &T) -> ApiResult<Value> {
    serde_json::to_value(request)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("Unexpected response shape: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> AuthClient {
        AuthClient::from_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_check_username_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/exists/john"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"userExists": true}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .check_username_availability("john")
            .await
            .unwrap();
        assert!(result.user_exists);
    }

    #[tokio::test]
    async fn test_signup_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signUp"))
            .and(body_json(json!({
                "userName": "alice_j",
                "userEmail": "a@b.com",
                "userPassword": "Abcdef1!"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Signup successful",
                "data": {"accessToken": "tok123", "userEmail": "a@b.com", "userId": 7}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .signup(&SignupRequest {
                user_name: "alice_j".to_string(),
                user_email: "a@b.com".to_string(),
                user_password: "Abcdef1!".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.access_token, "tok123");
        assert_eq!(response.user_email, "a@b.com");
        assert_eq!(response.message.as_deref(), Some("Signup successful"));
        assert_eq!(response.extra.get("userId"), Some(&json!(7)));
    }

    #[tokio::test]
    async fn test_signup_without_token_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .signup(&SignupRequest {
                user_name: "alice_j".to_string(),
                user_email: "a@b.com".to_string(),
                user_password: "Abcdef1!".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_verify_otp_sends_bearer_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verifyOtp"))
            .and(header("authorization", "Bearer tok123"))
            .and(body_json(json!({"userEmail": "a@b.com", "otpValue": "123456"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Email verified"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .verify_otp(
                &VerifyOtpRequest {
                    user_email: "a@b.com".to_string(),
                    otp_value: "123456".to_string(),
                },
                "tok123",
            )
            .await
            .unwrap();
        assert_eq!(response.message, "Email verified");
    }

    #[tokio::test]
    async fn test_resend_otp_propagates_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/generateOtp"))
            .and(header("authorization", "Bearer tok123"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"message": "Too many requests"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resend_otp("tok123")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 429,
                message: "Too many requests".to_string()
            }
        );
    }
}
