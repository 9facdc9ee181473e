//! JSON-over-HTTP client for the Plaza service.
//!
//! Every call is a single request: no retries, no timeout. Non-2xx responses
//! are normalized into [`ApiError::Http`] carrying the server's `message`.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::{ApiError, ApiResult, classify_reqwest_error};

/// Standard User-Agent header for Plaza requests.
pub const USER_AGENT: &str = concat!("plaza/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base URL and `path` with exactly one `/`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends one request and resolves with the parsed JSON body.
    ///
    /// `Content-Type: application/json` is always sent; a caller header with
    /// the same name replaces it.
    ///
    /// # Errors
    /// Returns [`ApiError::Http`] on a non-2xx status, [`ApiError::Network`]
    /// when no response arrives, and [`ApiError::Decode`] when a 2xx body is
    /// not JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> ApiResult<Value> {
        let url = self.url_for(path);

        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        for (name, value) in &headers {
            merged.insert(name.clone(), value.clone());
        }

        tracing::debug!(%method, %url, has_body = body.is_some(), "sending request");

        let mut builder = self.client.request(method.clone(), &url).headers(merged);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {e}")))?;
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.json::<Value>().await.ok();
            let err = ApiError::from_status(status.as_u16(), error_body.as_ref());
            tracing::warn!(%method, %url, status = status.as_u16(), message = err.message(), "request failed");
            return Err(err);
        }

        parse_success_body(status, response).await
    }

    /// `GET path`.
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn get(&self, path: &str, headers: HeaderMap) -> ApiResult<Value> {
        self.request(Method::GET, path, None, headers).await
    }

    /// `POST path` with an optional JSON body.
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> ApiResult<Value> {
        self.request(Method::POST, path, body, headers).await
    }

    /// `PUT path` with an optional JSON body.
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> ApiResult<Value> {
        self.request(Method::PUT, path, body, headers).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn delete(&self, path: &str, headers: HeaderMap) -> ApiResult<Value> {
        self.request(Method::DELETE, path, None, headers).await
    }
}

async fn parse_success_body(status: StatusCode, response: reqwest::Response) -> ApiResult<Value> {
    response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::Decode(format!("Invalid JSON in {status} response: {e}")))
}

/// Builds the `Authorization: Bearer <token>` header set.
///
/// # Errors
/// Returns [`ApiError::InvalidRequest`] if the token is not a valid header value.
pub fn bearer(token: &str) -> ApiResult<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid session token: {e}")))?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}
