//! REST API client.
//!
//! All traffic to the `/api/v1/` backend goes through [`ApiTransport`]. The
//! production implementation is [`HttpTransport`] (reqwest + bearer token);
//! tests drive the same code paths with a scripted fake.

use std::future::Future;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::{PosError, PosResult};
use crate::session::Session;

/// Prefix shared by every resource endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Collection endpoint, e.g. `/api/v1/products/`.
pub fn collection_path(resource: &str) -> String {
    format!("{API_PREFIX}/{resource}/")
}

/// Single-record endpoint, e.g. `/api/v1/products/12`.
pub fn item_path(resource: &str, id: i64) -> String {
    format!("{API_PREFIX}/{resource}/{id}")
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// A decoded HTTP response. Empty bodies (204) become `Value::Null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait ApiTransport {
    /// Send one request. `path` includes the leading slash and the
    /// `/api/v1` prefix. Only transport-level failures are errors here; any
    /// HTTP status comes back as an `ApiResponse`.
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = PosResult<ApiResponse>> + Send;
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach API server at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid API server URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Generic message for an HTTP status with no usable body.
fn status_error(status: u16) -> String {
    match status {
        401 => "Not authenticated".to_string(),
        403 => "Not authorized".to_string(),
        404 => "Record not found".to_string(),
        s if s >= 500 => "Server error".to_string(),
        _ => "Unexpected response from server".to_string(),
    }
}

/// Best-effort human-readable message from an error body.
///
/// The backend reports failures as `{"detail": "..."}` or, for validation
/// errors, `{"detail": [{"msg": "...", ...}, ...]}`; only the first
/// message is used.
pub fn extract_detail_message(body: &Value) -> Option<String> {
    let detail = body.get("detail").or_else(|| body.get("message"))?;
    let message = match detail {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items
            .first()
            .and_then(|first| first.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Turn a non-success response into `PosError::Api`, preferring the
/// backend's own message over `fallback`.
pub fn response_error(resp: &ApiResponse, fallback: Option<&str>) -> PosError {
    let message = extract_detail_message(&resp.body)
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_else(|| status_error(resp.status));
    PosError::Api {
        status: resp.status,
        message,
    }
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// `GET` a collection and decode it.
pub async fn get_json<T, A>(api: &A, path: &str) -> PosResult<T>
where
    T: DeserializeOwned,
    A: ApiTransport,
{
    let resp = api.send(Method::GET, path, None).await?;
    if !resp.is_success() {
        return Err(response_error(&resp, None));
    }
    serde_json::from_value(resp.body).map_err(PosError::from)
}

/// `POST` a JSON body. `fallback` is used as the error message when the
/// backend gives no `detail`.
pub async fn post_json<A>(api: &A, path: &str, body: Value, fallback: &str) -> PosResult<Value>
where
    A: ApiTransport,
{
    let resp = api.send(Method::POST, path, Some(body)).await?;
    if !resp.is_success() {
        return Err(response_error(&resp, Some(fallback)));
    }
    Ok(resp.body)
}

/// `DELETE` a record.
pub async fn delete<A>(api: &A, path: &str) -> PosResult<()>
where
    A: ApiTransport,
{
    let resp = api.send(Method::DELETE, path, None).await?;
    if !resp.is_success() {
        return Err(response_error(&resp, Some("Delete failed")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// reqwest transport
// ---------------------------------------------------------------------------

/// Decode a response body. An unreadable or empty body becomes `Null`; a
/// body that is not JSON is kept as a string so error text still shows.
fn decode_body<E: std::fmt::Display>(status: u16, text: Result<String, E>) -> Value {
    let text = match text {
        Ok(text) => text,
        Err(e) => {
            warn!(status, error = %e, "failed to read response body");
            return Value::Null;
        }
    };
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!(status, error = %e, "non-JSON response body");
            Value::String(text)
        }
    }
}

pub struct HttpTransport {
    client: Client,
    base: String,
    token: Option<Zeroizing<String>>,
}

impl HttpTransport {
    pub fn new(config: &Config, session: Option<&Session>) -> PosResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PosError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: config.api_url.clone(),
            token: session
                .and_then(Session::access_token)
                .map(|t| Zeroizing::new(t.to_string())),
        })
    }
}

impl ApiTransport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> PosResult<ApiResponse> {
        let full_url = format!("{}{path}", self.base);
        debug!(method = %method, url = %full_url, "api request");

        let mut req = self
            .client
            .request(method, &full_url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.token.as_ref() {
            req = req.bearer_auth(token.as_str());
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PosError::Network(friendly_error(&self.base, &e)))?;
        let status: StatusCode = resp.status();
        let status = status.as_u16();
        let body = decode_body(status, resp.text().await);

        Ok(ApiResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Test fake
// ---------------------------------------------------------------------------
