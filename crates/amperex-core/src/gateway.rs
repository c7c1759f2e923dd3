//! Authenticated HTTP gateway to the dashboard backend.
//!
//! Every backend call goes through [`Gateway`]. It attaches the stored token
//! as a bearer credential and watches every response for 401: the session is
//! cleared and the user is sent back to the entry route, no matter which
//! call triggered it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::navigation::{Navigator, Redirect};
use crate::session::SessionStore;

/// Categories of gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The server answered 401. The session has already been evicted.
    Unauthorized,
    /// Any other non-2xx status.
    HttpStatus,
    /// No response within the request timeout.
    Timeout,
    /// The request never got a response (refused, DNS, offline mode).
    Network,
    /// The response body was not what the caller expected.
    Parse,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayErrorKind::Unauthorized => write!(f, "unauthorized"),
            GatewayErrorKind::HttpStatus => write!(f, "http_status"),
            GatewayErrorKind::Timeout => write!(f, "timeout"),
            GatewayErrorKind::Network => write!(f, "network"),
            GatewayErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    /// HTTP status when the server answered.
    pub status: Option<u16>,
    /// One-line summary suitable for display. The server's own `message` or
    /// `detail` when it sent one.
    pub message: String,
    /// Set when `message` came from the response body.
    pub server_message: Option<String>,
    /// Raw response body or transport error text.
    pub details: Option<String>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            server_message: None,
            details: None,
        }
    }

    /// Creates an error for a non-2xx status, lifting the server's message
    /// out of a JSON body when present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = if status == StatusCode::UNAUTHORIZED.as_u16() {
            GatewayErrorKind::Unauthorized
        } else {
            GatewayErrorKind::HttpStatus
        };
        let server_message = extract_server_message(body);
        Self {
            kind,
            status: Some(status),
            message: server_message
                .clone()
                .unwrap_or_else(|| format!("HTTP {status}")),
            server_message,
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn parse(message: impl Into<String>, body: &str) -> Self {
        Self {
            details: Some(body.to_string()),
            ..Self::new(GatewayErrorKind::Parse, message)
        }
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            GatewayErrorKind::Timeout | GatewayErrorKind::Network
        )
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        let error = if err.is_timeout() {
            Self::timeout("Request timed out")
        } else if err.is_decode() {
            Self::new(GatewayErrorKind::Parse, "Failed to decode response body")
        } else {
            Self::network("Backend unreachable")
        };
        Self {
            details: Some(err.to_string()),
            ..error
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Pulls `message` (the dashboard backend) or `detail` (FastAPI's default
/// error shape) out of an error body.
fn extract_server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["message", "detail"]
        .iter()
        .find_map(|key| json.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
}

/// HTTP client rooted at `<base_url>/api/`.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base: Url,
    offline: bool,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl Gateway {
    /// Creates a gateway from the `[api]` config section.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let mut gateway = Self::with_timeout(
            &config.api.base_url,
            config.request_timeout(),
            store,
            navigator,
        )?;
        gateway.offline = config.api.offline;
        Ok(gateway)
    }

    /// Creates a gateway for an explicit origin and timeout.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn with_timeout(
        base_url: &str,
        timeout: Option<Duration>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base = Url::parse(&format!("{}/api/", base_url.trim().trim_end_matches('/')))
            .with_context(|| format!("Invalid base URL: {base_url}"))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base,
            offline: false,
            store,
            navigator,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// True when `api.offline` is set and no request will be sent.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    /// See [`GatewayErrorKind`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.get(url)).await?;
        decode(response).await
    }

    /// POST `body` as JSON to `path` and decode the JSON reply.
    ///
    /// # Errors
    /// See [`GatewayErrorKind`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(self.client.post(url).json(body)).await?;
        decode(response).await
    }

    /// POST with no body; the reply body is ignored.
    ///
    /// # Errors
    /// See [`GatewayErrorKind`].
    pub async fn post_empty(&self, path: &str) -> GatewayResult<()> {
        let url = self.url(path)?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        self.send(request).await.map(|_| ())
    }

    fn url(&self, path: &str) -> GatewayResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::network(format!("Invalid request path {path}: {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        if self.offline {
            return Err(GatewayError::network("Backend disabled (api.offline)"));
        }

        let request = match self.store.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Backend request failed: {e}");
            GatewayError::from_reqwest(&e)
        })?;

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "backend response");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.evict_session();
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::http_status(status.as_u16(), &body))
    }

    /// Clears the session and forces a return to the entry route.
    fn evict_session(&self) {
        tracing::info!("Backend rejected the session token, signing out");
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear session: {e:#}");
        }
        self.navigator.navigate(Redirect::to_entry());
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::from_reqwest(&e))?;
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::parse(format!("Unexpected response body: {e}"), &body))
}
