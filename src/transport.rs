//! Sends signed requests and normalizes the responses.

use crate::error::TransportError;
use crate::request::SignedRequest;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Response body after content-type normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body of a JSON response.
    Json(serde_json::Value),
    /// Any other body, or JSON that failed to parse.
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

/// Outcome of any request that received an HTTP response, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub status: u16,
    /// Lowercased header names; repeated headers joined with `", "`.
    pub headers: HashMap<String, String>,
    /// `None` when the response had no body.
    pub body: Option<ResponseBody>,
}

impl OperationResult {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: ResponseBody) -> Self {
        self.body = Some(body);
        self
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deserialize the body, `Ok(None)` when there is none.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        match self.body {
            None => Ok(None),
            Some(ResponseBody::Json(ref value)) => serde_json::from_value(value.clone()).map(Some),
            Some(ResponseBody::Text(ref text)) => serde_json::from_str(text).map(Some),
        }
    }
}

/// Classify a raw response body.
pub fn normalize_body(content_type: Option<&str>, bytes: &[u8]) -> Option<ResponseBody> {
    if bytes.is_empty() {
        return None;
    }

    if content_type.is_some_and(is_json_content_type) {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return Some(ResponseBody::Json(value));
        }
    }

    Some(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()))
}

fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}

/// Executes signed requests.
///
/// Implementations return `Ok` for every HTTP response received, including
/// 4xx and 5xx, and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SignedRequest) -> Result<OperationResult, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Transport waiting at most `timeout` for response headers.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, timeout))
    }

    /// Wrap a preconfigured reqwest client.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: SignedRequest) -> Result<OperationResult, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        // Only the wait for headers is bounded; dropping the future on
        // expiry abandons the connection.
        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .map_err(|_| TransportError::timeout(self.timeout.as_millis() as u64))??;

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let bytes = response.bytes().await?;

        let body = normalize_body(
            headers.get(CONTENT_TYPE.as_str()).map(String::as_str),
            &bytes,
        );

        debug!(status = status, bytes = bytes.len(), "Response received");

        Ok(OperationResult {
            status,
            headers,
            body,
        })
    }
}
