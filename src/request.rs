//! Request shapes for each service operation.
//!
//! Bodies are serialized before signing and the signed bytes are the ones
//! sent, so the payload hash always covers the transmitted body.

use crate::credentials::Credentials;
use crate::error::{ClientError, SigningError};
use crate::hawk::{self, Payload};
use crate::validate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReputationRecord {
    pub ip: String,
    pub reputation: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
}

/// Body of an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReputationUpdate {
    pub reputation: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
}

/// Body of a violation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    pub ip: String,
    #[serde(rename = "Violation")]
    pub violation: String,
}

/// Reputation entry as returned by a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReputationEntry {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Reputation")]
    pub reputation: u8,
    /// Set once an operator has looked at the entry.
    #[serde(rename = "Reviewed", default)]
    pub reviewed: bool,
}

/// An address range the service never penalizes.
///
/// Timestamps are passed through as the service formats them (RFC 3339).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExceptionEntry {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Creator")]
    pub creator: String,
    #[serde(rename = "Modified")]
    pub modified: String,
    #[serde(rename = "Expires")]
    pub expires: String,
}

/// A request with its final body but no authorization yet.
#[derive(Debug, Clone)]
pub struct UnsignedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl UnsignedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    /// Serialize `body` as JSON and attach it.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Compute the Hawk header over the finished request.
    pub fn sign(self, credentials: &Credentials) -> Result<SignedRequest, SigningError> {
        let payload = self.body.as_deref().map(|body| Payload {
            content_type: JSON_CONTENT_TYPE,
            body,
        });
        let authorization = hawk::sign(credentials, &self.method, &self.url, payload)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if self.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        let value = HeaderValue::from_str(&authorization)
            .map_err(|e| SigningError::InvalidHeader(e.to_string()))?;
        headers.insert(AUTHORIZATION, value);

        Ok(SignedRequest {
            method: self.method,
            url: self.url,
            headers,
            body: self.body,
        })
    }
}

/// A request ready for the transport.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl SignedRequest {
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Builds the request for each operation relative to the service base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
}

impl RequestBuilder {
    /// `base_url` must end in `/`.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /{ip}`
    pub fn fetch(&self, ip: &str) -> Result<UnsignedRequest, ClientError> {
        validate::check_ip(ip)?;
        Ok(UnsignedRequest::new(Method::GET, self.url(ip)?))
    }

    /// `POST /` with `{ip, reputation}`, plus `reviewed` when given.
    pub fn create(
        &self,
        ip: &str,
        reputation: u8,
        reviewed: Option<bool>,
    ) -> Result<UnsignedRequest, ClientError> {
        validate::check_ip(ip)?;
        validate::check_reputation(reputation)?;
        let record = ReputationRecord {
            ip: ip.to_string(),
            reputation,
            reviewed,
        };
        Ok(UnsignedRequest::new(Method::POST, self.base_url.clone()).with_json(&record)?)
    }

    /// `PUT /{ip}` with `{reputation}`, plus `reviewed` when given.
    pub fn update(
        &self,
        ip: &str,
        reputation: u8,
        reviewed: Option<bool>,
    ) -> Result<UnsignedRequest, ClientError> {
        validate::check_ip(ip)?;
        validate::check_reputation(reputation)?;
        let update = ReputationUpdate {
            reputation,
            reviewed,
        };
        Ok(UnsignedRequest::new(Method::PUT, self.url(ip)?).with_json(&update)?)
    }

    /// `DELETE /{ip}`
    pub fn remove(&self, ip: &str) -> Result<UnsignedRequest, ClientError> {
        validate::check_ip(ip)?;
        Ok(UnsignedRequest::new(Method::DELETE, self.url(ip)?))
    }

    /// `PUT /violations/{ip}` with `{ip, Violation}`
    pub fn record_violation(
        &self,
        ip: &str,
        violation_type: &str,
    ) -> Result<UnsignedRequest, ClientError> {
        validate::check_ip(ip)?;
        validate::check_violation(violation_type)?;
        let report = ViolationReport {
            ip: ip.to_string(),
            violation: violation_type.to_string(),
        };
        let url = self.url(&format!("violations/{}", ip))?;
        Ok(UnsignedRequest::new(Method::PUT, url).with_json(&report)?)
    }

    /// `GET /violations`
    pub fn list_violations(&self) -> Result<UnsignedRequest, ClientError> {
        Ok(UnsignedRequest::new(Method::GET, self.url("violations")?))
    }

    /// `GET /exceptions`
    pub fn exceptions(&self) -> Result<UnsignedRequest, ClientError> {
        Ok(UnsignedRequest::new(Method::GET, self.url("exceptions")?))
    }

    /// `GET /__heartbeat__`, `/__lbheartbeat__` or `/__version__`
    pub fn service_info(&self, route: ServiceRoute) -> Result<UnsignedRequest, ClientError> {
        Ok(UnsignedRequest::new(Method::GET, self.url(route.path())?))
    }

    // Appends rather than joins: `Url::join` reads IPv6 literals like
    // `fe80::1` as a scheme.
    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::invalid_argument("ip", e.to_string()))
    }
}

/// Unauthenticated service status routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRoute {
    Heartbeat,
    LbHeartbeat,
    Version,
}

impl ServiceRoute {
    pub fn path(&self) -> &'static str {
        match self {
            ServiceRoute::Heartbeat => "__heartbeat__",
            ServiceRoute::LbHeartbeat => "__lbheartbeat__",
            ServiceRoute::Version => "__version__",
        }
    }
}
