//! Hawk request signing.
//!
//! Produces the `Authorization` header for a request:
//! 1. Hash the payload (when present) with its content type
//! 2. Build the normalized request string from timestamp, nonce, method,
//!    resource, host, port, payload hash and ext
//! 3. HMAC the normalized string with the shared key and base64 encode it
//!
//! The server recomputes the same MAC, so every byte of the normalized
//! string has to match what is actually sent.

use crate::credentials::{Credentials, HashAlgorithm};
use crate::error::SigningError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Method, Url};
use std::time::{SystemTime, UNIX_EPOCH};

const HEADER_VERSION: &str = "hawk.1.header";
const PAYLOAD_VERSION: &str = "hawk.1.payload";
const NONCE_LEN: usize = 8;

/// Request body as covered by the payload hash.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    pub content_type: &'a str,
    pub body: &'a [u8],
}

/// Hash of a request payload, base64 encoded.
///
/// Content type parameters (`; charset=...`) are dropped and the media type
/// is lowercased before hashing.
pub fn payload_hash(algorithm: HashAlgorithm, content_type: &str, body: &[u8]) -> String {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let mut normalized =
        Vec::with_capacity(PAYLOAD_VERSION.len() + media_type.len() + body.len() + 3);
    normalized.extend_from_slice(PAYLOAD_VERSION.as_bytes());
    normalized.push(b'\n');
    normalized.extend_from_slice(media_type.as_bytes());
    normalized.push(b'\n');
    normalized.extend_from_slice(body);
    normalized.push(b'\n');

    BASE64.encode(algorithm.digest(&normalized))
}

/// Random nonce for a single request.
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Everything the request MAC covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub ts: u64,
    pub nonce: String,
    pub method: String,
    pub resource: String,
    pub host: String,
    pub port: u16,
    pub hash: Option<String>,
    pub ext: Option<String>,
}

impl Artifacts {
    /// Collect artifacts for a request with an explicit timestamp and nonce.
    ///
    /// An absent or empty payload leaves `hash` unset.
    pub fn new(
        algorithm: HashAlgorithm,
        method: &Method,
        url: &Url,
        payload: Option<Payload<'_>>,
        ts: u64,
        nonce: impl Into<String>,
    ) -> Result<Self, SigningError> {
        let host = url
            .host_str()
            .ok_or_else(|| SigningError::InvalidUrl(format!("{} has no host", url)))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| SigningError::InvalidUrl(format!("{} has no port", url)))?;

        let resource = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let hash = payload
            .filter(|p| !p.body.is_empty())
            .map(|p| payload_hash(algorithm, p.content_type, p.body));

        Ok(Self {
            ts,
            nonce: nonce.into(),
            method: method.as_str().to_ascii_uppercase(),
            resource,
            host,
            port,
            hash,
            ext: None,
        })
    }

    /// Attach application-specific `ext` data.
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    /// The string the MAC is computed over.
    pub fn normalized_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            HEADER_VERSION,
            self.ts,
            self.nonce,
            self.method,
            self.resource,
            self.host,
            self.port,
            self.hash.as_deref().unwrap_or_default(),
            self.ext.as_deref().map(normalize_ext).unwrap_or_default(),
        )
    }

    /// Base64 MAC of the normalized string.
    pub fn mac(&self, credentials: &Credentials) -> String {
        let mac = credentials
            .algorithm()
            .hmac(credentials.key(), self.normalized_string().as_bytes());
        BASE64.encode(mac)
    }

    /// Full `Authorization` header value.
    pub fn header(&self, credentials: &Credentials) -> String {
        let mut header = format!(
            "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\"",
            escape(credentials.id()),
            self.ts,
            self.nonce
        );
        if let Some(ref hash) = self.hash {
            header.push_str(&format!(", hash=\"{}\"", hash));
        }
        if let Some(ref ext) = self.ext {
            header.push_str(&format!(", ext=\"{}\"", escape(ext)));
        }
        header.push_str(&format!(", mac=\"{}\"", self.mac(credentials)));
        header
    }
}

/// Sign a request with the current time and a fresh nonce.
pub fn sign(
    credentials: &Credentials,
    method: &Method,
    url: &Url,
    payload: Option<Payload<'_>>,
) -> Result<String, SigningError> {
    let artifacts = Artifacts::new(
        credentials.algorithm(),
        method,
        url,
        payload,
        now_secs(),
        generate_nonce(),
    )?;
    Ok(artifacts.header(credentials))
}

/// Header attribute escaping.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `ext` as it appears in the normalized string.
fn normalize_ext(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}
