//! Client configuration.

use crate::credentials::Credentials;
use crate::error::ConfigError;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Response header timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection and credential settings for a [`ReputationClient`](crate::ReputationClient).
///
/// Every field is optional at the type level so that a config file with a
/// missing entry still parses; [`validate`](Self::validate) reports which
/// required field is absent.
#[derive(Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Service hostname or IP literal.
    #[serde(default)]
    pub host: Option<String>,

    /// Service port, 1-65535.
    #[serde(default)]
    pub port: Option<u32>,

    /// Hawk identity.
    #[serde(default)]
    pub id: Option<String>,

    /// Hawk shared key (supports ${ENV_VAR} syntax in files).
    #[serde(default)]
    pub key: Option<String>,

    /// Milliseconds to wait for response headers.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Hawk hash algorithm, `sha256` unless set.
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// Validated settings the client is built from.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub base_url: Url,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with all required fields set and default timeout.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(u32::from(port)),
            id: Some(id.into()),
            key: Some(key.into()),
            timeout_ms: None,
            algorithm: None,
        }
    }

    /// Set the response header timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content);
        let config: ClientConfig = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, reporting the first one that is missing or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    /// Timeout in effect once defaults are applied.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub(crate) fn resolve(&self) -> Result<Endpoint, ConfigError> {
        let host = required(&self.host, "host")?;
        if !is_valid_hostname(host) {
            return Err(ConfigError::Invalid {
                field: "host",
                reason: format!("{:?} is not a valid hostname", host),
            });
        }

        let port = self.port.ok_or(ConfigError::Missing { field: "port" })?;
        if !(1..=u32::from(u16::MAX)).contains(&port) {
            return Err(ConfigError::Invalid {
                field: "port",
                reason: format!("{} is outside 1..=65535", port),
            });
        }

        let id = required(&self.id, "id")?;
        let key = required(&self.key, "key")?;

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "timeout_ms",
                reason: "must be a positive number of milliseconds".to_string(),
            });
        }

        let mut credentials = Credentials::new(id, key);
        if let Some(ref algorithm) = self.algorithm {
            credentials = credentials
                .with_algorithm(algorithm)
                .map_err(|e| ConfigError::Invalid {
                    field: "algorithm",
                    reason: e.to_string(),
                })?;
        }

        let base_url = base_url(host, port)?;

        Ok(Endpoint {
            base_url,
            credentials,
            timeout: self.timeout(),
        })
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# IP Reputation client configuration

host: "127.0.0.1"              # service hostname or IP
port: 8080                     # 1-65535
id: "root"                     # Hawk identity
key: "${REPUTATION_HAWK_KEY}"  # Hawk shared key, read from the environment
timeout_ms: 30000              # wait this long for response headers
# algorithm: sha256            # sha256 (default) or sha512
"#
        .to_string()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("id", &self.id)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ConfigError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { field }),
    }
}

fn base_url(host: &str, port: u32) -> Result<Url, ConfigError> {
    let raw = if host.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{}]:{}/", host, port)
    } else {
        format!("http://{}:{}/", host, port)
    };
    Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        field: "host",
        reason: e.to_string(),
    })
}

/// Accepts IP literals and RFC 1123 hostnames.
pub fn is_valid_hostname(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }

    let name = host.strip_suffix('.').unwrap_or(host);
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    static ENV_VAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

    re.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
