//! Client for the IP Reputation service.
//!
//! Reads, writes and penalizes reputation entries keyed by IP address or
//! CIDR range. Every request is authenticated with Hawk.
//!
//! # Features
//!
//! - **Hawk Signing** - Per-request MAC over method, URI and body with a fresh timestamp and nonce
//! - **Typed Operations** - fetch, create, update, remove, record violation, plus ban/unban helpers
//! - **Uniform Results** - Any HTTP response is an [`OperationResult`]; only transport failures are errors
//! - **Header Timeout** - Bounded wait for response headers, no retries
//! - **Pluggable Transport** - Swap the HTTP layer through the [`Transport`] trait
//!
//! # Example
//!
//! ```no_run
//! use ip_reputation_client::{ClientConfig, ReputationClient};
//!
//! # async fn run() -> Result<(), ip_reputation_client::ClientError> {
//! let config = ClientConfig::new("127.0.0.1", 8080, "root", "toor").with_timeout_ms(5000);
//! let client = ReputationClient::new(config)?;
//!
//! let created = client.create("127.0.0.1", 50).await?;
//! assert_eq!(created.status, 201);
//!
//! let fetched = client.fetch("127.0.0.1").await?;
//! println!("{} {:?}", fetched.status, fetched.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod hawk;
pub mod request;
pub mod transport;
pub mod validate;

pub use client::ReputationClient;
pub use config::ClientConfig;
pub use credentials::{Credentials, HashAlgorithm};
pub use error::{ClientError, ConfigError, SigningError, TransportError, TransportErrorKind};
pub use request::{ExceptionEntry, ReputationEntry, SignedRequest};
pub use transport::{HttpTransport, OperationResult, ResponseBody, Transport};
