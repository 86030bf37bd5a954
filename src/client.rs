//! Reputation service client.

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{ClientError, ConfigError, Result};
use crate::request::{ReputationEntry, RequestBuilder, ServiceRoute, UnsignedRequest};
use crate::transport::{HttpTransport, OperationResult, Transport};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status the service returns when a create hits an existing entry.
const CONFLICT: u16 = 409;

/// Reputation given to banned addresses.
pub const BANNED_REPUTATION: u8 = 0;

/// Reputation given to unbanned addresses.
pub const UNBANNED_REPUTATION: u8 = 100;

/// Client for the IP reputation service.
///
/// Every operation signs its request with the client's Hawk credentials and
/// resolves to an [`OperationResult`] for any HTTP response, including 4xx
/// and 5xx. Only invalid arguments, signing failures and transport failures
/// are errors. Calls share no mutable state, so one client can serve any
/// number of concurrent tasks.
#[derive(Clone)]
pub struct ReputationClient {
    requests: RequestBuilder,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl ReputationClient {
    /// Create a client talking HTTP to the configured service.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport))?)
    }

    /// Create a client that sends through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<Self, ConfigError> {
        let endpoint = config.resolve()?;

        info!(
            base_url = %endpoint.base_url,
            id = endpoint.credentials.id(),
            timeout_ms = endpoint.timeout.as_millis() as u64,
            "Reputation client initialized"
        );

        Ok(Self {
            requests: RequestBuilder::new(endpoint.base_url),
            credentials: endpoint.credentials,
            transport,
        })
    }

    /// `http://{host}:{port}/`
    pub fn base_url(&self) -> &Url {
        self.requests.base_url()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fetch the reputation entry for `ip`.
    pub async fn fetch(&self, ip: &str) -> Result<OperationResult> {
        self.execute(self.requests.fetch(ip)?).await
    }

    /// Create an entry; the service answers 409 if one exists.
    pub async fn create(&self, ip: &str, reputation: u8) -> Result<OperationResult> {
        self.execute(self.requests.create(ip, reputation, None)?).await
    }

    /// Update the reputation of `ip`.
    pub async fn update(&self, ip: &str, reputation: u8) -> Result<OperationResult> {
        self.execute(self.requests.update(ip, reputation, None)?).await
    }

    /// Delete the entry for `ip`.
    pub async fn remove(&self, ip: &str) -> Result<OperationResult> {
        self.execute(self.requests.remove(ip)?).await
    }

    /// Penalize `ip` by the service's configured weight for `violation_type`.
    pub async fn record_violation(
        &self,
        ip: &str,
        violation_type: &str,
    ) -> Result<OperationResult> {
        self.execute(self.requests.record_violation(ip, violation_type)?)
            .await
    }

    /// Known violation types and their penalties.
    pub async fn list_violations(&self) -> Result<OperationResult> {
        self.execute(self.requests.list_violations()?).await
    }

    /// Address ranges exempt from penalties.
    pub async fn exceptions(&self) -> Result<OperationResult> {
        self.execute(self.requests.exceptions()?).await
    }

    pub async fn heartbeat(&self) -> Result<OperationResult> {
        self.execute(self.requests.service_info(ServiceRoute::Heartbeat)?)
            .await
    }

    pub async fn lb_heartbeat(&self) -> Result<OperationResult> {
        self.execute(self.requests.service_info(ServiceRoute::LbHeartbeat)?)
            .await
    }

    pub async fn version(&self) -> Result<OperationResult> {
        self.execute(self.requests.service_info(ServiceRoute::Version)?)
            .await
    }

    /// Create the entry, falling back to an update if it already exists.
    pub async fn set_reputation(
        &self,
        ip: &str,
        reputation: u8,
        reviewed: bool,
    ) -> Result<OperationResult> {
        let created = self
            .execute(self.requests.create(ip, reputation, Some(reviewed))?)
            .await?;
        if created.status != CONFLICT {
            return Ok(created);
        }

        debug!(ip = ip, "Entry exists, updating instead");
        self.execute(self.requests.update(ip, reputation, Some(reviewed))?)
            .await
    }

    /// Set the reviewed flag on an existing entry, keeping its reputation.
    ///
    /// If the fetch does not return an entry, its result is returned as is.
    pub async fn set_reviewed(&self, ip: &str, reviewed: bool) -> Result<OperationResult> {
        let fetched = self.fetch(ip).await?;
        if !fetched.is_success() {
            return Ok(fetched);
        }
        let Some(entry) = fetched.parse::<ReputationEntry>()? else {
            return Ok(fetched);
        };

        self.execute(self.requests.update(ip, entry.reputation, Some(reviewed))?)
            .await
    }

    /// Set the reputation of `ip` to the minimum and mark it reviewed.
    pub async fn ban(&self, ip: &str) -> Result<OperationResult> {
        self.set_reputation(ip, BANNED_REPUTATION, true).await
    }

    /// Set the reputation of `ip` to the maximum and clear the reviewed flag.
    pub async fn unban(&self, ip: &str) -> Result<OperationResult> {
        self.set_reputation(ip, UNBANNED_REPUTATION, false).await
    }

    async fn execute(&self, request: UnsignedRequest) -> Result<OperationResult> {
        let signed = request.sign(&self.credentials)?;
        let method = signed.method.clone();
        let url = signed.url.clone();

        debug!(method = %method, url = %url, "Sending request");

        match self.transport.send(signed).await {
            Ok(result) => {
                debug!(method = %method, url = %url, status = result.status, "Request complete");
                Ok(result)
            }
            Err(e) => {
                warn!(method = %method, url = %url, code = e.code(), error = %e, "Request failed");
                Err(ClientError::Transport(e))
            }
        }
    }
}

impl std::fmt::Debug for ReputationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationClient")
            .field("base_url", &self.base_url().as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::hawk::{Artifacts, Payload};
    use crate::error::SigningError;
    use crate::request::{ExceptionEntry, SignedRequest, JSON_CONTENT_TYPE};
    use crate::transport::{normalize_body, ResponseBody};
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    const ALREADY_SET: &str = "Reputation is already set for that IP.";
    const EXCEPTIONS: &str = r#"[{"IP":"10.10.0.0/16","Creator":"file:/etc/exceptions","Modified":"2024-05-01T12:00:00Z","Expires":"0001-01-01T00:00:00Z"}]"#;

    /// In-memory stand-in for the reputation service.
    ///
    /// Verifies the Hawk MAC of every request and answers like the service does.
    struct FakeService {
        credentials: Credentials,
        entries: Mutex<HashMap<String, Stored>>,
        penalties: HashMap<String, u8>,
        seen: Mutex<Vec<SignedRequest>>,
    }

    #[derive(Debug, Clone, Copy)]
    struct Stored {
        reputation: u8,
        reviewed: Option<bool>,
    }

    impl Stored {
        fn from_body(body: &Value, fallback: Option<Stored>) -> Self {
            Self {
                reputation: body["reputation"].as_u64().unwrap_or_default() as u8,
                reviewed: body["reviewed"]
                    .as_bool()
                    .or(fallback.and_then(|s| s.reviewed)),
            }
        }
    }

    impl FakeService {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                credentials: Credentials::new("root", "toor"),
                entries: Mutex::new(HashMap::new()),
                penalties: HashMap::from([("test_violation".to_string(), 30)]),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<SignedRequest> {
            self.seen.lock().unwrap().clone()
        }

        fn authorized(&self, request: &SignedRequest) -> bool {
            let Some(header) = request.authorization() else {
                return false;
            };
            let Some(attrs) = header.strip_prefix("Hawk ") else {
                return false;
            };
            let attrs: HashMap<&str, &str> = attrs
                .split(", ")
                .filter_map(|kv| kv.split_once('='))
                .map(|(k, v)| (k, v.trim_matches('"')))
                .collect();

            if attrs.get("id") != Some(&self.credentials.id()) {
                return false;
            }
            let (Some(ts), Some(nonce), Some(mac)) =
                (attrs.get("ts"), attrs.get("nonce"), attrs.get("mac"))
            else {
                return false;
            };
            let Ok(ts) = ts.parse() else {
                return false;
            };

            let payload = request.body.as_deref().map(|body| Payload {
                content_type: request.content_type().unwrap_or_default(),
                body,
            });
            let expected = Artifacts::new(
                self.credentials.algorithm(),
                &request.method,
                &request.url,
                payload,
                ts,
                *nonce,
            )
            .map(|a| a.mac(&self.credentials));

            matches!(expected, Ok(ref m) if m == mac)
        }

        fn respond(&self, request: &SignedRequest) -> OperationResult {
            if !self.authorized(request) {
                return OperationResult::new(401);
            }

            let path = request.url.path().trim_start_matches('/').to_string();
            let body: Value = request
                .body
                .as_deref()
                .and_then(|b| serde_json::from_slice(b).ok())
                .unwrap_or(Value::Null);
            let mut entries = self.entries.lock().unwrap();

            match (request.method.clone(), path.as_str()) {
                (Method::GET, "__heartbeat__") | (Method::GET, "__lbheartbeat__") => {
                    OperationResult::new(200)
                }
                (Method::GET, "__version__") => json_result(200, r#"{"version":"test"}"#),
                (Method::GET, "violations") => json_result(200, r#"{"test_violation":30}"#),
                (Method::GET, "exceptions") => json_result(200, EXCEPTIONS),
                (Method::POST, "") => {
                    let ip = body["ip"].as_str().unwrap_or_default().to_string();
                    if entries.contains_key(&ip) {
                        text_result(CONFLICT, ALREADY_SET)
                    } else {
                        entries.insert(ip, Stored::from_body(&body, None));
                        OperationResult::new(201)
                    }
                }
                (Method::PUT, p) if p.starts_with("violations/") => {
                    let ip = p.trim_start_matches("violations/").to_string();
                    let violation = body["Violation"].as_str().unwrap_or_default();
                    match self.penalties.get(violation) {
                        Some(penalty) => {
                            let current = entries.get(&ip).copied().unwrap_or(Stored {
                                reputation: 100,
                                reviewed: None,
                            });
                            entries.insert(
                                ip,
                                Stored {
                                    reputation: current.reputation.saturating_sub(*penalty),
                                    ..current
                                },
                            );
                            OperationResult::new(200)
                        }
                        None => OperationResult::new(400),
                    }
                }
                (Method::GET, ip) => match entries.get(ip) {
                    Some(stored) => {
                        let mut entry = serde_json::json!({
                            "IP": ip,
                            "Reputation": stored.reputation,
                        });
                        if let Some(reviewed) = stored.reviewed {
                            entry["Reviewed"] = Value::Bool(reviewed);
                        }
                        json_result(200, &entry.to_string())
                    }
                    None => OperationResult::new(404),
                },
                (Method::PUT, ip) => {
                    let previous = entries.get(ip).copied();
                    entries.insert(ip.to_string(), Stored::from_body(&body, previous));
                    OperationResult::new(200)
                }
                (Method::DELETE, ip) => {
                    entries.remove(ip);
                    OperationResult::new(200)
                }
                _ => OperationResult::new(405),
            }
        }
    }

    fn json_result(status: u16, body: &str) -> OperationResult {
        let mut result = OperationResult::new(status).with_header("Content-Type", JSON_CONTENT_TYPE);
        result.body = normalize_body(Some(JSON_CONTENT_TYPE), body.as_bytes());
        result
    }

    fn text_result(status: u16, body: &str) -> OperationResult {
        let mut result = OperationResult::new(status).with_header("Content-Type", "text/plain");
        result.body = normalize_body(Some("text/plain"), body.as_bytes());
        result
    }

    #[async_trait]
    impl Transport for FakeService {
        async fn send(&self, request: SignedRequest) -> std::result::Result<OperationResult, TransportError> {
            let result = self.respond(&request);
            self.seen.lock().unwrap().push(request);
            Ok(result)
        }
    }

    fn test_config() -> ClientConfig {
        ClientConfig::new("127.0.0.1", 8080, "root", "toor")
    }

    fn client_for(service: &Arc<FakeService>) -> ReputationClient {
        ReputationClient::with_transport(test_config(), service.clone()).unwrap()
    }

    #[test]
    fn test_missing_fields_fail_construction() {
        let configs = [
            ClientConfig::default(),
            ClientConfig {
                host: None,
                ..test_config()
            },
            ClientConfig {
                port: None,
                ..test_config()
            },
            ClientConfig {
                id: None,
                ..test_config()
            },
            ClientConfig {
                key: None,
                ..test_config()
            },
        ];

        for config in configs {
            let err = ReputationClient::new(config).unwrap_err();
            assert!(matches!(err, ClientError::Config(ConfigError::Missing { .. })));
        }
    }

    #[test]
    fn test_base_url() {
        let client = client_for(&FakeService::new());
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8080/");
        assert_eq!(client.credentials().id(), "root");
        assert!(!format!("{:?}", client).contains("toor"));
    }

    #[tokio::test]
    async fn test_fetch_missing_ip() {
        let client = client_for(&FakeService::new());

        let result = client.fetch("127.0.0.1").await.unwrap();
        assert_eq!(result.status, 404);
        assert!(result.body.is_none());
    }

    #[tokio::test]
    async fn test_create_then_conflict() {
        let client = client_for(&FakeService::new());

        let first = client.create("127.0.0.1", 50).await.unwrap();
        assert_eq!(first.status, 201);

        let second = client.create("127.0.0.1", 50).await.unwrap();
        assert_eq!(second.status, 409);
        assert_eq!(second.body, Some(ResponseBody::Text(ALREADY_SET.to_string())));
    }

    #[tokio::test]
    async fn test_reputation_lifecycle() {
        let client = client_for(&FakeService::new());

        client.create("127.0.0.1", 50).await.unwrap();
        let fetched = client.fetch("127.0.0.1").await.unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(
            fetched.body,
            Some(ResponseBody::Json(
                serde_json::json!({"IP": "127.0.0.1", "Reputation": 50})
            ))
        );

        let updated = client.update("127.0.0.1", 5).await.unwrap();
        assert_eq!(updated.status, 200);
        assert!(updated.body.is_none());
        let entry: ReputationEntry = client
            .fetch("127.0.0.1")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert_eq!(entry.reputation, 5);

        let removed = client.remove("127.0.0.1").await.unwrap();
        assert_eq!(removed.status, 200);
        assert_eq!(client.fetch("127.0.0.1").await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_update_and_remove_pass_status_through() {
        let client = client_for(&FakeService::new());

        assert_eq!(client.update("10.0.0.1", 5).await.unwrap().status, 200);
        assert_eq!(client.remove("10.0.0.2").await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_record_violation() {
        let service = FakeService::new();
        let client = client_for(&service);

        let result = client
            .record_violation("127.0.0.1", "test_violation")
            .await
            .unwrap();
        assert_eq!(result.status, 200);

        let entry: ReputationEntry = client
            .fetch("127.0.0.1")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert_eq!(entry.reputation, 70);

        let unknown = client
            .record_violation("127.0.0.1", "unknown_violation")
            .await
            .unwrap();
        assert_eq!(unknown.status, 400);

        let sent = &service.seen()[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.url.path(), "/violations/127.0.0.1");
        assert_eq!(
            sent.body.as_deref(),
            Some(br#"{"ip":"127.0.0.1","Violation":"test_violation"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_every_request_is_signed_once() {
        let service = FakeService::new();
        let client = client_for(&service);

        client.fetch("127.0.0.1").await.unwrap();
        client.create("127.0.0.1", 50).await.unwrap();
        client.update("127.0.0.1", 5).await.unwrap();
        client.remove("127.0.0.1").await.unwrap();
        client.record_violation("127.0.0.1", "test_violation").await.unwrap();

        let seen = service.seen();
        assert_eq!(seen.len(), 5);
        for request in &seen {
            assert_eq!(
                request
                    .headers
                    .get_all(reqwest::header::AUTHORIZATION)
                    .iter()
                    .count(),
                1
            );
            assert!(service.authorized(request));
            assert_eq!(request.content_type().is_some(), request.body.is_some());
        }
    }

    #[tokio::test]
    async fn test_signatures_differ_between_calls() {
        let service = FakeService::new();
        let client = client_for(&service);

        client.fetch("127.0.0.1").await.unwrap();
        client.fetch("127.0.0.1").await.unwrap();

        let seen = service.seen();
        assert_ne!(seen[0].authorization(), seen[1].authorization());
    }

    #[tokio::test]
    async fn test_wrong_key_is_rejected_by_service() {
        let service = FakeService::new();
        let mut config = test_config();
        config.key = Some("wrong".to_string());
        let client = ReputationClient::with_transport(config, service.clone()).unwrap();

        assert_eq!(client.fetch("127.0.0.1").await.unwrap().status, 401);
        assert_eq!(client.create("127.0.0.1", 1).await.unwrap().status, 401);
    }

    #[tokio::test]
    async fn test_set_reputation_falls_back_to_update() {
        let service = FakeService::new();
        let client = client_for(&service);

        assert_eq!(client.ban("192.168.0.0/16").await.unwrap().status, 201);
        assert_eq!(client.unban("192.168.0.0/16").await.unwrap().status, 200);

        let methods: Vec<Method> = service.seen().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::POST, Method::POST, Method::PUT]);

        let entry: ReputationEntry = client
            .fetch("192.168.0.0/16")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert_eq!(entry.reputation, UNBANNED_REPUTATION);
        assert!(!entry.reviewed);
    }

    #[tokio::test]
    async fn test_ban_marks_entry_reviewed() {
        let service = FakeService::new();
        let client = client_for(&service);

        client.ban("10.0.0.1").await.unwrap();

        let sent = &service.seen()[0];
        assert_eq!(
            sent.body.as_deref(),
            Some(br#"{"ip":"10.0.0.1","reputation":0,"reviewed":true}"#.as_slice())
        );
        let entry: ReputationEntry = client
            .fetch("10.0.0.1")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert_eq!(entry.reputation, BANNED_REPUTATION);
        assert!(entry.reviewed);
    }

    #[tokio::test]
    async fn test_set_reviewed_keeps_reputation() {
        let service = FakeService::new();
        let client = client_for(&service);

        client.create("10.0.0.1", 42).await.unwrap();
        let result = client.set_reviewed("10.0.0.1", true).await.unwrap();
        assert_eq!(result.status, 200);

        let seen = service.seen();
        let put = seen.last().unwrap();
        assert_eq!(put.method, Method::PUT);
        assert_eq!(put.url.path(), "/10.0.0.1");
        assert_eq!(
            put.body.as_deref(),
            Some(br#"{"reputation":42,"reviewed":true}"#.as_slice())
        );

        let entry: ReputationEntry = client
            .fetch("10.0.0.1")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert_eq!(entry.reputation, 42);
        assert!(entry.reviewed);

        client.set_reviewed("10.0.0.1", false).await.unwrap();
        let entry: ReputationEntry = client
            .fetch("10.0.0.1")
            .await
            .unwrap()
            .parse()
            .unwrap()
            .unwrap();
        assert!(!entry.reviewed);
    }

    #[tokio::test]
    async fn test_set_reviewed_on_missing_entry() {
        let service = FakeService::new();
        let client = client_for(&service);

        let result = client.set_reviewed("10.0.0.9", true).await.unwrap();
        assert_eq!(result.status, 404);

        let methods: Vec<Method> = service.seen().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::GET]);
    }

    #[tokio::test]
    async fn test_exceptions() {
        let service = FakeService::new();
        let client = client_for(&service);

        let result = client.exceptions().await.unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(service.seen()[0].url.path(), "/exceptions");

        let exceptions: Vec<ExceptionEntry> = result.parse().unwrap().unwrap();
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].ip, "10.10.0.0/16");
        assert_eq!(exceptions[0].creator, "file:/etc/exceptions");
    }

    #[tokio::test]
    async fn test_service_routes() {
        let client = client_for(&FakeService::new());

        assert_eq!(client.heartbeat().await.unwrap().status, 200);
        assert_eq!(client.lb_heartbeat().await.unwrap().status, 200);

        let version = client.version().await.unwrap();
        assert_eq!(
            version.body.as_ref().and_then(|b| b.as_json()),
            Some(&serde_json::json!({"version": "test"}))
        );

        let violations = client.list_violations().await.unwrap();
        assert_eq!(
            violations.body.as_ref().and_then(|b| b.as_json()),
            Some(&serde_json::json!({"test_violation": 30}))
        );
    }

    #[tokio::test]
    async fn test_signing_failure_never_reaches_transport() {
        let service = FakeService::new();
        let mut config = test_config();
        config.id = Some("ro\not".to_string());
        let client = ReputationClient::with_transport(config, service.clone()).unwrap();

        let err = client.fetch("127.0.0.1").await.unwrap_err();
        assert!(matches!(err, ClientError::Signing(SigningError::InvalidHeader(_))));
        assert!(service.seen().is_empty());
    }

    #[tokio::test]
    async fn test_free_form_violation_names_are_sent() {
        let service = FakeService::new();
        let client = client_for(&service);

        let result = client
            .record_violation("127.0.0.1", "rate limit exceeded")
            .await
            .unwrap();
        assert_eq!(result.status, 400);
        assert_eq!(service.seen().len(), 1);

        assert!(matches!(
            client.record_violation("127.0.0.1", "").await,
            Err(ClientError::InvalidArgument { field: "violation_type", .. })
        ));
        assert_eq!(service.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_transport() {
        let service = FakeService::new();
        let client = client_for(&service);

        assert!(matches!(
            client.fetch("nope").await,
            Err(ClientError::InvalidArgument { field: "ip", .. })
        ));
        assert!(matches!(
            client.update("127.0.0.1", 150).await,
            Err(ClientError::InvalidArgument { field: "reputation", .. })
        ));
        assert!(service.seen().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_client() {
        let service = FakeService::new();
        let client = client_for(&service);

        let handles: Vec<_> = (1..=8u8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move { client.create(&format!("10.0.0.{}", i), i).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().status, 201);
        }
        assert_eq!(service.seen().len(), 8);
    }

    #[tokio::test]
    async fn test_unroutable_host_times_out() {
        let config = ClientConfig::new("10.255.255.1", 8080, "root", "toor").with_timeout_ms(1);
        let client = ReputationClient::new(config).unwrap();

        let started = Instant::now();
        let err = client.fetch("127.0.0.1").await.unwrap_err();
        assert!(err.as_transport().is_some());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
