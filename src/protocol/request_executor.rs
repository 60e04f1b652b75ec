use crate::contract::model_registry::{EndpointContract, HttpMethod};
use crate::error::{Result, TransportError, VerifierError};
use crate::protocol::transport::Transport;
use crate::utils::PathUtils;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A fully resolved HTTP call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub method: HttpMethod,
    pub resolved_path: String,
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// Header names are stored lowercase
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ExecutionRequest {
    pub fn new<S: Into<String>>(method: HttpMethod, resolved_path: S) -> Self {
        Self {
            method,
            resolved_path: resolved_path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path plus encoded query string
    pub fn path_and_query(&self) -> String {
        PathUtils::append_query(&self.resolved_path, &self.query)
    }
}

/// Captured response of one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: u16,
    /// Lowercase header name to value; repeated headers are comma-joined
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub elapsed_millis: f64,
}

impl ExecutionResult {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Performs exactly one HTTP call per `execute`; never retries
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl RequestExecutor {
    pub fn new<S: Into<String>>(transport: Arc<dyn Transport>, base_url: S) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Template a request actually addresses, and whether that is a
    /// collection. A GET that leaves the trailing `/{name}` placeholder
    /// unset drops that segment; any GET whose final template does not end
    /// in a placeholder targets a collection.
    pub fn target_template<'a>(contract: &'a EndpointContract, params: &BTreeMap<String, Value>) -> (&'a str, bool) {
        let template = contract.path_template.as_str();
        if contract.method != HttpMethod::Get {
            return (template, false);
        }
        let template = match PathUtils::trailing_placeholder(template) {
            Some(name) if !params.contains_key(name) => {
                PathUtils::collection_template(template, name).unwrap_or(template)
            }
            _ => template,
        };
        (template, PathUtils::trailing_placeholder(template).is_none())
    }

    /// Resolve a contract's path template against the request parameters
    pub fn resolve_path(contract: &EndpointContract, params: &BTreeMap<String, Value>) -> Result<String> {
        let (template, _) = Self::target_template(contract, params);
        PathUtils::resolve_template(template, params)
    }

    pub async fn execute(&self, request: &ExecutionRequest, timeout: Duration) -> Result<ExecutionResult> {
        if timeout.is_zero() {
            return Err(VerifierError::InvalidTimeout);
        }

        let url = PathUtils::join_url(&self.base_url, &request.path_and_query());
        debug!("Executing {} {} (timeout {:?})", request.method, url, timeout);

        let started = Instant::now();
        let sent = tokio::time::timeout(
            timeout,
            self.transport
                .send(request.method, &url, &request.headers, request.body.as_ref()),
        )
        .await;
        let elapsed_millis = started.elapsed().as_secs_f64() * 1000.0;

        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("{} {} failed after {:.1} ms: {}", request.method, url, elapsed_millis, e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("{} {} timed out after {:?}", request.method, url, timeout);
                return Err(TransportError::timeout(timeout.as_millis() as u64).into());
            }
        };

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers {
            headers
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = Self::decode_body(&response.body);
        debug!(
            "{} {} -> {} in {:.1} ms",
            request.method, url, response.status, elapsed_millis
        );

        Ok(ExecutionResult {
            status: response.status,
            headers,
            body,
            elapsed_millis,
        })
    }

    fn decode_body(bytes: &[u8]) -> Option<Value> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Response body is not JSON ({} bytes): {}", bytes.len(), e);
                None
            }
        }
    }
}
