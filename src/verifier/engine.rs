use crate::config::VerifierConfig;
use crate::contract::model_registry::{
    BodyPolicy, ContractRegistry, EndpointContract, HttpMethod, ResourceSchema, ScenarioClass,
};
use crate::contract::response_validator::{ResponseValidator, Violation, ViolationKind};
use crate::error::{Result, VerifierError};
use crate::protocol::request_executor::{ExecutionRequest, ExecutionResult, RequestExecutor};
use crate::protocol::transport::{HttpTransport, Transport};
use crate::utils::{HeaderUtils, JsonUtils};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What the caller wants verified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub resource: String,

    pub method: HttpMethod,

    #[serde(default = "default_scenario")]
    pub scenario: ScenarioClass,

    /// Path parameters keyed by placeholder name
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,

    #[serde(default)]
    pub query: Vec<(String, String)>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

fn default_scenario() -> ScenarioClass {
    ScenarioClass::Success
}

impl VerificationRequest {
    pub fn new<S: Into<String>>(resource: S, method: HttpMethod) -> Self {
        Self {
            resource: resource.into(),
            method,
            scenario: ScenarioClass::Success,
            parameters: BTreeMap::new(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get<S: Into<String>>(resource: S) -> Self {
        Self::new(resource, HttpMethod::Get)
    }

    pub fn post<S: Into<String>>(resource: S, body: Value) -> Self {
        Self::new(resource, HttpMethod::Post).with_body(body)
    }

    pub fn put<S: Into<String>>(resource: S, id: Value, body: Value) -> Self {
        Self::new(resource, HttpMethod::Put).with_id(id).with_body(body)
    }

    pub fn delete<S: Into<String>>(resource: S, id: Value) -> Self {
        Self::new(resource, HttpMethod::Delete).with_id(id)
    }

    pub fn with_id(self, id: Value) -> Self {
        self.with_param("id", id)
    }

    pub fn with_param<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn expecting(mut self, scenario: ScenarioClass) -> Self {
        self.scenario = scenario;
        self
    }
}

/// Result of one verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub passed: bool,
    pub violations: Vec<Violation>,
    /// Observed status, absent when the transport failed
    pub status: Option<u16>,
    pub elapsed_millis: Option<f64>,
}

impl VerificationOutcome {
    fn from_violations(violations: Vec<Violation>, status: Option<u16>, elapsed_millis: Option<f64>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
            status,
            elapsed_millis,
        }
    }

    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Equality ignoring timing
    pub fn same_result(&self, other: &VerificationOutcome) -> bool {
        self.passed == other.passed && self.status == other.status && self.violations == other.violations
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        if self.passed {
            write!(f, "PASS (status {})", status)
        } else {
            write!(f, "FAIL (status {}, {} violations)", status, self.violations.len())?;
            for violation in &self.violations {
                write!(f, "\n  {}", violation)?;
            }
            Ok(())
        }
    }
}

/// Runs resolve, build, execute, check and aggregate for one request at a time.
/// Holds no mutable state, so a shared instance can verify concurrently.
pub struct Verifier {
    registry: Arc<ContractRegistry>,
    executor: RequestExecutor,
    config: Arc<VerifierConfig>,
}

impl Verifier {
    pub fn new(registry: Arc<ContractRegistry>, transport: Arc<dyn Transport>, config: VerifierConfig) -> Result<Self> {
        config.validate()?;
        let executor = RequestExecutor::new(transport, config.base_url.clone());
        Ok(Self {
            registry,
            executor,
            config: Arc::new(config),
        })
    }

    /// Verifier over a real HTTP client
    pub fn with_http(registry: Arc<ContractRegistry>, config: VerifierConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::new(registry, transport, config)
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify one request against its contract.
    ///
    /// Authoring errors (unknown resource, missing path parameter, invalid
    /// header, a scenario the contract says nothing about) are returned as `Err`. Transport
    /// failures become a failing outcome with a single `transport` violation.
    pub async fn verify(&self, request: &VerificationRequest) -> Result<VerificationOutcome> {
        let contract = self.registry.resolve(&request.resource, request.method)?;
        let expected_status = contract.expected_status(request.scenario).ok_or_else(|| {
            VerifierError::UnsupportedScenario(request.resource.clone(), request.method, request.scenario)
        })?;
        let schema = match request.scenario {
            ScenarioClass::Success if request.method != HttpMethod::Delete => {
                Some(self.registry.schema_for(&request.resource)?)
            }
            _ => None,
        };

        let execution = self.build_request(&contract, request)?;
        let result = match self.executor.execute(&execution, self.config.default_timeout).await {
            Ok(result) => result,
            Err(VerifierError::Transport(e)) => {
                warn!("{} {} transport failure: {}", request.method, request.resource, e);
                let violation = Violation::new(
                    ViolationKind::Transport,
                    e.kind.as_str(),
                    Value::String("response".to_string()),
                    Value::String(e.message.clone()),
                );
                return Ok(VerificationOutcome::from_violations(vec![violation], None, None));
            }
            Err(e) => return Err(e),
        };

        let mut violations = Vec::new();
        Self::check_latency(&contract, &result, &mut violations);

        if result.status != expected_status {
            violations.push(Violation::new(
                ViolationKind::Status,
                "status",
                json!(expected_status),
                json!(result.status),
            ));
        } else if let Some(schema) = schema {
            Self::check_content_type(&contract, &result, &mut violations);
            self.check_body(&contract, &schema, request, &result, &mut violations);
        }

        let outcome = VerificationOutcome::from_violations(violations, Some(result.status), Some(result.elapsed_millis));
        info!(
            "{} {} [{}] {} in {:.1} ms",
            request.method,
            request.resource,
            request.scenario,
            if outcome.passed { "passed" } else { "failed" },
            result.elapsed_millis
        );
        Ok(outcome)
    }

    /// Verify several requests concurrently and wait for all of them
    pub async fn verify_all(&self, requests: &[VerificationRequest]) -> Vec<Result<VerificationOutcome>> {
        futures::future::join_all(requests.iter().map(|request| self.verify(request))).await
    }

    /// Turn a contract and request into a concrete call
    pub fn build_request(&self, contract: &EndpointContract, request: &VerificationRequest) -> Result<ExecutionRequest> {
        HeaderUtils::validate(&request.headers)?;
        let path = RequestExecutor::resolve_path(contract, &request.parameters)?;
        let mut execution = ExecutionRequest::new(request.method, path);
        execution.query = request.query.clone();

        for (name, value) in self.config.default_headers.iter().chain(request.headers.iter()) {
            execution = execution.with_header(name, value.clone());
        }

        match (&request.body, request.method.carries_body()) {
            (Some(body), true) => {
                execution = execution
                    .with_header("content-type", "application/json")
                    .with_body(body.clone());
            }
            (Some(_), false) => {
                warn!("Ignoring body supplied for {} {}", request.method, request.resource);
            }
            (None, _) => {}
        }

        debug!("Built request {} {}", execution.method, execution.path_and_query());
        Ok(execution)
    }

    fn check_latency(contract: &EndpointContract, result: &ExecutionResult, violations: &mut Vec<Violation>) {
        if let Some(max) = contract.max_elapsed_millis {
            if result.elapsed_millis > max as f64 {
                violations.push(Violation::new(
                    ViolationKind::Latency,
                    "elapsedMillis",
                    json!(max),
                    json!(result.elapsed_millis.round() as u64),
                ));
            }
        }
    }

    fn check_content_type(contract: &EndpointContract, result: &ExecutionResult, violations: &mut Vec<Violation>) {
        let Some(expected) = &contract.expected_content_type else {
            return;
        };
        let actual = result.header("content-type");
        let matches = actual
            .map(|value| value.to_ascii_lowercase().contains(&expected.to_ascii_lowercase()))
            .unwrap_or(false);
        if !matches {
            violations.push(Violation::new(
                ViolationKind::Header,
                "content-type",
                Value::String(expected.clone()),
                actual.map(|v| Value::String(v.to_string())).unwrap_or(Value::Null),
            ));
        }
    }

    fn check_body(
        &self,
        contract: &EndpointContract,
        schema: &Arc<ResourceSchema>,
        request: &VerificationRequest,
        result: &ExecutionResult,
        violations: &mut Vec<Violation>,
    ) {
        let validator = ResponseValidator::new(schema.clone())
            .with_omitted_fields(Self::omitted_fields(contract, schema, request));
        let body = result.body.as_ref().unwrap_or(&Value::Null);
        let (_, is_collection) = RequestExecutor::target_template(contract, &request.parameters);

        if is_collection {
            match body {
                Value::Array(items) => {
                    if contract.require_non_empty && items.is_empty() {
                        violations.push(Violation::new(
                            ViolationKind::Shape,
                            "body",
                            Value::String("non-empty array".to_string()),
                            Value::String("empty array".to_string()),
                        ));
                    }
                    validator.validate_collection(items, violations);
                }
                other => violations.push(Violation::new(
                    ViolationKind::Shape,
                    "body",
                    Value::String("array".to_string()),
                    Value::String(JsonUtils::type_name(other).to_string()),
                )),
            }
            return;
        }

        validator.validate_object(body, "", violations);
        let Value::Object(echoed) = body else {
            return;
        };

        if request.method == HttpMethod::Get {
            if let (Some(expected), Some(actual)) = (request.parameters.get("id"), echoed.get("id")) {
                if !Self::same_identifier(expected, actual) {
                    violations.push(Violation::new(ViolationKind::ValueMismatch, "id", expected.clone(), actual.clone()));
                }
            }
            return;
        }

        if let Some(Value::Object(submitted)) = &request.body {
            for (name, expected) in submitted {
                let actual = echoed.get(name).unwrap_or(&Value::Null);
                let field_type = schema.field(name).map(|field| field.r#type);
                if !JsonUtils::echo_equals(expected, actual, field_type) {
                    violations.push(Violation::new(
                        ViolationKind::ValueMismatch,
                        name.as_str(),
                        expected.clone(),
                        actual.clone(),
                    ));
                }
            }
        }
    }

    /// Schema fields the request left out, which may echo back as `null`
    fn omitted_fields(contract: &EndpointContract, schema: &ResourceSchema, request: &VerificationRequest) -> Vec<String> {
        if contract.body_policy_on_missing_fields != BodyPolicy::NullField || !request.method.carries_body() {
            return Vec::new();
        }
        let submitted = request.body.as_ref().and_then(Value::as_object);
        schema
            .fields()
            .iter()
            .filter(|field| submitted.map_or(true, |body| !body.contains_key(&field.name)))
            .map(|field| field.name.clone())
            .collect()
    }

    fn same_identifier(expected: &Value, actual: &Value) -> bool {
        if JsonUtils::echo_equals(expected, actual, None) {
            return true;
        }
        let render = |value: &Value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        render(expected) == render(actual)
    }
}
