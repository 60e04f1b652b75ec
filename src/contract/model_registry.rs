use crate::error::{Result, VerifierError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Structural type of a resource field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Number,
    String,
    Boolean,
    /// A string that must parse as a calendar date or timestamp
    DateString,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::DateString => "date-string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field definition within a resource schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub name: String,

    pub r#type: FieldType,

    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default)]
    pub nullable: bool,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    /// Create a required, non-nullable field
    pub fn new<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            r#type: field_type,
            required: true,
            nullable: false,
        }
    }

    pub fn number<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn string<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn boolean<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn date<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::DateString)
    }

    /// Mark the field as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Allow an explicit `null` value
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Declarative description of a resource's fields.
///
/// Field names are unique; `with_field` replaces a same-named field in place
/// so the declared order is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    pub resource_name: String,

    #[serde(default)]
    fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    pub fn new<S: Into<String>>(resource_name: S) -> Self {
        Self {
            resource_name: resource_name.into(),
            fields: Vec::new(),
        }
    }

    /// Build a schema from a field list, rejecting duplicate names
    pub fn try_from_fields<S: Into<String>>(resource_name: S, fields: Vec<FieldSpec>) -> Result<Self> {
        let schema = Self {
            resource_name: resource_name.into(),
            fields,
        };
        if let Some(name) = schema.duplicate_field() {
            return Err(VerifierError::Parse(format!(
                "duplicate field '{}' in schema '{}'",
                name, schema.resource_name
            )));
        }
        Ok(schema)
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }

    /// First field name that appears more than once, if any
    pub fn duplicate_field(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(index, field)| {
            self.fields[..index]
                .iter()
                .any(|earlier| earlier.name == field.name)
                .then_some(field.name.as_str())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Methods whose success response echoes the submitted body
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = VerifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(VerifierError::Parse(format!("unsupported HTTP method '{}'", other))),
        }
    }
}

/// How the API treats fields the request left out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPolicy {
    /// Omitted fields are echoed back as `null`
    NullField,
    /// Omitted fields must still come back well-typed
    Reject,
}

impl Default for BodyPolicy {
    fn default() -> Self {
        BodyPolicy::NullField
    }
}

/// The outcome class a caller expects from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioClass {
    Success,
    ValidationFailure,
    MissingResource,
}

impl fmt::Display for ScenarioClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenarioClass::Success => "success",
            ScenarioClass::ValidationFailure => "validation-failure",
            ScenarioClass::MissingResource => "missing-resource",
        })
    }
}

/// Expected behavior of one (resource, method) endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointContract {
    pub resource_name: String,

    pub method: HttpMethod,

    /// Path with `{name}` placeholders, e.g. `/api/v1/Books/{id}`
    pub path_template: String,

    #[serde(default = "default_success_status")]
    pub expected_status_on_success: u16,

    #[serde(default = "default_validation_status")]
    pub expected_status_on_validation_failure: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status_on_missing_resource: Option<u16>,

    #[serde(default)]
    pub body_policy_on_missing_fields: BodyPolicy,

    /// Substring the `content-type` header must contain on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_content_type: Option<String>,

    /// A collection GET must return at least one element
    #[serde(default)]
    pub require_non_empty: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elapsed_millis: Option<u64>,
}

fn default_success_status() -> u16 {
    200
}

fn default_validation_status() -> u16 {
    400
}

impl EndpointContract {
    pub fn new<S: Into<String>, P: Into<String>>(resource_name: S, method: HttpMethod, path_template: P) -> Self {
        Self {
            resource_name: resource_name.into(),
            method,
            path_template: path_template.into(),
            expected_status_on_success: default_success_status(),
            expected_status_on_validation_failure: default_validation_status(),
            expected_status_on_missing_resource: None,
            body_policy_on_missing_fields: BodyPolicy::default(),
            expected_content_type: None,
            require_non_empty: false,
            max_elapsed_millis: None,
        }
    }

    pub fn with_success_status(mut self, status: u16) -> Self {
        self.expected_status_on_success = status;
        self
    }

    pub fn with_validation_failure_status(mut self, status: u16) -> Self {
        self.expected_status_on_validation_failure = status;
        self
    }

    pub fn with_missing_resource_status(mut self, status: u16) -> Self {
        self.expected_status_on_missing_resource = Some(status);
        self
    }

    pub fn with_body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy_on_missing_fields = policy;
        self
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.expected_content_type = Some(content_type.into());
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.require_non_empty = true;
        self
    }

    pub fn with_max_elapsed_millis(mut self, millis: u64) -> Self {
        self.max_elapsed_millis = Some(millis);
        self
    }

    /// Expected status for a scenario class, `None` when the contract
    /// makes no claim about it
    pub fn expected_status(&self, scenario: ScenarioClass) -> Option<u16> {
        match scenario {
            ScenarioClass::Success => Some(self.expected_status_on_success),
            ScenarioClass::ValidationFailure => Some(self.expected_status_on_validation_failure),
            ScenarioClass::MissingResource => self.expected_status_on_missing_resource,
        }
    }
}

/// Store of resource schemas and endpoint contracts.
///
/// Entries are handed out as `Arc`s; a registered schema is never mutated,
/// re-registering under the same key swaps in a new one.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    schemas: HashMap<String, Arc<ResourceSchema>>,
    endpoints: HashMap<(String, HttpMethod), Arc<EndpointContract>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a schema by resource name
    pub fn register(&mut self, schema: ResourceSchema) {
        debug!("Registering schema '{}' ({} fields)", schema.resource_name, schema.fields().len());
        self.schemas.insert(schema.resource_name.clone(), Arc::new(schema));
    }

    /// Insert or replace an endpoint contract by (resource, method)
    pub fn register_endpoint(&mut self, contract: EndpointContract) {
        debug!(
            "Registering endpoint {} {} -> {}",
            contract.method, contract.resource_name, contract.path_template
        );
        let key = (contract.resource_name.clone(), contract.method);
        self.endpoints.insert(key, Arc::new(contract));
    }

    pub fn resolve(&self, resource_name: &str, method: HttpMethod) -> Result<Arc<EndpointContract>> {
        self.endpoints
            .get(&(resource_name.to_string(), method))
            .cloned()
            .ok_or_else(|| VerifierError::EndpointNotFound(resource_name.to_string(), method))
    }

    pub fn schema_for(&self, resource_name: &str) -> Result<Arc<ResourceSchema>> {
        self.schemas
            .get(resource_name)
            .cloned()
            .ok_or_else(|| VerifierError::SchemaNotFound(resource_name.to_string()))
    }

    /// Registered resource names, sorted
    pub fn resources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn endpoints_for(&self, resource_name: &str) -> Vec<Arc<EndpointContract>> {
        let mut contracts: Vec<Arc<EndpointContract>> = self
            .endpoints
            .iter()
            .filter(|((name, _), _)| name == resource_name)
            .map(|(_, contract)| contract.clone())
            .collect();
        contracts.sort_by_key(|contract| contract.method.as_str());
        contracts
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.endpoints.is_empty()
    }
}
