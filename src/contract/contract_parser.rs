use crate::contract::model_registry::{ContractRegistry, EndpointContract, ResourceSchema};
use crate::error::{Result, VerifierError};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Serialized form of a contract set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractDocument {
    pub version: String,

    #[serde(default)]
    pub resources: Vec<ResourceSchema>,

    #[serde(default)]
    pub endpoints: Vec<EndpointContract>,
}

impl ContractDocument {
    pub fn new<S: Into<String>>(version: S) -> Self {
        Self {
            version: version.into(),
            resources: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Load every schema and endpoint into a fresh registry
    pub fn into_registry(self) -> ContractRegistry {
        let mut registry = ContractRegistry::new();
        for schema in self.resources {
            registry.register(schema);
        }
        for endpoint in self.endpoints {
            registry.register_endpoint(endpoint);
        }
        registry
    }
}

/// Contract document parser for JSON and YAML formats
pub struct ContractParser;

impl ContractParser {
    /// Parse and validate a contract document from JSON
    pub fn from_json(json_str: &str) -> Result<ContractDocument> {
        Self::from_json_with_context(json_str, None)
    }

    pub fn from_json_with_context(json_str: &str, file_path: Option<&str>) -> Result<ContractDocument> {
        let context = file_path.map(|p| format!(" (file: {})", p)).unwrap_or_default();
        debug!("Parsing contract document from JSON{} ({} bytes)", context, json_str.len());

        if json_str.trim().is_empty() {
            error!("Contract JSON is empty{}", context);
            return Err(VerifierError::Parse(format!("JSON input is empty{}", context)));
        }

        let document: ContractDocument = serde_json::from_str(json_str).map_err(|e| {
            error!("Failed to parse contract JSON{}: {}", context, e);
            match e.classify() {
                serde_json::error::Category::Syntax => VerifierError::Parse(format!(
                    "syntax error{} at line {}, column {}: {}",
                    context,
                    e.line(),
                    e.column(),
                    e
                )),
                _ => VerifierError::Parse(format!("invalid contract document{}: {}", context, e)),
            }
        })?;

        Self::validate(&document)?;
        info!(
            "Loaded contract document v{}{}: {} resources, {} endpoints",
            document.version,
            context,
            document.resources.len(),
            document.endpoints.len()
        );
        Ok(document)
    }

    /// Parse and validate a contract document from YAML
    #[cfg(feature = "yaml-support")]
    pub fn from_yaml(yaml_str: &str) -> Result<ContractDocument> {
        if yaml_str.trim().is_empty() {
            return Err(VerifierError::Parse("YAML input is empty".to_string()));
        }
        let document: ContractDocument = serde_yaml::from_str(yaml_str)?;
        Self::validate(&document)?;
        Ok(document)
    }

    /// Load a contract document, picking the format from the file extension
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ContractDocument> {
        let path = path.as_ref();
        let display = path.display().to_string();
        debug!("Reading contract document from {}", display);
        let content = fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            #[cfg(feature = "yaml-support")]
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            #[cfg(not(feature = "yaml-support"))]
            Some("yaml") | Some("yml") => Err(VerifierError::Parse(format!(
                "{} is YAML but the yaml-support feature is disabled",
                display
            ))),
            _ => Self::from_json_with_context(&content, Some(&display)),
        }
    }

    pub fn to_json(document: &ContractDocument) -> Result<String> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    /// Check the structural rules serde cannot express
    pub fn validate(document: &ContractDocument) -> Result<()> {
        if document.version.trim().is_empty() {
            return Err(VerifierError::Parse("document version is empty".to_string()));
        }

        let mut resource_names = HashSet::new();
        for schema in &document.resources {
            if schema.resource_name.trim().is_empty() {
                return Err(VerifierError::Parse("resource with empty name".to_string()));
            }
            if let Some(field) = schema.duplicate_field() {
                return Err(VerifierError::Parse(format!(
                    "duplicate field '{}' in schema '{}'",
                    field, schema.resource_name
                )));
            }
            resource_names.insert(schema.resource_name.as_str());
        }

        for endpoint in &document.endpoints {
            let label = format!("{} {}", endpoint.method, endpoint.resource_name);
            if !resource_names.contains(endpoint.resource_name.as_str()) {
                return Err(VerifierError::Parse(format!("endpoint {} references an unknown resource", label)));
            }
            if !endpoint.path_template.starts_with('/') {
                return Err(VerifierError::Parse(format!(
                    "endpoint {} path template '{}' must start with '/'",
                    label, endpoint.path_template
                )));
            }
            let statuses = [
                Some(endpoint.expected_status_on_success),
                Some(endpoint.expected_status_on_validation_failure),
                endpoint.expected_status_on_missing_resource,
            ];
            if let Some(status) = statuses.into_iter().flatten().find(|s| !(100..=599).contains(s)) {
                return Err(VerifierError::Parse(format!(
                    "endpoint {} has invalid status code {}",
                    label, status
                )));
            }
        }

        Ok(())
    }
}
