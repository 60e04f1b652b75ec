/*!
 * Structural validation of response bodies against resource schemas
 */

use crate::contract::model_registry::{FieldSpec, ResourceSchema};
use crate::utils::JsonUtils;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Category of a detected mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    Transport,
    Status,
    Field,
    ValueMismatch,
    Shape,
    Header,
    Latency,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Transport => "transport",
            ViolationKind::Status => "status",
            ViolationKind::Field => "field",
            ViolationKind::ValueMismatch => "value-mismatch",
            ViolationKind::Shape => "shape",
            ViolationKind::Header => "header",
            ViolationKind::Latency => "latency",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mismatch between the contract and the observed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,

    /// Field path (`title`, `[3].id`) or rule name (`status`, `content-type`)
    pub rule: String,

    pub expected: Value,

    pub actual: Value,
}

impl Violation {
    pub fn new<S: Into<String>>(kind: ViolationKind, rule: S, expected: Value, actual: Value) -> Self {
        Self {
            kind,
            rule: rule.into(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: expected {}, actual {}",
            self.kind, self.rule, self.expected, self.actual
        )
    }
}

/// Validates JSON objects against a resource schema.
///
/// `omitted` names the fields the request deliberately left out; those may
/// come back as `null` even when the schema declares them non-nullable.
pub struct ResponseValidator {
    schema: Arc<ResourceSchema>,
    omitted: BTreeSet<String>,
}

impl ResponseValidator {
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            omitted: BTreeSet::new(),
        }
    }

    pub fn with_omitted_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omitted.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Validate a single object. Extra fields not in the schema are ignored.
    pub fn validate_object(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        match value {
            Value::Object(object) => {
                for field in self.schema.fields() {
                    self.validate_field(object, field, path, violations);
                }
            }
            other => violations.push(Violation::new(
                ViolationKind::Shape,
                if path.is_empty() { "body" } else { path },
                Value::String("object".to_string()),
                Value::String(JsonUtils::type_name(other).to_string()),
            )),
        }
    }

    /// Validate every element of a collection body
    pub fn validate_collection(&self, items: &[Value], violations: &mut Vec<Violation>) {
        for (index, item) in items.iter().enumerate() {
            self.validate_object(item, &format!("[{}]", index), violations);
        }
    }

    fn validate_field(&self, object: &Map<String, Value>, field: &FieldSpec, path: &str, violations: &mut Vec<Violation>) {
        let field_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", path, field.name)
        };

        match object.get(&field.name) {
            None => {
                if field.required {
                    violations.push(Violation::new(
                        ViolationKind::Field,
                        field_path,
                        Value::String(field.r#type.to_string()),
                        Value::String("missing".to_string()),
                    ));
                }
            }
            Some(Value::Null) => {
                if !field.nullable && !self.omitted.contains(&field.name) {
                    violations.push(Violation::new(
                        ViolationKind::Field,
                        field_path,
                        Value::String(field.r#type.to_string()),
                        Value::Null,
                    ));
                }
            }
            Some(value) => {
                if !JsonUtils::matches_type(value, field.r#type) {
                    let actual = if value.is_string() {
                        value.clone()
                    } else {
                        Value::String(JsonUtils::type_name(value).to_string())
                    };
                    violations.push(Violation::new(
                        ViolationKind::Field,
                        field_path,
                        Value::String(field.r#type.to_string()),
                        actual,
                    ));
                }
            }
        }
    }
}
