use contract_verifier::*;
use std::io::Write;

/// Contract Parser Tests - JSON documents, structural validation and file loading

const BOOKS_DOCUMENT: &str = r#"{
  "version": "1.0.0",
  "resources": [
    {
      "resourceName": "Books",
      "fields": [
        {"name": "id", "type": "number"},
        {"name": "title", "type": "string"},
        {"name": "publishDate", "type": "date-string", "nullable": true},
        {"name": "excerpt", "type": "string", "required": false}
      ]
    }
  ],
  "endpoints": [
    {
      "resourceName": "Books",
      "method": "GET",
      "pathTemplate": "/api/v1/Books/{id}",
      "expectedStatusOnMissingResource": 404,
      "expectedContentType": "application/json",
      "requireNonEmpty": true
    },
    {
      "resourceName": "Books",
      "method": "POST",
      "pathTemplate": "/api/v1/Books",
      "bodyPolicyOnMissingFields": "reject"
    }
  ]
}"#;

#[test]
fn test_parse_json_document() {
    let document = ContractParser::from_json(BOOKS_DOCUMENT).unwrap();
    assert_eq!(document.version, "1.0.0");
    assert_eq!(document.resources.len(), 1);
    assert_eq!(document.endpoints.len(), 2);

    let fields = document.resources[0].fields();
    assert!(fields[0].required && !fields[0].nullable);
    assert!(fields[2].nullable);
    assert!(!fields[3].required);

    let get = &document.endpoints[0];
    assert_eq!(get.expected_status_on_success, 200);
    assert_eq!(get.expected_status_on_validation_failure, 400);
    assert_eq!(get.expected_status_on_missing_resource, Some(404));
    assert!(get.require_non_empty);
    assert_eq!(document.endpoints[1].body_policy_on_missing_fields, BodyPolicy::Reject);
}

#[test]
fn test_document_into_registry() {
    let registry = ContractParser::from_json(BOOKS_DOCUMENT).unwrap().into_registry();
    assert!(registry.schema_for("Books").is_ok());
    assert!(registry.resolve("Books", HttpMethod::Post).is_ok());
    assert!(registry.resolve("Books", HttpMethod::Delete).is_err());
}

#[test]
fn test_serialized_document_parses_back() {
    let document = ContractParser::from_json(BOOKS_DOCUMENT).unwrap();
    let json = ContractParser::to_json(&document).unwrap();
    assert_eq!(ContractParser::from_json(&json).unwrap(), document);
}

#[test]
fn test_rejects_empty_and_malformed_input() {
    assert!(matches!(ContractParser::from_json("   "), Err(VerifierError::Parse(_))));
    assert!(matches!(
        ContractParser::from_json(r#"{"version": "1", "resources": [}"#),
        Err(VerifierError::Parse(msg)) if msg.contains("line")
    ));
    assert!(ContractParser::from_json(r#"{"resources": []}"#).is_err());
}

#[test]
fn test_rejects_duplicate_fields() {
    let doc = r#"{"version": "1", "resources": [{"resourceName": "Users", "fields": [
        {"name": "id", "type": "number"}, {"name": "id", "type": "string"}]}]}"#;
    let err = ContractParser::from_json(doc).unwrap_err();
    assert!(err.to_string().contains("duplicate field 'id'"));
}

#[test]
fn test_rejects_unknown_field_type_and_method() {
    let bad_type = r#"{"version": "1", "resources": [{"resourceName": "Users", "fields": [
        {"name": "id", "type": "uuid"}]}]}"#;
    assert!(ContractParser::from_json(bad_type).is_err());

    let bad_method = r#"{"version": "1", "resources": [{"resourceName": "Users"}],
        "endpoints": [{"resourceName": "Users", "method": "PATCH", "pathTemplate": "/u"}]}"#;
    assert!(ContractParser::from_json(bad_method).is_err());
}

#[test]
fn test_rejects_endpoint_problems() {
    let unknown_resource = r#"{"version": "1",
        "endpoints": [{"resourceName": "Users", "method": "GET", "pathTemplate": "/u"}]}"#;
    assert!(ContractParser::from_json(unknown_resource)
        .unwrap_err()
        .to_string()
        .contains("unknown resource"));

    let relative_path = r#"{"version": "1", "resources": [{"resourceName": "Users"}],
        "endpoints": [{"resourceName": "Users", "method": "GET", "pathTemplate": "u/{id}"}]}"#;
    assert!(ContractParser::from_json(relative_path).is_err());

    let bad_status = r#"{"version": "1", "resources": [{"resourceName": "Users"}],
        "endpoints": [{"resourceName": "Users", "method": "GET", "pathTemplate": "/u",
        "expectedStatusOnSuccess": 999}]}"#;
    assert!(ContractParser::from_json(bad_status)
        .unwrap_err()
        .to_string()
        .contains("999"));
}

#[tokio::test]
async fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(BOOKS_DOCUMENT.as_bytes()).unwrap();

    let document = ContractParser::from_file(file.path()).await.unwrap();
    assert_eq!(document.resources[0].resource_name, "Books");
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContractParser::from_file(dir.path().join("absent.json")).await.unwrap_err();
    assert!(matches!(err, VerifierError::Io(_)));
}

#[cfg(feature = "yaml-support")]
#[test]
fn test_parse_yaml_document() {
    let yaml = r#"
version: "1.0.0"
resources:
  - resourceName: Users
    fields:
      - { name: id, type: number }
      - { name: userName, type: string }
endpoints:
  - { resourceName: Users, method: DELETE, pathTemplate: "/api/v1/Users/{id}" }
"#;
    let document = ContractParser::from_yaml(yaml).unwrap();
    assert_eq!(document.endpoints[0].method, HttpMethod::Delete);
}
