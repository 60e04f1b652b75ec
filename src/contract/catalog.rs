//! Built-in contracts for the Fake REST API demo service.
//!
//! Resources are table rows: adding one means adding a row, not code. The
//! service's quirks (PUT on an unknown id answers 200, DELETE of an unknown
//! id answers 200) are kept as per-contract expectations.

use crate::contract::model_registry::{
    BodyPolicy, ContractRegistry, EndpointContract, FieldSpec, FieldType, HttpMethod, ResourceSchema,
    ScenarioClass,
};
use crate::verifier::engine::VerificationRequest;
use crate::verifier::suite::SuiteCase;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

pub const API_PREFIX: &str = "/api/v1";

/// Latency budget the collection endpoints are held to
pub const MAX_ELAPSED_MILLIS: u64 = 2000;

const RESOURCES: &[(&str, &[(&str, FieldType)])] = &[
    (
        "Activities",
        &[("id", FieldType::Number), ("title", FieldType::String), ("completed", FieldType::Boolean)],
    ),
    (
        "Authors",
        &[
            ("id", FieldType::Number),
            ("idBook", FieldType::Number),
            ("firstName", FieldType::String),
            ("lastName", FieldType::String),
        ],
    ),
    (
        "Books",
        &[
            ("id", FieldType::Number),
            ("title", FieldType::String),
            ("description", FieldType::String),
            ("pageCount", FieldType::Number),
            ("excerpt", FieldType::String),
            ("publishDate", FieldType::DateString),
        ],
    ),
    (
        "CoverPhotos",
        &[("id", FieldType::Number), ("idBook", FieldType::Number), ("url", FieldType::String)],
    ),
    (
        "Users",
        &[("id", FieldType::Number), ("userName", FieldType::String), ("password", FieldType::String)],
    ),
];

/// Registry with every Fake REST API resource and its four endpoints
pub fn fake_rest_api_registry() -> ContractRegistry {
    let mut registry = ContractRegistry::new();

    for (name, fields) in RESOURCES {
        let schema = fields
            .iter()
            .fold(ResourceSchema::new(*name), |schema, (field, field_type)| {
                schema.with_field(FieldSpec::new(*field, *field_type))
            });
        registry.register(schema);

        let collection = format!("{}/{}", API_PREFIX, name);
        let item = format!("{}/{{id}}", collection);

        registry.register_endpoint(
            EndpointContract::new(*name, HttpMethod::Get, item.as_str())
                .with_missing_resource_status(404)
                .with_content_type("application/json")
                .with_max_elapsed_millis(MAX_ELAPSED_MILLIS)
                .non_empty(),
        );
        registry.register_endpoint(
            EndpointContract::new(*name, HttpMethod::Post, collection.as_str())
                .with_body_policy(BodyPolicy::NullField)
                .with_content_type("application/json"),
        );
        registry.register_endpoint(
            EndpointContract::new(*name, HttpMethod::Put, item.as_str())
                .with_missing_resource_status(200)
                .with_body_policy(BodyPolicy::NullField)
                .with_content_type("application/json"),
        );
        registry.register_endpoint(
            EndpointContract::new(*name, HttpMethod::Delete, item.as_str()).with_missing_resource_status(200),
        );
    }

    registry
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The end-to-end checks run against the live service
pub fn fake_rest_api_suite() -> Vec<SuiteCase> {
    let mut cases = Vec::new();

    for (name, _) in RESOURCES {
        cases.push(SuiteCase::new(
            format!("GET {} list", name),
            VerificationRequest::get(*name),
        ));
        cases.push(SuiteCase::new(
            format!("GET {} by id", name),
            VerificationRequest::get(*name).with_id(json!(1)),
        ));
    }

    cases.extend([
        SuiteCase::new(
            "GET Authors filtered by book",
            VerificationRequest::get("Authors").with_query("idBook", "1"),
        ),
        SuiteCase::new(
            "GET Authors ignores unknown query",
            VerificationRequest::get("Authors").with_query("invalid", "true"),
        ),
        SuiteCase::new(
            "GET Authors with custom headers",
            VerificationRequest::get("Authors")
                .with_header("Accept-Language", "en-US")
                .with_header("X-Custom-Header", "Test@123!"),
        ),
        SuiteCase::new(
            "GET Users unknown id",
            VerificationRequest::get("Users")
                .with_id(json!(999999))
                .expecting(ScenarioClass::MissingResource),
        ),
    ]);
    for round in 1..=3 {
        cases.push(SuiteCase::new(
            format!("GET Authors concurrent #{}", round),
            VerificationRequest::get("Authors"),
        ));
    }

    cases.extend([
        SuiteCase::new(
            "POST Books valid",
            VerificationRequest::post(
                "Books",
                json!({
                    "id": 0,
                    "title": "New Test Book",
                    "description": "Test Description",
                    "pageCount": 100,
                    "excerpt": "Test Excerpt",
                    "publishDate": now_iso(),
                }),
            ),
        ),
        SuiteCase::new(
            "POST Books missing fields",
            VerificationRequest::post("Books", json!({"id": 0, "pageCount": 100})),
        ),
        SuiteCase::new(
            "POST Books wrong types",
            VerificationRequest::post(
                "Books",
                json!({
                    "id": "invalid",
                    "title": 123,
                    "description": 456,
                    "pageCount": "not-a-number",
                    "excerpt": 789,
                    "publishDate": "invalid-date",
                }),
            )
            .expecting(ScenarioClass::ValidationFailure),
        ),
        SuiteCase::new(
            "PUT Books existing",
            VerificationRequest::put(
                "Books",
                json!(1),
                json!({
                    "id": 1,
                    "title": "Updated Book",
                    "description": "Updated Description",
                    "pageCount": 200,
                    "excerpt": "Updated Excerpt",
                    "publishDate": now_iso(),
                }),
            ),
        ),
        SuiteCase::new(
            "PUT Books unknown id",
            VerificationRequest::put(
                "Books",
                json!(999999),
                json!({
                    "id": 999999,
                    "title": "Updated Book",
                    "description": "Updated Description",
                    "pageCount": 200,
                    "excerpt": "Updated Excerpt",
                    "publishDate": now_iso(),
                }),
            )
            .expecting(ScenarioClass::MissingResource),
        ),
        SuiteCase::new(
            "POST CoverPhotos valid",
            VerificationRequest::post(
                "CoverPhotos",
                json!({"id": 0, "idBook": 1, "url": "https://example.com/cover.jpg"}),
            ),
        ),
        SuiteCase::new(
            "POST CoverPhotos unvalidated url",
            VerificationRequest::post("CoverPhotos", json!({"id": 0, "idBook": 1, "url": "invalid-url"})),
        ),
        SuiteCase::new(
            "PUT CoverPhotos existing",
            VerificationRequest::put(
                "CoverPhotos",
                json!(1),
                json!({"id": 1, "idBook": 2, "url": "https://example.com/updated-cover.jpg"}),
            ),
        ),
        SuiteCase::new(
            "POST Users valid",
            VerificationRequest::post("Users", json!({"id": 0, "userName": "testuser", "password": "testpass123"})),
        ),
        SuiteCase::new(
            "POST Users missing fields",
            VerificationRequest::post("Users", json!({"id": 0})),
        ),
        SuiteCase::new(
            "POST Users simple password",
            VerificationRequest::post("Users", json!({"id": 0, "userName": "testuser", "password": "123"})),
        ),
        SuiteCase::new(
            "PUT Users existing",
            VerificationRequest::put(
                "Users",
                json!(1),
                json!({"id": 1, "userName": "updateduser", "password": "updatedpass123"}),
            ),
        ),
    ]);

    for name in ["Books", "CoverPhotos", "Users"] {
        cases.push(SuiteCase::new(
            format!("DELETE {} existing", name),
            VerificationRequest::delete(name, json!(1)),
        ));
        cases.push(SuiteCase::new(
            format!("DELETE {} malformed id", name),
            VerificationRequest::delete(name, json!("invalid-id")).expecting(ScenarioClass::ValidationFailure),
        ));
    }

    cases
}
