//! # Contract Verifier
//!
//! Declarative HTTP API contract verification. Resources and endpoints are
//! described as data; each verification issues one request and reports every
//! discrepancy between the contract and the response.
//!
//! ## Features
//!
//! - **Contract Registry**: resource schemas and per-endpoint expectations
//! - **Structural Validation**: field presence, type and nullability checks
//! - **Accumulated Violations**: every mismatch reported in one pass
//! - **Pluggable Transport**: reqwest by default, any `Transport` in tests
//! - **Concurrent Suites**: bounded fan-out with ordered reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_verifier::{fake_rest_api_registry, Verifier, VerifierConfig, VerificationRequest};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(fake_rest_api_registry());
//!     let verifier = Verifier::with_http(registry, VerifierConfig::default())?;
//!
//!     let outcome = verifier
//!         .verify(&VerificationRequest::get("Books").with_id(json!(1)))
//!         .await?;
//!
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```

pub mod contract;
pub mod protocol;
pub mod verifier;
pub mod config;
pub mod error;
pub mod utils;

// Contract exports (schemas, endpoints, validation)
pub use contract::{
    ContractRegistry, ResourceSchema, FieldSpec, FieldType, EndpointContract,
    HttpMethod, BodyPolicy, ScenarioClass, ContractParser, ContractDocument,
    ResponseValidator, Violation, ViolationKind,
    fake_rest_api_registry, fake_rest_api_suite,
};

// Protocol exports (transport and single-call execution)
pub use protocol::{
    Transport, TransportResponse, HttpTransport,
    RequestExecutor, ExecutionRequest, ExecutionResult,
};

// Verification exports
pub use verifier::{
    Verifier, VerificationRequest, VerificationOutcome,
    SuiteRunner, SuiteCase, SuiteReport, CaseReport, CaseResult,
};

// Configuration exports
pub use config::VerifierConfig;

// Error exports
pub use error::{VerifierError, TransportError, TransportErrorKind, Result};

// Re-export common dependencies for convenience
pub use serde_json::{Value as JsonValue, json};

/// Prelude module for convenient importing
pub mod prelude {
    pub use crate::{
        ContractRegistry, ResourceSchema, FieldSpec, FieldType, EndpointContract,
        HttpMethod, BodyPolicy, ScenarioClass,
        Verifier, VerificationRequest, VerificationOutcome, Violation, ViolationKind,
        SuiteRunner, SuiteCase, SuiteReport,
        Transport, TransportResponse, VerifierConfig,
        VerifierError, TransportError, Result,
        JsonValue, json,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "contract-verifier");
    }
}
