use crate::contract::model_registry::{HttpMethod, ScenarioClass};
use crate::error::transport_error::TransportError;
use thiserror::Error;

/// Errors raised by the verification engine.
///
/// Everything except `Transport` is an authoring or setup problem: the suite
/// itself is misconfigured and the verification is aborted. `Transport` is
/// folded into a failing outcome by the verifier and only escapes from the
/// lower-level executor API.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("No schema registered for resource '{0}'")]
    SchemaNotFound(String),

    #[error("No endpoint contract registered for {1} {0}")]
    EndpointNotFound(String, HttpMethod),

    #[error("Missing path parameter '{0}' for template '{1}'")]
    MissingParameter(String, String),

    #[error("Contract {1} {0} declares no expected status for the {2} scenario")]
    UnsupportedScenario(String, HttpMethod, ScenarioClass),

    #[error("Timeout must be greater than 0 ms")]
    InvalidTimeout,

    #[error("Invalid header '{0}': {1}")]
    InvalidHeader(String, String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Contract document error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl VerifierError {
    /// True for errors that mean the contracts or configuration are wrong,
    /// as opposed to the API under test misbehaving
    pub fn is_authoring_error(&self) -> bool {
        !matches!(self, VerifierError::Transport(_))
    }
}

impl From<serde_json::Error> for VerifierError {
    fn from(error: serde_json::Error) -> Self {
        VerifierError::Parse(error.to_string())
    }
}

#[cfg(feature = "yaml-support")]
impl From<serde_yaml::Error> for VerifierError {
    fn from(error: serde_yaml::Error) -> Self {
        VerifierError::Parse(error.to_string())
    }
}

impl From<regex::Error> for VerifierError {
    fn from(error: regex::Error) -> Self {
        VerifierError::Configuration(error.to_string())
    }
}
