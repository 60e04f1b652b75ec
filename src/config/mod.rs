pub mod verifier_config;

pub use verifier_config::VerifierConfig;
