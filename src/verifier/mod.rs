pub mod engine;
pub mod suite;

pub use engine::{Verifier, VerificationRequest, VerificationOutcome};
pub use suite::{SuiteRunner, SuiteCase, SuiteReport, CaseReport, CaseResult};
