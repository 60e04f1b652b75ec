pub mod verifier_error;
pub mod transport_error;

pub use verifier_error::VerifierError;
pub use transport_error::{TransportError, TransportErrorKind};

pub type Result<T> = std::result::Result<T, VerifierError>;
