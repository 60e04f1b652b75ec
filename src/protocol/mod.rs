pub mod transport;
pub mod request_executor;

pub use transport::{Transport, TransportResponse, HttpTransport};
pub use request_executor::{RequestExecutor, ExecutionRequest, ExecutionResult};
