pub mod access_gate;
pub mod cors;
pub mod rate_limit;
pub mod request_trace;
pub mod security_headers;
pub mod structured_logger;
pub mod trace_span;

pub use access_gate::RequireAccess;
pub use request_trace::{RequestId, RequestTrace};
pub use security_headers::SecurityHeaders;
pub use structured_logger::StructuredLogger;
pub use trace_span::TraceSpan;
