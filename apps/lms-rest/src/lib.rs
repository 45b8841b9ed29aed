#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod infra;
pub mod lms;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

pub use auth::{AccessLevel, TokenKind, TokenService, UserId};
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{CurrentUser, ValidatedJson};
pub use lms::{InMemoryLms, Lms, LmsError};
pub use middleware::RequireAccess;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    lms_rest_test_support::logging::init();
}
