//! Test logging for the gateway's unit and integration test binaries.
//!
//! Filter precedence is `TEST_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_TEST_FILTER`]. Access-gate and login tests deny requests on
//! purpose, so the default keeps the gateway's `SECURITY_*` warnings out of
//! test output while still surfacing every other warning.
//!
//! `TEST_LOG_JSON=1` switches to the JSON lines the gateway emits in
//! production, which is the format to inspect when checking that tokens
//! and passwords are redacted.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_TEST_FILTER: &str = "warn,lms_rest::logging::security=error";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Directive string for the given `TEST_LOG` / `RUST_LOG` values.
pub fn filter_directives(test_log: Option<String>, rust_log: Option<String>) -> String {
    test_log
        .or(rust_log)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_FILTER.to_string())
}

fn json_requested(value: Option<String>) -> bool {
    matches!(value.as_deref().map(str::trim), Some("1" | "true" | "yes"))
}

/// Install the test subscriber. Idempotent; later calls are no-ops.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let directives = filter_directives(
            std::env::var("TEST_LOG").ok(),
            std::env::var("RUST_LOG").ok(),
        );
        let filter =
            EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        let builder = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time();

        if json_requested(std::env::var("TEST_LOG_JSON").ok()) {
            builder.json().try_init().ok();
        } else {
            builder.try_init().ok();
        }
    });
}
