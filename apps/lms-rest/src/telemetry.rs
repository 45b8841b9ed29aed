//! Process-wide tracing setup for the gateway binary.
//!
//! `RUST_LOG` picks the filter; without it [`DEFAULT_DIRECTIVES`] applies.
//! `LMS_REST_LOG_FORMAT` picks the output: `json` (default, one object per
//! line for log shippers) or `text` for a terminal.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Gateway events at info; security events are emitted at warn and pass
/// under either setting.
pub const DEFAULT_DIRECTIVES: &str = "info,lms_rest=info,actix_web=info,actix_server=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Unknown values fall back to JSON so production never logs free text
    /// by accident.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("text") || v.eq_ignore_ascii_case("pretty") => {
                LogFormat::Text
            }
            _ => LogFormat::Json,
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let format = LogFormat::parse(std::env::var("LMS_REST_LOG_FORMAT").ok().as_deref());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init(),
        LogFormat::Text => registry.with(fmt::layer().compact().with_target(true)).init(),
    }
}
