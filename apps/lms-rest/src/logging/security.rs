use tracing::warn;

use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// A password grant was rejected.
pub fn login_failed(reason: &str, login: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        login = %Redacted(login),
        reason,
        "Authentication failure"
    );
}

/// The access gate turned a request away.
pub fn access_denied(path: &str, reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_ACCESS_DENIED",
        %trace_id,
        path,
        reason,
        "Access denied"
    );
}

pub fn rate_limit_hit(endpoint: &str) {
    warn!(
        event = "SECURITY_RATE_LIMIT_HIT",
        endpoint,
        "Rate limit exceeded"
    );
}
