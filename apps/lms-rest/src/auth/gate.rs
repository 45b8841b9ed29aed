//! Per-request authorization decisions.
//!
//! A decision is computed from the token subject and the LMS's view of that
//! subject; it is never persisted.

use std::fmt;

use serde::Serialize;

use super::token::UserId;
use crate::lms::{Lms, LmsError};

/// Access level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    /// Any authenticated subject known to the LMS
    Permission,
    /// LMS administrators only
    Admin,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Permission => f.write_str("PERMISSION"),
            AccessLevel::Admin => f.write_str("ADMIN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    Granted,
    UnknownSubject,
    NotAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub granted: bool,
    pub reason: DecisionReason,
    pub is_admin: bool,
}

impl AuthorizationDecision {
    fn grant(is_admin: bool) -> Self {
        Self {
            granted: true,
            reason: DecisionReason::Granted,
            is_admin,
        }
    }

    fn deny(reason: DecisionReason) -> Self {
        Self {
            granted: false,
            reason,
            is_admin: false,
        }
    }
}

/// Decide whether `subject` may use a route that requires `level`.
pub async fn decide(
    level: AccessLevel,
    subject: UserId,
    lms: &dyn Lms,
) -> Result<AuthorizationDecision, LmsError> {
    let Some(user) = lms.user(subject).await? else {
        return Ok(AuthorizationDecision::deny(DecisionReason::UnknownSubject));
    };

    match level {
        AccessLevel::Permission => Ok(AuthorizationDecision::grant(user.is_admin)),
        AccessLevel::Admin if user.is_admin => Ok(AuthorizationDecision::grant(true)),
        AccessLevel::Admin => Ok(AuthorizationDecision::deny(DecisionReason::NotAdmin)),
    }
}
