//! Error codes for the LMS REST gateway API.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses. Each code also has a stable numeric id,
//! grouped by hundreds: 1xx auth, 2xx request validation, 3xx LMS, 5xx
//! system. Ids are part of the wire contract and are never reused. Add new
//! codes here; never pass ad-hoc strings as error codes.

use core::fmt;

/// Centralized error codes for the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Token failed to decode or carries a malformed secret
    TokenMalformed,
    /// Token is past its expiry timestamp
    TokenExpired,
    /// Token was revoked or never issued by this server
    TokenRevoked,
    /// Token kind does not match the one required here
    TokenWrongType,
    /// Username/password pair rejected by the LMS
    InvalidCredentials,
    /// Unknown or disallowed API key
    InvalidClient,
    /// Refresh grant rejected
    InvalidGrant,
    /// Subject of a valid token no longer exists in the LMS
    ForbiddenUserNotFound,
    /// Subject lacks the required access level
    InsufficientRole,
    /// LMS denied the action on the object
    PermissionDenied,

    // Request Validation
    /// Required request parameter absent
    MissingParameter,
    /// grant_type is not supported by the token endpoint
    UnsupportedGrantType,
    /// Request body is not valid JSON for the endpoint
    InvalidJson,
    /// Path or query parameter could not be parsed
    InvalidParameter,
    /// General bad request error
    BadRequest,
    /// Request body exceeds the configured size limit
    PayloadTooLarge,

    // LMS collaborator
    /// Object or user lookup failed
    ReadFailed,
    /// Enrollment or object creation failed
    CreateFailed,
    /// LMS backend unreachable
    LmsUnavailable,

    // System Errors
    /// Too many requests
    RateLimited,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::TokenWrongType => "TOKEN_WRONG_TYPE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidClient => "INVALID_CLIENT",
            Self::InvalidGrant => "INVALID_GRANT",
            Self::ForbiddenUserNotFound => "FORBIDDEN_USER_NOT_FOUND",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::PermissionDenied => "PERMISSION_DENIED",

            Self::MissingParameter => "MISSING_PARAMETER",
            Self::UnsupportedGrantType => "UNSUPPORTED_GRANT_TYPE",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::BadRequest => "BAD_REQUEST",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",

            Self::ReadFailed => "READ_FAILED",
            Self::CreateFailed => "CREATE_FAILED",
            Self::LmsUnavailable => "LMS_UNAVAILABLE",

            Self::RateLimited => "RATE_LIMITED",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl ErrorCode {
    /// Stable numeric id reported next to the string code.
    pub const fn id(&self) -> i32 {
        match self {
            Self::UnauthorizedMissingBearer => 101,
            Self::TokenMalformed => 102,
            Self::TokenExpired => 103,
            Self::TokenRevoked => 104,
            Self::TokenWrongType => 105,
            Self::InvalidCredentials => 106,
            Self::InvalidClient => 107,
            Self::InvalidGrant => 108,
            Self::ForbiddenUserNotFound => 109,
            Self::InsufficientRole => 110,
            Self::PermissionDenied => 111,

            Self::MissingParameter => 201,
            Self::UnsupportedGrantType => 202,
            Self::InvalidJson => 203,
            Self::InvalidParameter => 204,
            Self::BadRequest => 205,
            Self::PayloadTooLarge => 206,

            Self::ReadFailed => 301,
            Self::CreateFailed => 302,
            Self::LmsUnavailable => 303,

            Self::RateLimited => 501,
            Self::Internal => 502,
            Self::ConfigError => 503,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
