use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::service::AuthError;
use crate::auth::token::TokenError;
use crate::errors::ErrorCode;
use crate::lms::LmsError;
use crate::trace_ctx;

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub code: String,
    /// Numeric form of `code`
    pub code_id: i32,
    /// OAuth2 error type (RFC 6749 §5.2 vocabulary where one applies)
    pub error: &'static str,
    pub msg: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing parameter: {param}")]
    MissingParameter { param: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Credentials rejected: {detail}")]
    Credentials { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: TokenError },
    #[error("Invalid grant: {reason}")]
    InvalidGrant { reason: TokenError },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Read failed: {detail}")]
    ReadFailed { detail: String },
    #[error("Create failed: {detail}")]
    CreateFailed { detail: String },
    #[error("Payload too large: limit {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("Too many requests")]
    RateLimited,
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

fn token_code(reason: TokenError) -> ErrorCode {
    match reason {
        TokenError::Expired => ErrorCode::TokenExpired,
        TokenError::Malformed => ErrorCode::TokenMalformed,
        TokenError::RevokedOrUnknown => ErrorCode::TokenRevoked,
        TokenError::WrongType => ErrorCode::TokenWrongType,
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingParameter { .. } => ErrorCode::MissingParameter,
            AppError::BadRequest { code, .. } => *code,
            AppError::Credentials { code, .. } => *code,
            AppError::Unauthorized { code, .. } => *code,
            AppError::InvalidToken { reason } => token_code(*reason),
            AppError::InvalidGrant { .. } => ErrorCode::InvalidGrant,
            AppError::Forbidden { code, .. } => *code,
            AppError::ReadFailed { .. } => ErrorCode::ReadFailed,
            AppError::CreateFailed { .. } => ErrorCode::CreateFailed,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Client-facing message. Internal details are not exposed.
    pub fn detail(&self) -> String {
        match self {
            AppError::MissingParameter { param } => {
                format!("Mandatory parameter missing: {param}")
            }
            AppError::BadRequest { detail, .. }
            | AppError::Credentials { detail, .. }
            | AppError::Unauthorized { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::ReadFailed { detail }
            | AppError::CreateFailed { detail } => detail.clone(),
            AppError::InvalidToken { reason } | AppError::InvalidGrant { reason } => {
                match reason {
                    TokenError::Expired => "Token expired".to_string(),
                    TokenError::Malformed => "Token malformed".to_string(),
                    TokenError::RevokedOrUnknown => "Token revoked or unknown".to_string(),
                    TokenError::WrongType => "Token has the wrong type for this request".to_string(),
                }
            }
            AppError::PayloadTooLarge { limit } => {
                format!("Request body exceeds the {limit} byte limit")
            }
            AppError::RateLimited => "Too many requests".to_string(),
            AppError::Internal { .. } | AppError::Config { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter { .. }
            | AppError::BadRequest { .. }
            | AppError::InvalidGrant { .. }
            | AppError::CreateFailed { .. } => StatusCode::BAD_REQUEST,
            AppError::Credentials { .. }
            | AppError::Unauthorized { .. }
            | AppError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::ReadFailed { .. } => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// OAuth2 error type reported alongside the gateway code.
    pub fn oauth_error(&self) -> &'static str {
        match self {
            AppError::MissingParameter { .. } | AppError::BadRequest { .. } => "invalid_request",
            AppError::Credentials { code, .. } if *code == ErrorCode::InvalidClient => {
                "invalid_client"
            }
            AppError::Credentials { .. } => "unauthorized_client",
            AppError::Unauthorized { .. } | AppError::InvalidToken { .. } => "invalid_token",
            AppError::InvalidGrant { .. } => "invalid_grant",
            AppError::Forbidden { .. } => "insufficient_scope",
            AppError::ReadFailed { .. } => "not_found",
            AppError::CreateFailed { .. } | AppError::PayloadTooLarge { .. } => "invalid_request",
            AppError::RateLimited => "temporarily_unavailable",
            AppError::Internal { .. } | AppError::Config { .. } => "server_error",
        }
    }

    pub fn missing_parameter(param: impl Into<String>) -> Self {
        Self::MissingParameter {
            param: param.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::Credentials {
            code: ErrorCode::InvalidCredentials,
            detail: "Invalid username or password".to_string(),
        }
    }

    pub fn invalid_client() -> Self {
        Self::Credentials {
            code: ErrorCode::InvalidClient,
            detail: "Unknown or disallowed client_id".to_string(),
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedMissingBearer,
            detail: "Missing or malformed Bearer token".to_string(),
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn read_failed(detail: impl Into<String>) -> Self {
        Self::ReadFailed {
            detail: detail.into(),
        }
    }

    pub fn create_failed(detail: impl Into<String>) -> Self {
        Self::CreateFailed {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Map an auth failure met while exchanging a grant: token problems are
    /// the client's (400 invalid_grant), everything else is ours.
    pub fn from_grant(err: AuthError) -> Self {
        match err {
            AuthError::Token(reason) => Self::InvalidGrant { reason },
            other => other.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(reason: TokenError) -> Self {
        AppError::InvalidToken { reason }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Token(reason) => AppError::InvalidToken { reason },
            AuthError::Store(e) => AppError::internal(e.to_string()),
            AuthError::Encoding(e) => AppError::internal(format!("token encoding: {e}")),
        }
    }
}

impl From<LmsError> for AppError {
    fn from(err: LmsError) -> Self {
        match err {
            LmsError::ReadFailed(detail) => AppError::read_failed(detail),
            LmsError::CreateFailed(detail) => AppError::create_failed(detail),
            LmsError::Unavailable(detail) => AppError::Internal {
                code: ErrorCode::LmsUnavailable,
                detail,
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_ctx::trace_id();

        if status.is_server_error() {
            error!(trace_id = %trace_id, error = %self, "request failed");
        }

        let envelope = ErrorEnvelope {
            status: "failed",
            code: self.code().to_string(),
            code_id: self.code().id(),
            error: self.oauth_error(),
            msg: self.detail(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder.insert_header(("x-trace-id", trace_id));
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((
                "www-authenticate",
                format!("Bearer error=\"{}\"", self.oauth_error()),
            ));
        }
        builder.json(envelope)
    }
}
