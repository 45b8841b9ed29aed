//! Rate limiting for the token endpoint.
//!
//! Password and refresh grants are limited per client IP. The limiter
//! itself is assembled in `main.rs` around the `/v2/oauth2` scope.

use std::time::Duration;

use actix_extensible_rate_limit::backend::{SimpleInputFunctionBuilder, SimpleOutput};
use actix_web::{HttpResponse, ResponseError};

use crate::error::AppError;
use crate::logging::security;

/// `per_minute` requests per 60 seconds per IP address.
pub fn token_rate_limit_config(per_minute: u64) -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), per_minute).real_ip_key()
}

/// Response for a request over the limit, in the shared error envelope.
pub fn denied_response(_output: &SimpleOutput) -> HttpResponse {
    security::rate_limit_hit("/v2/oauth2");
    AppError::RateLimited.error_response()
}
