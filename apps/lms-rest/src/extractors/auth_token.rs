use actix_web::http::header::HeaderValue;

use crate::error::AppError;

/// Parse `Bearer <token>`. `Ok(None)` when the header is absent; an error
/// when it is present but not a usable bearer credential.
pub fn parse_bearer(header_value: Option<&HeaderValue>) -> Result<Option<String>, AppError> {
    let Some(value) = header_value else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Ok(Some(token.to_string()))
        }
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}
