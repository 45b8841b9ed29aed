use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Serialize;

use crate::auth::token::{TokenFingerprint, UserId};
use crate::error::AppError;

/// Identity established by the access gate for this request.
///
/// Inserted into request extensions by `RequireAccess`; extracting it on a
/// route the gate does not wrap yields 401.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub client_id: Option<String>,
    pub is_admin: bool,
    /// Access token expiry (seconds since epoch)
    pub expires_at: i64,
    /// Fingerprint of the access token presented on this request, whether
    /// it came from the header or the query string
    #[serde(skip)]
    pub token: TokenFingerprint,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(AppError::unauthorized_missing_bearer),
        )
    }
}
