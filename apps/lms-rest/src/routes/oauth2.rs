//! OAuth2 endpoints: token grant, revocation and introspection.

use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::form_config;
use crate::auth::service::{RevokeOutcome, TokenPair};
use crate::auth::token::{unix_secs, UserId};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::CurrentUser;
use crate::http::{required, success, success_msg};
use crate::logging::security;
use crate::middleware::RequireAccess;
use crate::state::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_expires_in: i64,
}

impl TokenResponse {
    fn new(pair: TokenPair, now: SystemTime) -> Self {
        Self {
            expires_in: pair.access.expires_in(now),
            refresh_expires_in: pair.refresh.expires_in(now),
            access_token: pair.access_token,
            token_type: "Bearer",
            refresh_token: pair.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct TokenInfo {
    user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    is_admin: bool,
    token_type: &'static str,
    expires_in: i64,
}

#[derive(Debug, Serialize)]
struct RevokeAllResponse {
    revoked_refresh_tokens: usize,
}

/// `POST /v2/oauth2/token`
async fn token(
    form: web::Form<TokenRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let grant_type = required(form.grant_type.as_deref(), "grant_type")?;
    let client_id = form
        .client_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    if !state.security.accepts_client(client_id) {
        return Err(AppError::invalid_client());
    }

    let now = SystemTime::now();
    let pair = match grant_type {
        "password" => {
            let username = required(form.username.as_deref(), "username")?;
            let password = required(form.password.as_deref(), "password")?;

            let Some(user_id) = state.lms.authenticate(username, password).await? else {
                security::login_failed("bad_credentials", username);
                return Err(AppError::invalid_credentials());
            };

            state
                .tokens
                .issue(user_id, client_id.map(str::to_string), now)
                .await?
        }
        "refresh_token" => {
            let raw = required(form.refresh_token.as_deref(), "refresh_token")?;
            state
                .tokens
                .refresh(raw, client_id, now)
                .await
                .map_err(AppError::from_grant)?
        }
        other => {
            return Err(AppError::bad_request(
                ErrorCode::UnsupportedGrantType,
                format!("Unsupported grant_type: {other}"),
            ))
        }
    };

    Ok(success(TokenResponse::new(pair, now)))
}

/// `POST /v2/oauth2/revoke`
///
/// Answers success for tokens that are already invalid.
async fn revoke(
    form: web::Form<RevokeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let raw = required(form.token.as_deref(), "token")?;

    match state.tokens.revoke(raw, SystemTime::now()).await? {
        RevokeOutcome::Revoked(kind) => Ok(success_msg(format!("{kind} token revoked"))),
        RevokeOutcome::Ignored => Ok(success_msg("Token is not active")),
    }
}

/// `GET /v2/oauth2/tokeninfo`
async fn tokeninfo(user: CurrentUser) -> Result<HttpResponse, AppError> {
    let now = unix_secs(SystemTime::now());

    Ok(success(TokenInfo {
        user_id: user.user_id,
        client_id: user.client_id,
        is_admin: user.is_admin,
        token_type: "Bearer",
        expires_in: (user.expires_at - now).max(0),
    }))
}

/// `DELETE /v2/oauth2/tokens`: sign out everywhere.
///
/// Drops every refresh token of the caller and revokes the access token
/// used for this request, wherever the gate found it.
async fn revoke_all(
    user: CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let removed = state.tokens.revoke_all(user.user_id).await?;
    state
        .tokens
        .revoke_access(user.user_id, user.token, user.expires_at)
        .await?;

    info!(user_id = %user.user_id, removed, "signed_out_everywhere");
    Ok(success(RevokeAllResponse {
        revoked_refresh_tokens: removed,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(form_config())
        .route("/token", web::post().to(token))
        .route("/revoke", web::post().to(revoke))
        .service(
            web::resource("/tokeninfo")
                .wrap(RequireAccess::permission())
                .route(web::get().to(tokeninfo)),
        )
        .service(
            web::resource("/tokens")
                .wrap(RequireAccess::permission())
                .route(web::delete().to(revoke_all)),
        );
}
