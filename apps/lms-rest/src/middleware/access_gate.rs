//! Access gate middleware.
//!
//! Wraps a resource with the level it requires. On every request the gate
//! extracts the bearer token (Authorization header, falling back to the
//! `access_token` query parameter), validates it as an access token, asks
//! the LMS whether the subject satisfies the level and stores the resulting
//! [`CurrentUser`] in request extensions. The wrapped handler only runs on a
//! grant; every denial is answered here in the error envelope.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::SystemTime;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth::gate::{decide, AccessLevel, DecisionReason};
use crate::auth::token::TokenKind;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::auth_token::parse_bearer;
use crate::extractors::CurrentUser;
use crate::logging::security;
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RequireAccess {
    level: AccessLevel,
}

impl RequireAccess {
    pub fn new(level: AccessLevel) -> Self {
        Self { level }
    }

    /// Any authenticated subject known to the LMS.
    pub fn permission() -> Self {
        Self::new(AccessLevel::Permission)
    }

    /// LMS administrators only.
    pub fn admin() -> Self {
        Self::new(AccessLevel::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAccessMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAccessMiddleware {
            service: Rc::new(service),
            level: self.level,
        }))
    }
}

pub struct RequireAccessMiddleware<S> {
    service: Rc<S>,
    level: AccessLevel,
}

impl<S, B> Service<ServiceRequest> for RequireAccessMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let level = self.level;

        Box::pin(async move {
            match authorize(&req, level).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    security::access_denied(req.path(), err.code().as_str());
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}

async fn authorize(req: &ServiceRequest, level: AccessLevel) -> Result<CurrentUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    let raw = match parse_bearer(req.headers().get(header::AUTHORIZATION))? {
        Some(token) => token,
        None => token_from_query(req.query_string())
            .ok_or_else(AppError::unauthorized_missing_bearer)?,
    };

    let token = state
        .tokens
        .validate(&raw, TokenKind::Access, SystemTime::now())
        .await?;

    let decision = decide(level, token.subject, state.lms.as_ref()).await?;
    debug!(user_id = %token.subject, %level, reason = ?decision.reason, "access decision");

    match decision.reason {
        DecisionReason::Granted => Ok(CurrentUser {
            user_id: token.subject,
            client_id: token.client_id.clone(),
            is_admin: decision.is_admin,
            expires_at: token.expires_at,
            token: token.fingerprint(),
        }),
        DecisionReason::UnknownSubject => Err(AppError::forbidden(
            ErrorCode::ForbiddenUserNotFound,
            "Token subject is not a known user",
        )),
        DecisionReason::NotAdmin => Err(AppError::forbidden(
            ErrorCode::InsufficientRole,
            format!("This resource requires {level} access"),
        )),
    }
}

fn token_from_query(query: &str) -> Option<String> {
    if query.is_empty() {
        return None;
    }
    let params = web::Query::<HashMap<String, String>>::from_query(query).ok()?;
    params
        .get("access_token")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
