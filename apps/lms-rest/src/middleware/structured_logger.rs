//! One `request_completed` event per request.
//!
//! The event names the matched route pattern (`/v1/courses/{ref_id}`), not
//! the raw path or query string: the query may carry an `access_token`.
//! When the access gate admitted the request, the caller's user id and
//! client id are attached from its [`CurrentUser`].

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn, Level};

use super::RequestId;
use crate::auth::token::UserId;
use crate::extractors::CurrentUser;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// Caller identity as recorded by the access gate, if it ran and granted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Caller {
    user_id: Option<UserId>,
    client_id: Option<String>,
}

impl Caller {
    fn of(req: &HttpRequest) -> Self {
        req.extensions()
            .get::<CurrentUser>()
            .map(|user| Caller {
                user_id: Some(user.user_id),
                client_id: user.client_id.clone(),
            })
            .unwrap_or_default()
    }
}

fn level_for(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

struct Completion {
    method: String,
    route: String,
    status: StatusCode,
    duration_us: u64,
    trace_id: String,
    caller: Caller,
}

impl Completion {
    fn emit(&self) {
        let method = &self.method;
        let route = &self.route;
        let status_code = self.status.as_u16();
        let duration_us = self.duration_us;
        let trace_id = &self.trace_id;
        let user_id = self.caller.user_id.map(|id| id.0);
        let client_id = self.caller.client_id.as_deref();

        macro_rules! completed {
            ($level:ident) => {
                $level!(
                    http.method = %method,
                    http.route = %route,
                    http.status_code = status_code,
                    duration_us,
                    trace_id = %trace_id,
                    user_id,
                    client_id,
                    "request_completed"
                )
            };
        }

        let level = level_for(self.status);
        if level == Level::ERROR {
            completed!(error);
        } else if level == Level::WARN {
            completed!(warn);
        } else {
            completed!(info);
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let trace_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, route, caller) = match &result {
                Ok(res) => (
                    res.status(),
                    res.request().match_pattern().unwrap_or(path),
                    Caller::of(res.request()),
                ),
                Err(err) => (
                    err.as_response_error().status_code(),
                    path,
                    Caller::default(),
                ),
            };

            Completion {
                method,
                route,
                status,
                duration_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                trace_id,
                caller,
            }
            .emit();

            result
        })
    }
}
