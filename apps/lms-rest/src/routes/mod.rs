use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod admin;
pub mod contacts;
pub mod courses;
pub mod health;
pub mod oauth2;

/// Register every route.
///
/// `main.rs` registers the `/v2/oauth2` scope itself so it can put the
/// rate limiter around it, then calls [`configure_resources`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/v2/oauth2").configure(oauth2::configure_routes));
    configure_resources(cfg);
}

/// Everything except the token endpoints.
pub fn configure_resources(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(path_config())
        .configure(health::configure_routes)
        .service(
            web::scope("/v1")
                .configure(courses::configure_routes)
                .configure(contacts::configure_routes),
        )
        .service(web::scope("/admin").configure(admin::configure_routes));
}

/// Form/query/path rejections in the shared error envelope.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _| bad_request(ErrorCode::BadRequest, err.to_string()))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| bad_request(ErrorCode::InvalidParameter, err.to_string()))
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _| bad_request(ErrorCode::InvalidParameter, err.to_string()))
}

fn bad_request(code: ErrorCode, detail: String) -> actix_web::Error {
    AppError::bad_request(code, detail).into()
}
