use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the configured origins. Entries that are empty, `null` or not
/// http(s) are skipped; with nothing usable only localhost is allowed.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut origins: Vec<&str> = allowed_origins
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .collect();

    if origins.is_empty() {
        origins = vec!["http://localhost:3000", "http://127.0.0.1:3000"];
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
            header::WWW_AUTHENTICATE,
        ])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
