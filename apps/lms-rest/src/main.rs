use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use lms_rest::config::Config;
use lms_rest::extractors::JsonBodyLimit;
use lms_rest::infra::housekeeping::{spawn_purge_task, PURGE_INTERVAL};
use lms_rest::infra::state::build_state;
use lms_rest::middleware::cors::cors_middleware;
use lms_rest::middleware::rate_limit::{denied_response, token_rate_limit_config};
use lms_rest::middleware::{RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan};
use lms_rest::{routes, telemetry};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be provided by the runtime environment.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_security(config.security_config())
        .with_fixture(config.fixture_path.clone())
        .build()
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let purge = spawn_purge_task(app_state.tokens.clone(), PURGE_INTERVAL);

    info!(
        host = %config.host,
        port = config.port,
        rotate_refresh = config.rotate_refresh,
        client_check = config.api_keys.is_some(),
        "starting lms-rest"
    );

    let data = web::Data::new(app_state);
    let rate_limit_backend = InMemoryBackend::builder().build();
    let cors_origins = config.cors_allowed_origins.clone();
    let json_limit = config.max_json_payload_size;
    let token_rate_limit = config.token_rate_limit;

    let result = HttpServer::new(move || {
        let token_limiter = RateLimiter::builder(
            rate_limit_backend.clone(),
            token_rate_limit_config(token_rate_limit).build(),
        )
        .add_headers()
        .request_denied_response(denied_response)
        .build();

        App::new()
            .wrap(cors_middleware(&cors_origins))
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .app_data(JsonBodyLimit(json_limit))
            .service(
                web::scope("/v2/oauth2")
                    .wrap(token_limiter)
                    .configure(routes::oauth2::configure_routes),
            )
            .configure(routes::configure_resources)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    purge.abort();
    result
}
