//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_MAX_JSON_PAYLOAD_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Tokens
    pub token_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub rotate_refresh: bool,
    /// Accepted `client_id` values; `None` accepts any client
    pub api_keys: Option<Vec<String>>,
    /// Token endpoint requests per minute per IP
    pub token_rate_limit: u64,

    /// LMS fixture (JSON) backing the in-memory LMS
    pub fixture_path: Option<PathBuf>,

    // HTTP
    pub cors_allowed_origins: Vec<String>,
    pub max_json_payload_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("LMS_REST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("LMS_REST_PORT", 3001u16)?;

        let token_secret = match env::var("LMS_REST_TOKEN_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(_) => {
                return Err(AppError::config(format!(
                    "LMS_REST_TOKEN_SECRET is too short. It should be at least {MIN_SECRET_LEN} characters."
                )))
            }
            Err(_) => return Err(AppError::config("LMS_REST_TOKEN_SECRET must be set")),
        };

        let access_ttl_secs = parse_var("LMS_REST_ACCESS_TTL_SECS", 30 * 60u64)?;
        let refresh_ttl_secs = parse_var("LMS_REST_REFRESH_TTL_SECS", 14 * 24 * 60 * 60u64)?;
        if access_ttl_secs == 0 || refresh_ttl_secs == 0 {
            return Err(AppError::config("token lifetimes must be greater than zero"));
        }
        if refresh_ttl_secs < access_ttl_secs {
            return Err(AppError::config(
                "LMS_REST_REFRESH_TTL_SECS must not be shorter than LMS_REST_ACCESS_TTL_SECS",
            ));
        }

        let rotate_refresh = parse_bool("LMS_REST_ROTATE_REFRESH", true)?;
        let api_keys = env::var("LMS_REST_API_KEYS")
            .ok()
            .map(|raw| split_list(&raw))
            .filter(|keys| !keys.is_empty());
        let token_rate_limit = parse_var("LMS_REST_TOKEN_RATE_LIMIT", 10u64)?;

        let fixture_path = env::var("LMS_REST_FIXTURE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        let max_json_payload_size =
            parse_var("MAX_JSON_PAYLOAD_SIZE", DEFAULT_MAX_JSON_PAYLOAD_SIZE)?;

        Ok(Config {
            host,
            port,
            token_secret,
            access_ttl_secs,
            refresh_ttl_secs,
            rotate_refresh,
            api_keys,
            token_rate_limit,
            fixture_path,
            cors_allowed_origins,
            max_json_payload_size,
        })
    }

    pub fn security_config(&self) -> SecurityConfig {
        let mut security = SecurityConfig::new(self.token_secret.as_bytes());
        security.access_ttl = Duration::from_secs(self.access_ttl_secs);
        security.refresh_ttl = Duration::from_secs(self.refresh_ttl_secs);
        security.rotate_refresh = self.rotate_refresh;
        match &self.api_keys {
            Some(keys) => security.with_api_keys(keys.iter().cloned()),
            None => security,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} has an invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config(format!("{name} must be a boolean, got '{raw}'"))),
        },
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
