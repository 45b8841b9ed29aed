use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Token signing and lifetime settings
#[derive(Clone)]
pub struct SecurityConfig {
    /// Secret key for signing and verifying tokens
    pub token_secret: Vec<u8>,
    /// Signing algorithm (defaults to HS256)
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Replace the refresh token on every exchange
    pub rotate_refresh: bool,
    /// Accepted API keys; `None` disables the client check
    pub api_keys: Option<HashSet<String>>,
}

impl SecurityConfig {
    /// Create a SecurityConfig with the given secret and default lifetimes
    pub fn new(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: token_secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            rotate_refresh: true,
            api_keys: None,
        }
    }

    pub fn with_api_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `client_id` may obtain tokens.
    pub fn accepts_client(&self, client_id: Option<&str>) -> bool {
        match (&self.api_keys, client_id) {
            (None, _) => true,
            (Some(keys), Some(id)) => keys.contains(id),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("token_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("rotate_refresh", &self.rotate_refresh)
            .field("api_keys", &self.api_keys.as_ref().map(HashSet::len))
            .finish()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
