use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::auth::service::TokenService;
use crate::auth::store::TokenStore;
use crate::lms::Lms;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Token signing and lifetime settings
    pub security: SecurityConfig,
    pub tokens: Arc<TokenService>,
    /// The LMS the gateway fronts
    pub lms: Arc<dyn Lms>,
}

impl AppState {
    pub fn new(security: SecurityConfig, store: Arc<dyn TokenStore>, lms: Arc<dyn Lms>) -> Self {
        let tokens = Arc::new(TokenService::new(&security, store));
        Self {
            security,
            tokens,
            lms,
        }
    }
}
