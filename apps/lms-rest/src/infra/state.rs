use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::store::{InMemoryTokenStore, TokenStore};
use crate::error::AppError;
use crate::lms::{InMemoryLms, Lms};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for [`AppState`], shared by `main` and the tests.
pub struct StateBuilder {
    security_config: SecurityConfig,
    store: Option<Arc<dyn TokenStore>>,
    lms: Option<Arc<dyn Lms>>,
    fixture: Option<PathBuf>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            store: None,
            lms: None,
            fixture: None,
        }
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_lms(mut self, lms: Arc<dyn Lms>) -> Self {
        self.lms = Some(lms);
        self
    }

    /// Seed the in-memory LMS from a JSON fixture file. Ignored when an
    /// LMS was given with [`with_lms`](Self::with_lms).
    pub fn with_fixture(mut self, path: Option<PathBuf>) -> Self {
        self.fixture = path;
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let lms: Arc<dyn Lms> = match (self.lms, self.fixture) {
            (Some(lms), _) => lms,
            (None, Some(path)) => Arc::new(InMemoryLms::from_path(&path)?),
            (None, None) => Arc::new(InMemoryLms::new()),
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));

        Ok(AppState::new(self.security_config, store, lms))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
