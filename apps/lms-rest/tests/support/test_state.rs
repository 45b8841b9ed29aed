use std::sync::Arc;

use lms_rest::infra::state::build_state;
use lms_rest::lms::InMemoryLms;
use lms_rest::{AppState, SecurityConfig};

use super::factory::lms_fixture;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

/// App state plus a handle on the concrete LMS so tests can mutate it.
pub struct TestState {
    pub state: AppState,
    pub lms: Arc<InMemoryLms>,
}

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET.as_bytes())
}

pub fn build_test_state() -> TestState {
    build_test_state_with(test_security())
}

pub fn build_test_state_with(security: SecurityConfig) -> TestState {
    let lms = Arc::new(InMemoryLms::from_fixture(lms_fixture()));
    let state = build_state()
        .with_security(security)
        .with_lms(lms.clone())
        .build()
        .expect("state should build");
    TestState { state, lms }
}
