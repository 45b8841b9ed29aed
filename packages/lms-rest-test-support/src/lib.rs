//! Test support utilities for the LMS REST gateway
//!
//! Shared between the gateway's unit and integration tests: logging
//! bootstrap, error envelope assertions and unique test data helpers.

pub mod error_envelope;
pub mod logging;
pub mod unique_helpers;
