//! Error handling for the LMS REST gateway.

pub mod error_code;

pub use error_code::ErrorCode;
