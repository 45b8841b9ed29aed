//! Test helpers for generating unique test data
//!
//! ULID-based so parallel tests sharing one in-memory LMS never collide.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use lms_rest_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique login name with the given prefix.
///
/// Lowercase so it survives the gateway's login normalization unchanged.
///
/// ```
/// use lms_rest_test_support::unique_helpers::unique_login;
///
/// let login = unique_login("student");
/// assert!(login.starts_with("student-"));
/// assert_eq!(login, login.to_lowercase());
/// ```
pub fn unique_login(prefix: &str) -> String {
    unique_str(prefix).to_lowercase()
}
