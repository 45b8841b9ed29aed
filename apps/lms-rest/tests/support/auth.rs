//! Token helpers for tests.

use std::time::{Duration, SystemTime};

use lms_rest::auth::codec::TokenCodec;
use lms_rest::auth::service::TokenPair;
use lms_rest::auth::token::Token;
use lms_rest::{AppState, SecurityConfig, TokenKind, UserId};

/// Issue a real pair through the token service (stored like a login).
pub async fn issue_pair(state: &AppState, user: UserId) -> TokenPair {
    state
        .tokens
        .issue(user, None, SystemTime::now())
        .await
        .expect("should issue tokens")
}

/// `Authorization` header value for a freshly issued access token.
pub async fn bearer_for(state: &AppState, user: UserId) -> String {
    format!("Bearer {}", issue_pair(state, user).await.access_token)
}

/// Access token that expired an hour ago.
pub fn expired_access_token(user: UserId, sec: &SecurityConfig) -> String {
    let issued = SystemTime::now() - Duration::from_secs(2 * 60 * 60);
    let token = Token::generate(
        TokenKind::Access,
        user,
        None,
        issued,
        Duration::from_secs(60 * 60),
    );
    TokenCodec::new(sec)
        .encode(&token)
        .expect("should encode token")
}

/// Well-formed access token signed with a different secret.
pub fn foreign_access_token(user: UserId) -> String {
    let foreign = SecurityConfig::new("some-other-server-secret-of-enough-length".as_bytes());
    let token = Token::generate(
        TokenKind::Access,
        user,
        None,
        SystemTime::now(),
        Duration::from_secs(60),
    );
    TokenCodec::new(&foreign)
        .encode(&token)
        .expect("should encode token")
}
