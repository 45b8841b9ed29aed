//! Access/refresh token model.
//!
//! A token is a signed claim set whose `jti` is a random secret of fixed
//! entropy per token kind. The entropy doubles as a structural check: a
//! secret that does not decode to exactly `kind.entropy()` bytes was not
//! minted by this server for that kind.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LMS user identifier (the LMS's own numeric user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Size in bytes of the random secret carried by tokens of this kind.
    pub const fn entropy(self) -> usize {
        match self {
            TokenKind::Access => 25,
            TokenKind::Refresh => 30,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed validation failures. HTTP-agnostic; `AppError` maps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token revoked or unknown")]
    RevokedOrUnknown,
    #[error("token has the wrong type")]
    WrongType,
}

/// Claims included in every token we sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub typ: TokenKind,
    /// LMS user id of the resource owner
    pub sub: UserId,
    /// API key the token was issued to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Random secret, base64url without padding
    pub jti: String,
}

/// Store key for a token: blake3 digest of its secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenFingerprint(blake3::Hash);

impl TokenFingerprint {
    pub fn of_secret(secret: &str) -> Self {
        Self(blake3::hash(secret.as_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub subject: UserId,
    pub client_id: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
    pub secret: String,
}

impl Token {
    /// Mint a token with a fresh random secret.
    pub fn generate(
        kind: TokenKind,
        subject: UserId,
        client_id: Option<String>,
        now: SystemTime,
        ttl: Duration,
    ) -> Self {
        let mut bytes = vec![0u8; kind.entropy()];
        rand::rng().fill_bytes(&mut bytes);

        let issued_at = unix_secs(now);
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Token {
            kind,
            subject,
            client_id,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
            secret: URL_SAFE_NO_PAD.encode(&bytes),
        }
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        unix_secs(now) >= self.expires_at
    }

    /// Seconds left until expiry, floored at zero.
    pub fn expires_in(&self, now: SystemTime) -> i64 {
        (self.expires_at - unix_secs(now)).max(0)
    }

    pub fn fingerprint(&self) -> TokenFingerprint {
        TokenFingerprint::of_secret(&self.secret)
    }

    pub fn claims(&self) -> TokenClaims {
        TokenClaims {
            typ: self.kind,
            sub: self.subject,
            cid: self.client_id.clone(),
            iat: self.issued_at,
            exp: self.expires_at,
            jti: self.secret.clone(),
        }
    }

    /// Rebuild a token from verified claims, enforcing the entropy invariant.
    pub fn from_claims(claims: TokenClaims) -> Result<Self, TokenError> {
        if !secret_has_entropy(claims.typ, &claims.jti) {
            return Err(TokenError::Malformed);
        }

        Ok(Token {
            kind: claims.typ,
            subject: claims.sub,
            client_id: claims.cid,
            issued_at: claims.iat,
            expires_at: claims.exp,
            secret: claims.jti,
        })
    }
}

fn secret_has_entropy(kind: TokenKind, secret: &str) -> bool {
    URL_SAFE_NO_PAD
        .decode(secret)
        .map(|bytes| bytes.len() == kind.entropy())
        .unwrap_or(false)
}

/// Seconds since the Unix epoch; times before the epoch clamp to zero.
pub fn unix_secs(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
