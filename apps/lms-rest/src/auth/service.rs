//! Token lifecycle: issue, validate, refresh, revoke.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, info};

use super::codec::TokenCodec;
use super::store::{RefreshRecord, StoreError, TokenStore};
use super::token::{Token, TokenError, TokenFingerprint, TokenKind, UserId};
use crate::state::security_config::SecurityConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Freshly minted credentials, both as records and as wire strings.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: Token,
    pub access_token: String,
    pub refresh: Token,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked(TokenKind),
    /// Token was already expired, revoked or never ours; nothing to do.
    Ignored,
}

pub struct TokenService {
    codec: TokenCodec,
    store: Arc<dyn TokenStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    rotate_refresh: bool,
}

impl TokenService {
    pub fn new(security: &SecurityConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            codec: TokenCodec::new(security),
            store,
            access_ttl: security.access_ttl,
            refresh_ttl: security.refresh_ttl,
            rotate_refresh: security.rotate_refresh,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue an access/refresh pair after a successful login.
    pub async fn issue(
        &self,
        subject: UserId,
        client_id: Option<String>,
        now: SystemTime,
    ) -> Result<TokenPair, AuthError> {
        let access = self.mint(TokenKind::Access, subject, client_id.clone(), now);
        let access_token = self.codec.encode(&access)?;
        let (refresh, refresh_token) = self.mint_refresh(subject, client_id, now).await?;

        info!(user_id = %subject, "token_issued");

        Ok(TokenPair {
            access,
            access_token,
            refresh,
            refresh_token,
        })
    }

    /// Validate a presented token against the required kind.
    pub async fn validate(
        &self,
        raw: &str,
        expected: TokenKind,
        now: SystemTime,
    ) -> Result<Token, AuthError> {
        let token = self.codec.decode(raw, expected, now)?;
        let fingerprint = token.fingerprint();

        let known = match token.kind {
            TokenKind::Access => !self.store.is_access_revoked(&fingerprint).await?,
            TokenKind::Refresh => self
                .store
                .find_refresh(&fingerprint)
                .await?
                .is_some_and(|record| record.subject == token.subject),
        };

        if !known {
            return Err(TokenError::RevokedOrUnknown.into());
        }
        Ok(token)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// With rotation the presented refresh token is consumed atomically and
    /// a new one is issued; a second exchange of the same token fails with
    /// `RevokedOrUnknown`. Without rotation the presented refresh token is
    /// handed back unchanged.
    pub async fn refresh(
        &self,
        raw: &str,
        client_id: Option<&str>,
        now: SystemTime,
    ) -> Result<TokenPair, AuthError> {
        let presented = self.validate(raw, TokenKind::Refresh, now).await?;

        if let Some(client_id) = client_id {
            if presented.client_id.as_deref() != Some(client_id) {
                debug!(user_id = %presented.subject, "refresh client mismatch");
                return Err(TokenError::RevokedOrUnknown.into());
            }
        }

        let subject = presented.subject;
        let (refresh, refresh_token) = if self.rotate_refresh {
            if self.store.take_refresh(&presented.fingerprint()).await?.is_none() {
                debug!(user_id = %subject, "refresh token consumed concurrently");
                return Err(TokenError::RevokedOrUnknown.into());
            }
            self.mint_refresh(subject, presented.client_id.clone(), now)
                .await?
        } else {
            (presented.clone(), raw.to_string())
        };

        let access = self.mint(TokenKind::Access, subject, presented.client_id, now);
        let access_token = self.codec.encode(&access)?;

        info!(user_id = %subject, rotated = self.rotate_refresh, "token_refreshed");

        Ok(TokenPair {
            access,
            access_token,
            refresh,
            refresh_token,
        })
    }

    /// Revoke a token of either kind. Invalid tokens are ignored rather
    /// than reported, so revocation never leaks which tokens exist.
    pub async fn revoke(&self, raw: &str, now: SystemTime) -> Result<RevokeOutcome, AuthError> {
        let token = match self.codec.decode_any(raw, now) {
            Ok(token) => token,
            Err(_) => return Ok(RevokeOutcome::Ignored),
        };

        let revoked = match token.kind {
            TokenKind::Access => {
                self.store
                    .revoke_access(token.fingerprint(), token.expires_at)
                    .await?;
                true
            }
            TokenKind::Refresh => self
                .store
                .take_refresh(&token.fingerprint())
                .await?
                .is_some(),
        };

        if !revoked {
            return Ok(RevokeOutcome::Ignored);
        }

        info!(user_id = %token.subject, kind = %token.kind, "token_revoked");
        Ok(RevokeOutcome::Revoked(token.kind))
    }

    /// Deny-list an access token the caller has already validated.
    pub async fn revoke_access(
        &self,
        subject: UserId,
        fingerprint: TokenFingerprint,
        expires_at: i64,
    ) -> Result<(), AuthError> {
        self.store.revoke_access(fingerprint, expires_at).await?;
        info!(user_id = %subject, kind = %TokenKind::Access, "token_revoked");
        Ok(())
    }

    /// Revoke every refresh token held by `subject`.
    pub async fn revoke_all(&self, subject: UserId) -> Result<usize, AuthError> {
        let removed = self.store.revoke_all_for(subject).await?;
        info!(user_id = %subject, removed, "refresh_tokens_revoked");
        Ok(removed)
    }

    pub async fn purge_expired(&self, now: SystemTime) -> Result<usize, AuthError> {
        Ok(self.store.purge_expired(now).await?)
    }

    fn mint(
        &self,
        kind: TokenKind,
        subject: UserId,
        client_id: Option<String>,
        now: SystemTime,
    ) -> Token {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        Token::generate(kind, subject, client_id, now, ttl)
    }

    async fn mint_refresh(
        &self,
        subject: UserId,
        client_id: Option<String>,
        now: SystemTime,
    ) -> Result<(Token, String), AuthError> {
        let refresh = self.mint(TokenKind::Refresh, subject, client_id, now);
        let encoded = self.codec.encode(&refresh)?;
        self.store
            .save_refresh(refresh.fingerprint(), RefreshRecord::from(&refresh))
            .await?;
        Ok((refresh, encoded))
    }
}
