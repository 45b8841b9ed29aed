//! Token persistence.
//!
//! Only fingerprints are stored, never raw secrets. Refresh tokens are
//! allow-listed (present means usable); access tokens are deny-listed
//! (present means revoked) until their natural expiry.

use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use super::token::{unix_secs, Token, TokenFingerprint, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub subject: UserId,
    pub client_id: Option<String>,
    pub expires_at: i64,
}

impl From<&Token> for RefreshRecord {
    fn from(token: &Token) -> Self {
        Self {
            subject: token.subject,
            client_id: token.client_id.clone(),
            expires_at: token.expires_at,
        }
    }
}

#[derive(Debug, Error)]
#[error("token store unavailable: {0}")]
pub struct StoreError(pub String);

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save_refresh(
        &self,
        fingerprint: TokenFingerprint,
        record: RefreshRecord,
    ) -> Result<(), StoreError>;

    async fn find_refresh(
        &self,
        fingerprint: &TokenFingerprint,
    ) -> Result<Option<RefreshRecord>, StoreError>;

    /// Remove and return a refresh record. Of several concurrent callers
    /// for the same fingerprint, exactly one receives `Some`.
    async fn take_refresh(
        &self,
        fingerprint: &TokenFingerprint,
    ) -> Result<Option<RefreshRecord>, StoreError>;

    async fn revoke_access(
        &self,
        fingerprint: TokenFingerprint,
        expires_at: i64,
    ) -> Result<(), StoreError>;

    async fn is_access_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError>;

    /// Drop every refresh token of `subject`; returns how many were removed.
    async fn revoke_all_for(&self, subject: UserId) -> Result<usize, StoreError>;

    /// Drop entries whose token has expired; returns how many were removed.
    async fn purge_expired(&self, now: SystemTime) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    refresh: DashMap<TokenFingerprint, RefreshRecord>,
    revoked_access: DashMap<TokenFingerprint, i64>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh.len()
    }

    pub fn revoked_access_count(&self) -> usize {
        self.revoked_access.len()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn save_refresh(
        &self,
        fingerprint: TokenFingerprint,
        record: RefreshRecord,
    ) -> Result<(), StoreError> {
        self.refresh.insert(fingerprint, record);
        Ok(())
    }

    async fn find_refresh(
        &self,
        fingerprint: &TokenFingerprint,
    ) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.refresh.get(fingerprint).map(|entry| entry.value().clone()))
    }

    async fn take_refresh(
        &self,
        fingerprint: &TokenFingerprint,
    ) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.refresh.remove(fingerprint).map(|(_, record)| record))
    }

    async fn revoke_access(
        &self,
        fingerprint: TokenFingerprint,
        expires_at: i64,
    ) -> Result<(), StoreError> {
        self.revoked_access.insert(fingerprint, expires_at);
        Ok(())
    }

    async fn is_access_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError> {
        Ok(self.revoked_access.contains_key(fingerprint))
    }

    async fn revoke_all_for(&self, subject: UserId) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.refresh.retain(|_, record| {
            let keep = record.subject != subject;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn purge_expired(&self, now: SystemTime) -> Result<usize, StoreError> {
        let now = unix_secs(now);
        let mut removed = 0;

        self.refresh.retain(|_, record| {
            let keep = record.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        self.revoked_access.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}
