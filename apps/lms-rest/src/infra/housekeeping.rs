use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::service::TokenService;

pub const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodically drop expired entries from the token store.
pub fn spawn_purge_task(tokens: Arc<TokenService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match tokens.purge_expired(SystemTime::now()).await {
                Ok(removed) => debug!(removed, "token_store_purged"),
                Err(e) => warn!(error = %e, "token store purge failed"),
            }
        }
    })
}
