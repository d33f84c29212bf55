//! Periodic removal of expired grants.

use chrono::Utc;
use shop_core::TokenStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn a task purging expired grants every `period`.
///
/// Returns `None` when `period` is zero.
pub fn spawn_expiry_sweeper(store: TokenStore, period: Duration) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        info!("Grant expiry sweeper disabled");
        return None;
    }

    info!("Sweeping expired grants every {}s", period.as_secs());

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.purge_expired(Utc::now());
            if removed > 0 {
                info!("Purged {} expired grants, {} remain", removed, store.len());
            } else {
                debug!("No expired grants to purge");
            }
        }
    }))
}
