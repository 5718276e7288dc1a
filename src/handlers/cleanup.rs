use std::sync::Arc;

use anyhow::{Error, Result};
use chrono::{Duration, Utc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::{clients::store::Store, config::Config};

/// Purges push tokens the transport reported as unregistered since the last
/// run.
pub async fn cleanup_invalid_tokens(store: &dyn Store) -> Result<u64, Error> {
    info!("Cleaning up invalid push tokens");

    let cleared = store.purge_invalid_tokens().await?;

    if cleared == 0 {
        info!("No invalid tokens to clean up");
    } else {
        info!(cleared, "Invalid push tokens removed from user records");
    }

    Ok(cleared)
}

/// Deletes processed queue records older than the retention window as one
/// batch.
pub async fn cleanup_old_notifications(
    store: &dyn Store,
    retention_days: i64,
) -> Result<u64, Error> {
    info!("Cleaning up old queued notifications");

    let cutoff = Utc::now() - Duration::days(retention_days);
    let deleted = store.delete_processed_notifications_before(cutoff).await?;

    if deleted == 0 {
        info!("No old notifications to clean up");
    } else {
        info!(deleted, "Old queued notifications deleted");
    }

    Ok(deleted)
}

/// Fires both cleanup jobs on a fixed recurring cadence. Each tick is a
/// single attempt; a failed job waits for the next tick.
pub async fn run_cleanup_scheduler(config: Config, store: Arc<dyn Store>) {
    let period = time::Duration::from_secs(config.cleanup_interval_hours * 60 * 60);
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately; consume it so the jobs first run
    // one full period after startup.
    interval.tick().await;

    info!(
        interval_hours = config.cleanup_interval_hours,
        "Cleanup scheduler started"
    );

    loop {
        interval.tick().await;

        if let Err(e) = cleanup_invalid_tokens(store.as_ref()).await {
            error!(error = %e, "Invalid-token cleanup failed");
        }

        if let Err(e) =
            cleanup_old_notifications(store.as_ref(), config.processed_retention_days).await
        {
            error!(error = %e, "Old-notification cleanup failed");
        }
    }
}
