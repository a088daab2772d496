//! Periodic purge of expired pending reports
//!
//! Reads already treat reports past their TTL as absent, so this task is
//! pure housekeeping: it physically deletes the stale rows on an interval.
//! Deleting a report that a confirmation just consumed is a no-op, never
//! an error, so racing the reconciliation protocol is harmless.

use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use ladder_common::config::LadderConfig;
use ladder_common::{time, Result};

/// Background sweeper for expired pending reports
pub struct ReportSweeper {
    db: SqlitePool,
    ttl_minutes: i64,
    period: Duration,
}

/// Handle to a running sweeper; dropping it leaves the task running, call
/// [`SweeperHandle::shutdown`] for an orderly stop.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for its loop to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl ReportSweeper {
    pub fn new(db: SqlitePool, config: &LadderConfig) -> Self {
        Self {
            db,
            ttl_minutes: config.reports.ttl_minutes,
            period: Duration::from_secs(config.reports.sweep_interval_minutes * 60),
        }
    }

    /// Spawn the sweep loop as a background task
    pub fn spawn(self) -> SweeperHandle {
        info!(
            "Starting pending-report sweeper (TTL {} min, every {} s)",
            self.ttl_minutes,
            self.period.as_secs()
        );

        let (shutdown, mut watch_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut timer = interval(self.period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        if let Err(e) = sweep_expired(&self.db, self.ttl_minutes).await {
                            error!("pending-report sweep failed: {}", e);
                        }
                    }
                    _ = watch_rx.changed() => break,
                }
            }
        });

        SweeperHandle { shutdown, task }
    }
}

/// Delete every pending report older than the TTL; returns the count
pub async fn sweep_expired(db: &SqlitePool, ttl_minutes: i64) -> Result<u64> {
    let cutoff = time::ttl_cutoff(ttl_minutes);
    let deleted = sqlx::query("DELETE FROM pending_reports WHERE created_at < ?")
        .bind(&cutoff)
        .execute(db)
        .await?
        .rows_affected();

    if deleted > 0 {
        info!("purged {} expired pending reports", deleted);
    }
    Ok(deleted)
}
