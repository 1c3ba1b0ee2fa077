// src/pipeline/scheduler.rs

//! Periodic job driver.
//!
//! Two independent fixed-interval jobs share one store:
//! - Feed reconciliation, on `schedule.reconcile_interval_secs`
//! - Match notification, on `schedule.notify_interval_secs`
//!
//! Each job awaits its own pass before sleeping again, so a job never
//! overlaps itself; the two jobs run as separate tasks, so a slow feed call
//! never delays notification and vice versa. A failed pass is logged and the
//! next tick starts fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::notify::run_notify;
use crate::pipeline::reconcile::run_reconcile;
use crate::services::{FeedClient, FeedSource, HttpMailer, Mailer};
use crate::store::LocalStore;

/// Run both jobs forever. Returns only if a job task dies.
pub async fn run_scheduler(config: Arc<Config>, store: Arc<LocalStore>) -> Result<()> {
    let feed = FeedClient::new(&config.feed)?;
    let mailer = HttpMailer::new(&config.mail)?;

    log::info!(
        "Scheduler starting: reconcile every {}s, notify every {}s",
        config.schedule.reconcile_interval_secs,
        config.schedule.notify_interval_secs
    );

    let reconcile_job = tokio::spawn(reconcile_loop(
        feed,
        Arc::clone(&store),
        config.feed.tail_window,
        Duration::from_secs(config.schedule.reconcile_interval_secs),
    ));
    let notify_job = tokio::spawn(notify_loop(
        store,
        mailer,
        Duration::from_secs(config.schedule.notify_interval_secs),
    ));

    let (reconcile_exit, notify_exit) = tokio::join!(reconcile_job, notify_job);
    reconcile_exit?;
    notify_exit?;
    Ok(())
}

async fn reconcile_loop(
    feed: impl FeedSource,
    store: Arc<LocalStore>,
    window: u32,
    every: Duration,
) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match run_reconcile(&feed, store.as_ref(), window).await {
            Ok(summary) => log::info!(
                "Reconcile pass done: {} upserted, {} skipped",
                summary.upserted,
                summary.skipped
            ),
            Err(e) => log::error!("Reconcile pass failed: {e}"),
        }
    }
}

async fn notify_loop(store: Arc<LocalStore>, mailer: impl Mailer, every: Duration) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match run_notify(store.as_ref(), store.as_ref(), &mailer).await {
            Ok(summary) if summary.candidates > 0 => log::info!(
                "Notify pass done: {} sent, {} skipped, {} failed",
                summary.sent,
                summary.skipped,
                summary.failed
            ),
            Ok(_) => log::debug!("Notify pass done: no candidates"),
            Err(e) => log::error!("Notify pass failed: {e}"),
        }
    }
}
