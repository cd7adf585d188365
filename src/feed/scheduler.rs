// src/feed/scheduler.rs
//! Periodic email-mode loop: one immediate run, then a fixed-interval tick.
//! A failed tick logs and waits for the next one; nothing kills the loop.
//! Overlap is not guarded against, so keep the interval well above the run
//! duration (trivially true at a daily cadence).

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::pipeline;

pub fn spawn_email_scheduler(cfg: Config, use_login: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.check_interval_secs));
        loop {
            // First tick fires immediately, matching the original's
            // run-once-then-schedule startup.
            ticker.tick().await;
            match pipeline::run_email(&cfg, use_login).await {
                Ok(true) => tracing::info!(target: "scheduler", "email tick delivered a question"),
                Ok(false) => tracing::info!(target: "scheduler", "email tick found nothing to send"),
                Err(e) => tracing::warn!(target: "scheduler", error = %e, "email tick failed"),
            }
        }
    })
}
