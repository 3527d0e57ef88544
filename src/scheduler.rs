//! Cron-driven trigger for sync cycles.
//!
//! The scheduler only decides *when* to sync. Each firing spawns the cycle on its
//! own task; overlapping firings are turned away by [`SyncService::sync`].

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use croner::Cron;
use log::{error, info};
use std::future::Future;

use crate::constants::LOG_SCHEDULED_SYNC;
use crate::sync::{SyncService, SyncStatus};

/// A parsed cron expression.
pub struct CronSchedule {
    expression: String,
    cron: Cron,
}

impl std::fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronSchedule").field("expression", &self.expression).finish()
    }
}

impl CronSchedule {
    /// Parse a cron expression: five fields (minute hour day-of-month month day-of-week),
    /// optionally preceded by a seconds field.
    pub fn parse(expression: &str) -> Result<Self> {
        let cron = Cron::new(expression.trim())
            .with_seconds_optional()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid cron expression '{}': {}", expression, e))?;
        Ok(Self {
            expression: expression.trim().to_string(),
            cron,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.cron.find_next_occurrence(after, false).ok()
    }
}

/// Run `service` immediately (when asked) and then on every occurrence of `schedule`
/// until `shutdown` completes.
pub async fn run<S>(service: SyncService, schedule: CronSchedule, run_on_startup: bool, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if run_on_startup {
        spawn_cycle(service.clone());
    }

    info!("⏰ Scheduler started with schedule '{}'", schedule.expression());

    // An occurrence fires once even if the timer wakes before the wall clock reaches it
    let mut last_fired = Local::now();

    loop {
        let now = Local::now();
        let next = schedule
            .next_after(&now.max(last_fired))
            .with_context(|| format!("Schedule '{}' has no upcoming occurrence", schedule.expression()))?;
        let wait = (next - now).to_std().unwrap_or_default();
        info!("⏰ Next sync at {}", next.format("%Y-%m-%d %H:%M:%S"));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                info!("{}", LOG_SCHEDULED_SYNC);
                last_fired = next;
                spawn_cycle(service.clone());
            }
            _ = &mut shutdown => {
                info!("👋 Scheduler stopping");
                return Ok(());
            }
        }
    }
}

fn spawn_cycle(service: SyncService) {
    tokio::spawn(async move {
        match service.sync().await {
            Ok(SyncStatus::Error { message }) => error!("❌ Sync cycle skipped: {message}"),
            Ok(_) => {}
            Err(e) => error!("❌ Sync cycle aborted: {e:#}"),
        }
    });
}
