//! Live alert monitor.
//!
//! Holds a subscription to the checked-in visitors and re-evaluates the
//! alert report whenever the set changes and on every refresh tick, since
//! elapsed hours grow even when no record does.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::{
    error::AppResult,
    models::{
        alert::{AlertReport, AlertSummary},
        visitor::VisitorFilter,
    },
    repository::Repository,
};

use super::alerts::AlertPolicy;

pub struct AlertMonitor {
    repository: Repository,
    policy: AlertPolicy,
    refresh: Duration,
    reports: watch::Sender<AlertReport>,
}

impl AlertMonitor {
    pub fn new(repository: Repository, policy: AlertPolicy, refresh: Duration) -> Self {
        let (reports, _) = watch::channel(policy.report(&[], Utc::now()));
        Self {
            repository,
            policy,
            refresh,
            reports,
        }
    }

    /// Receiver for published reports
    pub fn reports(&self) -> watch::Receiver<AlertReport> {
        self.reports.subscribe()
    }

    /// Run until `shutdown` resolves or the store goes away. The store
    /// subscription is released on return.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> AppResult<()> {
        let mut subscription = self
            .repository
            .visitors
            .subscribe(VisitorFilter::CheckedIn)
            .await?;
        let mut visitors = subscription.current();

        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(
            "Alert monitor started, refreshing every {}s",
            self.refresh.as_secs()
        );

        let mut last: Option<AlertSummary> = None;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
                changed = subscription.changed() => match changed {
                    Some(current) => visitors = current,
                    None => {
                        tracing::warn!("Visitor store closed, stopping alert monitor");
                        break;
                    }
                },
            }

            let report = self.policy.report(&visitors, Utc::now());
            tracing::debug!(
                "Recomputed alerts over {} checked-in visitors",
                visitors.len()
            );
            if last != Some(report.summary) {
                log_summary(&report.summary);
                last = Some(report.summary);
            }
            self.reports.send_replace(report);
        }

        tracing::info!("Alert monitor stopped");
        Ok(())
    }
}

fn log_summary(summary: &AlertSummary) {
    if summary.critical > 0 {
        tracing::warn!(
            "{} overdue visitors ({} critical, {} high, {} medium)",
            summary.total,
            summary.critical,
            summary.high,
            summary.medium
        );
    } else {
        tracing::info!(
            "{} overdue visitors ({} high, {} medium)",
            summary.total,
            summary.high,
            summary.medium
        );
    }
}
