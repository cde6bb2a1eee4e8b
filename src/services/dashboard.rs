//! Dashboard service

use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        dashboard::DashboardStats,
        enums::VisitorType,
        visitor::{Visitor, VisitorFilter},
    },
    repository::Repository,
};

use super::alerts::AlertPolicy;

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    policy: AlertPolicy,
}

impl DashboardService {
    pub fn new(repository: Repository, policy: AlertPolicy) -> Self {
        Self { repository, policy }
    }

    /// Current dashboard figures
    pub async fn stats(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let visitors = self.repository.visitors.list(VisitorFilter::All).await?;
        Ok(compute(&visitors, now, &self.policy))
    }
}

/// Dashboard figures over a full visitor list
pub fn compute(visitors: &[Visitor], now: DateTime<Utc>, policy: &AlertPolicy) -> DashboardStats {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .unwrap_or(now);

    let mut stats = DashboardStats::default();
    for v in visitors {
        if v.time_in >= midnight {
            stats.visitors_today += 1;
        }
        if v.time_out.is_some_and(|t| t >= midnight) {
            stats.checked_out_today += 1;
        }
        if v.is_checked_out {
            continue;
        }
        stats.checked_in += 1;
        match v.visitor_type {
            VisitorType::Foot => stats.checked_in_foot += 1,
            VisitorType::Vehicle => stats.checked_in_vehicle += 1,
        }
        if v.real_tag().is_none() {
            stats.without_tag += 1;
        }
    }

    stats.alerts = policy.report(visitors, now).summary;
    stats
}
