//! Overdue visitor alerts.
//!
//! A visitor still on the premises is classified by whole hours elapsed
//! since check-in:
//!
//! | hours            | bucket     |
//! |------------------|------------|
//! | `>= critical`    | `critical` |
//! | `>= high`        | `high`     |
//! | `>= medium`      | `medium`   |
//! | below            | `low`      |
//!
//! Membership in the alert set is decided on the exact elapsed time, which
//! must be strictly greater than the medium threshold. A visitor checked in
//! exactly 12h ago is not overdue yet; one checked in 12h01m ago is, and
//! lands in `medium` because whole hours are still 12.

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::AlertsConfig,
    error::AppResult,
    models::{
        alert::{AlertBucket, AlertReport, AlertSummary, Classification, OverdueVisitor},
        visitor::{Visitor, VisitorFilter},
    },
    repository::Repository,
};

/// Hour thresholds for the alert buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub medium_hours: i64,
    pub high_hours: i64,
    pub critical_hours: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            medium_hours: 12,
            high_hours: 18,
            critical_hours: 24,
        }
    }
}

impl From<&AlertsConfig> for AlertPolicy {
    fn from(config: &AlertsConfig) -> Self {
        Self {
            medium_hours: config.medium_hours,
            high_hours: config.high_hours,
            critical_hours: config.critical_hours,
        }
    }
}

/// Whole hours between check-in and `now`, truncated toward zero.
/// A check-in in the future (clock skew) counts as zero.
pub fn hours_overdue(time_in: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - time_in).num_hours().max(0)
}

/// Render an hour count for display: "23h", "1d", "1d 6h"
pub fn format_duration(hours: i64) -> String {
    if hours < 24 {
        return format!("{}h", hours);
    }
    let (days, rest) = (hours / 24, hours % 24);
    if rest == 0 {
        format!("{}d", days)
    } else {
        format!("{}d {}h", days, rest)
    }
}

/// Classify with the default thresholds
pub fn classify(visitor: &Visitor, now: DateTime<Utc>) -> Option<Classification> {
    AlertPolicy::default().classify(visitor, now)
}

/// Count the overdue set per bucket
pub fn summarize(overdue: &[OverdueVisitor]) -> AlertSummary {
    overdue.iter().fold(
        AlertSummary {
            total: overdue.len(),
            ..Default::default()
        },
        |mut summary, entry| {
            match entry.bucket {
                AlertBucket::Critical => summary.critical += 1,
                AlertBucket::High => summary.high += 1,
                AlertBucket::Medium => summary.medium += 1,
                AlertBucket::Low => {}
            }
            summary
        },
    )
}

impl AlertPolicy {
    pub fn bucket_for(&self, hours: i64) -> AlertBucket {
        if hours >= self.critical_hours {
            AlertBucket::Critical
        } else if hours >= self.high_hours {
            AlertBucket::High
        } else if hours >= self.medium_hours {
            AlertBucket::Medium
        } else {
            AlertBucket::Low
        }
    }

    /// Classify a visitor. Checked-out visitors have no classification.
    pub fn classify(&self, visitor: &Visitor, now: DateTime<Utc>) -> Option<Classification> {
        if visitor.is_checked_out {
            return None;
        }
        let hours = hours_overdue(visitor.time_in, now);
        Some(Classification {
            hours_overdue: hours,
            bucket: self.bucket_for(hours),
        })
    }

    /// Whether the visitor belongs in the alert set
    pub fn is_overdue(&self, visitor: &Visitor, now: DateTime<Utc>) -> bool {
        !visitor.is_checked_out && now - visitor.time_in > Duration::hours(self.medium_hours)
    }

    /// Overdue visitors annotated for display, most overdue first.
    /// Ties keep their input order.
    pub fn overdue_visitors(
        &self,
        visitors: &[Visitor],
        now: DateTime<Utc>,
    ) -> Vec<OverdueVisitor> {
        let mut overdue: Vec<OverdueVisitor> = visitors
            .iter()
            .filter(|v| self.is_overdue(v, now))
            .filter_map(|v| {
                let c = self.classify(v, now)?;
                Some(OverdueVisitor {
                    visitor: v.clone(),
                    hours_overdue: c.hours_overdue,
                    bucket: c.bucket,
                    duration: format_duration(c.hours_overdue),
                })
            })
            .collect();
        overdue.sort_by(|a, b| b.hours_overdue.cmp(&a.hours_overdue));
        overdue
    }

    /// Full evaluation over a visitor list
    pub fn report(&self, visitors: &[Visitor], now: DateTime<Utc>) -> AlertReport {
        let overdue = self.overdue_visitors(visitors, now);
        AlertReport {
            generated_at: now,
            summary: summarize(&overdue),
            visitors: overdue,
        }
    }
}

#[derive(Clone)]
pub struct AlertsService {
    repository: Repository,
    policy: AlertPolicy,
}

impl AlertsService {
    pub fn new(repository: Repository, policy: AlertPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Evaluate alerts over the visitors currently checked in
    pub async fn report(&self, now: DateTime<Utc>) -> AppResult<AlertReport> {
        let visitors = self.repository.visitors.list(VisitorFilter::CheckedIn).await?;
        let report = self.policy.report(&visitors, now);
        tracing::debug!(
            "Alert report: {} overdue out of {} checked in",
            report.summary.total,
            visitors.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::enums::VisitorType;
    use crate::repository::{visitors::MockVisitorStore, MemoryPresenceStore};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap()
    }

    fn visitor(id: &str, ago: Duration) -> Visitor {
        Visitor {
            id: id.to_string(),
            visitor_name: format!("Visitor {}", id),
            phone_number: "0700000000".into(),
            id_number: "1".into(),
            residence: String::new(),
            institution_occupation: String::new(),
            purpose_of_visit: "Meeting".into(),
            gender: None,
            visitor_type: VisitorType::Foot,
            ref_number: None,
            tag_number: None,
            tag_not_given: true,
            time_in: now() - ago,
            time_out: None,
            is_checked_out: false,
        }
    }

    fn hours(h: i64) -> Duration {
        Duration::hours(h)
    }

    #[test]
    fn test_bucket_boundaries() {
        let policy = AlertPolicy::default();
        let cases = [
            (0, AlertBucket::Low),
            (11, AlertBucket::Low),
            (12, AlertBucket::Medium),
            (17, AlertBucket::Medium),
            (18, AlertBucket::High),
            (23, AlertBucket::High),
            (24, AlertBucket::Critical),
            (100, AlertBucket::Critical),
        ];
        for (h, bucket) in cases {
            assert_eq!(policy.bucket_for(h), bucket, "{}h", h);
        }
    }

    #[test]
    fn test_classify_truncates_hours() {
        let v = visitor("a", hours(17) + Duration::minutes(59));
        let c = classify(&v, now()).unwrap();
        assert_eq!(c.hours_overdue, 17);
        assert_eq!(c.bucket, AlertBucket::Medium);
    }

    #[test]
    fn test_classify_checked_out_is_undefined() {
        let mut v = visitor("a", hours(30));
        v.is_checked_out = true;
        v.time_out = Some(now());
        assert!(classify(&v, now()).is_none());
    }

    #[test]
    fn test_future_check_in_counts_as_zero() {
        let v = visitor("a", -hours(2));
        assert_eq!(classify(&v, now()).unwrap().hours_overdue, 0);
    }

    #[test]
    fn test_membership_is_strictly_after_twelve_hours() {
        let policy = AlertPolicy::default();
        let exactly = visitor("exact", hours(12));
        let just_over = visitor("over", hours(12) + Duration::minutes(1));

        assert!(!policy.is_overdue(&exactly, now()));
        assert!(policy.is_overdue(&just_over, now()));

        let overdue = policy.overdue_visitors(&[exactly, just_over], now());
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].visitor.id, "over");
        assert_eq!(overdue[0].bucket, AlertBucket::Medium);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h");
        assert_eq!(format_duration(23), "23h");
        assert_eq!(format_duration(24), "1d");
        assert_eq!(format_duration(30), "1d 6h");
        assert_eq!(format_duration(48), "2d");
    }

    #[test]
    fn test_summary_counts() {
        let visitors: Vec<Visitor> = [13, 19, 25, 11, 24]
            .iter()
            .enumerate()
            .map(|(i, h)| visitor(&i.to_string(), hours(*h)))
            .collect();

        let report = AlertPolicy::default().report(&visitors, now());
        assert_eq!(
            report.summary,
            AlertSummary {
                total: 4,
                critical: 2,
                high: 1,
                medium: 1,
            }
        );
    }

    #[test]
    fn test_sorted_most_overdue_first() {
        let visitors = vec![
            visitor("a", hours(13)),
            visitor("b", hours(25)),
            visitor("c", hours(19)),
        ];
        let order: Vec<i64> = AlertPolicy::default()
            .overdue_visitors(&visitors, now())
            .iter()
            .map(|o| o.hours_overdue)
            .collect();
        assert_eq!(order, vec![25, 19, 13]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let visitors = vec![
            visitor("first", hours(20)),
            visitor("second", hours(20) + Duration::minutes(30)),
        ];
        let ids: Vec<String> = AlertPolicy::default()
            .overdue_visitors(&visitors, now())
            .into_iter()
            .map(|o| o.visitor.id)
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = AlertPolicy {
            medium_hours: 4,
            high_hours: 8,
            critical_hours: 12,
        };
        let report = policy.report(&[visitor("a", hours(5)), visitor("b", hours(12))], now());
        assert_eq!(report.summary.medium, 1);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.visitors[1].duration, "5h");
    }

    #[tokio::test]
    async fn test_service_reads_checked_in_visitors() {
        let mut store = MockVisitorStore::new();
        store
            .expect_list()
            .withf(|filter| *filter == VisitorFilter::CheckedIn)
            .times(1)
            .returning(|_| Ok(vec![visitor("a", hours(30)), visitor("b", hours(2))]));

        let repository = Repository::new(Arc::new(store), Arc::new(MemoryPresenceStore::default()));
        let report = AlertsService::new(repository, AlertPolicy::default())
            .report(now())
            .await
            .unwrap();

        assert_eq!(report.summary.total, 1);
        assert_eq!(report.visitors[0].duration, "1d 6h");
        assert_eq!(report.generated_at, now());
    }

    #[tokio::test]
    async fn test_service_propagates_store_failure() {
        let mut store = MockVisitorStore::new();
        store
            .expect_list()
            .returning(|_| Err(AppError::Store("unavailable".into())));

        let repository = Repository::new(Arc::new(store), Arc::new(MemoryPresenceStore::default()));
        let result = AlertsService::new(repository, AlertPolicy::default()).report(now()).await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
