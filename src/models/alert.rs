//! Overdue alert types

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::visitor::Visitor;

/// Severity tier derived from hours since check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AlertBucket::Low => "low",
            AlertBucket::Medium => "medium",
            AlertBucket::High => "high",
            AlertBucket::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Result of classifying one checked-in visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub hours_overdue: i64,
    pub bucket: AlertBucket,
}

/// Checked-in visitor annotated for the alerts screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueVisitor {
    pub visitor: Visitor,
    pub hours_overdue: i64,
    pub bucket: AlertBucket,
    /// e.g. "13h", "1d 6h"
    pub duration: String,
}

/// Counts over the overdue set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

/// Everything the alerts screen renders for one evaluation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertReport {
    pub generated_at: DateTime<Utc>,
    pub summary: AlertSummary,
    /// Most overdue first
    pub visitors: Vec<OverdueVisitor>,
}
