//! Dashboard figures

use serde::Serialize;

use super::alert::AlertSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Visitors currently on the premises
    pub checked_in: usize,
    pub checked_in_foot: usize,
    pub checked_in_vehicle: usize,
    /// Check-ins since midnight UTC
    pub visitors_today: usize,
    /// Check-outs since midnight UTC
    pub checked_out_today: usize,
    /// Visitors on the premises without an issued tag
    pub without_tag: usize,
    pub alerts: AlertSummary,
}
