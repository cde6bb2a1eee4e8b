//! Data models for Visitor Desk

pub mod alert;
pub mod dashboard;
pub mod enums;
pub mod presence;
pub mod timestamp;
pub mod visitor;

// Re-export commonly used types
pub use alert::{AlertBucket, AlertReport, AlertSummary, Classification, OverdueVisitor};
pub use dashboard::DashboardStats;
pub use enums::{Gender, VisitorType};
pub use presence::{Presence, PresenceState};
pub use timestamp::to_point_in_time;
pub use visitor::{CheckInVisitor, UpdateVisitor, Visitor, VisitorFilter, VisitorPatch};
