//! Business logic services

pub mod alerts;
pub mod dashboard;
pub mod monitor;
pub mod presence;
pub mod search;
pub mod visitors;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub visitors: visitors::VisitorsService,
    pub alerts: alerts::AlertsService,
    pub dashboard: dashboard::DashboardService,
    pub presence: presence::PresenceService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let policy = alerts::AlertPolicy::from(&config.alerts);
        Self {
            visitors: visitors::VisitorsService::new(repository.clone()),
            alerts: alerts::AlertsService::new(repository.clone(), policy),
            dashboard: dashboard::DashboardService::new(repository.clone(), policy),
            presence: presence::PresenceService::new(repository, &config.presence),
        }
    }
}
