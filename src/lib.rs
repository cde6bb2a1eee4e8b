//! Visitor Desk
//!
//! View-model core for a visitor desk: check-in and check-out flows, record
//! edits, dashboard figures, overdue-visitor alerts and free-text search over
//! visitor records kept in an external document store.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by every screen
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: repository::Repository,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository.clone(), &config);
        Self {
            config: Arc::new(config),
            repository,
            services: Arc::new(services),
        }
    }

    /// Alert monitor over this state's store, using the configured policy
    pub fn alert_monitor(&self) -> services::monitor::AlertMonitor {
        services::monitor::AlertMonitor::new(
            self.repository.clone(),
            self.services.alerts.policy(),
            self.config.alerts.refresh_interval(),
        )
    }
}
