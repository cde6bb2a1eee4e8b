//! Desk user presence heartbeats

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    config::PresenceConfig,
    error::AppResult,
    models::presence::{Presence, PresenceState},
    repository::Repository,
};

#[derive(Clone)]
pub struct PresenceService {
    repository: Repository,
    heartbeat_interval: Duration,
    stale_after: chrono::Duration,
}

impl PresenceService {
    pub fn new(repository: Repository, config: &PresenceConfig) -> Self {
        Self {
            repository,
            heartbeat_interval: config.heartbeat_interval(),
            stale_after: config.stale_after(),
        }
    }

    /// Mark the user online as of now
    pub async fn heartbeat(&self, user_id: &str) -> AppResult<()> {
        self.write(user_id, PresenceState::Online).await
    }

    pub async fn go_offline(&self, user_id: &str) -> AppResult<()> {
        self.write(user_id, PresenceState::Offline).await
    }

    /// Users online whose last heartbeat is within the stale window
    pub async fn online_users(&self, now: DateTime<Utc>) -> AppResult<Vec<Presence>> {
        let entries = self.repository.presence.list().await?;
        Ok(entries
            .into_iter()
            .filter(|p| {
                p.state == PresenceState::Online && now - p.last_changed <= self.stale_after
            })
            .collect())
    }

    /// Write a heartbeat every interval until the handle is stopped or dropped
    pub fn start_heartbeat(&self, user_id: impl Into<String>) -> HeartbeatHandle {
        let user_id = user_id.into();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let service = self.clone();
        let task_user = user_id.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.heartbeat_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Err(e) = service.heartbeat(&task_user).await {
                            tracing::warn!("Presence heartbeat for {} failed: {}", task_user, e);
                        }
                    }
                }
            }
        });

        tracing::debug!("Started presence heartbeat for {}", user_id);
        HeartbeatHandle {
            user_id,
            service: self.clone(),
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    async fn write(&self, user_id: &str, state: PresenceState) -> AppResult<()> {
        self.repository
            .presence
            .set(Presence {
                user_id: user_id.to_string(),
                state,
                last_changed: Utc::now(),
            })
            .await
    }
}

/// Running heartbeat task for one user
pub struct HeartbeatHandle {
    user_id: String,
    service: PresenceService,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Stop heartbeating and mark the user offline
    pub async fn stop(mut self) -> AppResult<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.service.go_offline(&self.user_id).await?;
        tracing::debug!("Stopped presence heartbeat for {}", self.user_id);
        Ok(())
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
