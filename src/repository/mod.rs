//! Repository layer over the external backend

pub mod presence;
pub mod visitors;

use std::sync::Arc;

pub use presence::{MemoryPresenceStore, PresenceStore};
pub use visitors::{MemoryVisitorStore, VisitorStore, VisitorSubscription};

/// Backend handles shared by all services. Stores are injected here rather
/// than reached through a global, so tests can substitute fakes.
#[derive(Clone)]
pub struct Repository {
    pub visitors: Arc<dyn VisitorStore>,
    pub presence: Arc<dyn PresenceStore>,
}

impl Repository {
    /// Create a repository over the given stores
    pub fn new(visitors: Arc<dyn VisitorStore>, presence: Arc<dyn PresenceStore>) -> Self {
        Self { visitors, presence }
    }

    /// Repository backed by empty in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryVisitorStore::default()),
            Arc::new(MemoryPresenceStore::default()),
        )
    }
}
