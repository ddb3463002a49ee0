//! Service state: one exploration session per graph.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::backend::GenerationBackend;
use crate::config::{ExplorerConfig, DEFAULT_MAX_SESSIONS};
use crate::explorer::Explorer;
use crate::ids::RandomIds;
use crate::types::GraphId;

/// A session, locked for the duration of each request that touches it.
pub type Session = Arc<Mutex<Explorer<RandomIds>>>;

/// Sessions by graph id, bounded by a capacity.
///
/// Inserting past the capacity evicts the least recently used session.
pub struct SessionRegistry {
    sessions: LruCache<GraphId, Session>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    /// Create an empty registry with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry holding at most `capacity` sessions (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: LruCache::new(capacity),
        }
    }

    /// Maximum number of sessions.
    pub fn capacity(&self) -> usize {
        self.sessions.cap().get()
    }

    /// Register a session under `graph_id`, replacing any previous one.
    ///
    /// Returns the id of the session evicted to make room, if any.
    pub fn insert(&mut self, graph_id: GraphId, session: Session) -> Option<GraphId> {
        match self.sessions.push(graph_id.clone(), session) {
            Some((evicted, _)) if evicted != graph_id => Some(evicted),
            _ => None,
        }
    }

    /// Look up a session and mark it as most recently used.
    pub fn get(&mut self, graph_id: &GraphId) -> Option<Session> {
        self.sessions.get(graph_id).map(Arc::clone)
    }

    /// Drop a session. Returns it if it existed.
    pub fn remove(&mut self, graph_id: &GraphId) -> Option<Session> {
        self.sessions.pop(graph_id)
    }

    /// Registered graph ids in order.
    pub fn ids(&self) -> Vec<GraphId> {
        let mut ids: Vec<GraphId> = self.sessions.iter().map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session exists.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Shared service state.
#[derive(Clone)]
pub struct ServiceState {
    /// Live sessions.
    pub sessions: Arc<RwLock<SessionRegistry>>,
    backend: Option<Arc<dyn GenerationBackend>>,
    config: ExplorerConfig,
}

impl ServiceState {
    /// State whose sessions generate all content locally.
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(SessionRegistry::new())),
            backend: None,
            config,
        }
    }

    /// Keep at most `max_sessions` sessions, evicting the least recently used.
    pub fn with_max_sessions(self, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(SessionRegistry::with_capacity(max_sessions))),
            ..self
        }
    }

    /// Give every new session `backend`.
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Settings applied to new sessions.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Name of the configured backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// A fresh, unregistered explorer.
    pub fn new_explorer(&self) -> Explorer<RandomIds> {
        let explorer = Explorer::with_allocator(RandomIds, self.config.clone());
        match &self.backend {
            Some(backend) => explorer.with_backend(Arc::clone(backend)),
            None => explorer,
        }
    }

    /// Register a started explorer under `graph_id`.
    pub async fn register(&self, graph_id: GraphId, explorer: Explorer<RandomIds>) -> Session {
        let session = Arc::new(Mutex::new(explorer));
        let evicted = self
            .sessions
            .write()
            .await
            .insert(graph_id.clone(), Arc::clone(&session));
        if let Some(evicted) = evicted {
            info!(graph_id = %graph_id, evicted = %evicted, "Session capacity reached, evicted least recently used");
        }
        session
    }

    /// Drop the session for `graph_id`. Returns whether it existed.
    pub async fn remove(&self, graph_id: &GraphId) -> bool {
        let removed = self.sessions.write().await.remove(graph_id).is_some();
        if removed {
            info!(graph_id = %graph_id, "Session removed");
        }
        removed
    }

    /// Look up a session, marking it as recently used.
    pub async fn session(&self, graph_id: &GraphId) -> Option<Session> {
        self.sessions.write().await.get(graph_id)
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let state = ServiceState::new(ExplorerConfig::default());
        let mut explorer = state.new_explorer();
        let graph_id = explorer.start("Pricing").await.unwrap();
        assert!(graph_id.as_str().starts_with("graph-"));

        state.register(graph_id.clone(), explorer).await;
        assert_eq!(state.session_count().await, 1);
        assert!(state.session(&graph_id).await.is_some());
        assert!(state.session(&GraphId::new("graph-missing")).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let state = ServiceState::new(ExplorerConfig::default());
        let mut explorer = state.new_explorer();
        let graph_id = explorer.start("Pricing").await.unwrap();
        state.register(graph_id.clone(), explorer).await;

        assert!(state.remove(&graph_id).await);
        assert!(!state.remove(&graph_id).await);
        assert!(state.session(&graph_id).await.is_none());
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let state = ServiceState::new(ExplorerConfig::default()).with_max_sessions(2);
        let mut ids = Vec::new();
        for topic in ["Pricing", "Hiring"] {
            let mut explorer = state.new_explorer();
            let graph_id = explorer.start(topic).await.unwrap();
            state.register(graph_id.clone(), explorer).await;
            ids.push(graph_id);
        }

        // Touch the older session so the newer one becomes the eviction candidate.
        assert!(state.session(&ids[0]).await.is_some());

        let mut explorer = state.new_explorer();
        let third = explorer.start("Onboarding").await.unwrap();
        state.register(third.clone(), explorer).await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.session(&ids[0]).await.is_some());
        assert!(state.session(&ids[1]).await.is_none());
        assert!(state.session(&third).await.is_some());
    }

    #[test]
    fn test_registry_replace_does_not_evict() {
        let mut registry = SessionRegistry::with_capacity(1);
        assert_eq!(registry.capacity(), 1);
        let session = || Arc::new(Mutex::new(Explorer::with_allocator(RandomIds, ExplorerConfig::default())));

        assert_eq!(registry.insert(GraphId::new("graph-a"), session()), None);
        assert_eq!(registry.insert(GraphId::new("graph-a"), session()), None);
        assert_eq!(
            registry.insert(GraphId::new("graph-b"), session()),
            Some(GraphId::new("graph-a"))
        );
        assert_eq!(registry.ids(), vec![GraphId::new("graph-b")]);
    }

    #[test]
    fn test_backend_name() {
        let state = ServiceState::new(ExplorerConfig::default());
        assert_eq!(state.backend_name(), None);
        let state = state.with_backend(Arc::new(ScriptedBackend::new()));
        assert_eq!(state.backend_name(), Some("scripted"));
    }
}
