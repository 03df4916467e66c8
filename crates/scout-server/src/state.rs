use scout::session::ChatSession;
use scout::turn::AgentConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent_config: Arc<AgentConfig>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(agent_config: AgentConfig, session_ttl: Duration) -> Self {
        Self {
            agent_config: Arc::new(agent_config),
            sessions: SessionRegistry::new(session_ttl),
        }
    }
}

struct SessionSlot {
    session: Arc<Mutex<ChatSession>>,
    last_active: Instant,
}

/// In-memory sessions keyed by id. Each session has its own lock, held for
/// the whole of a turn; the map lock is only held for lookups.
#[derive(Clone)]
pub struct SessionRegistry {
    slots: Arc<Mutex<HashMap<Uuid, SessionSlot>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Register a fresh session and return a copy of it
    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new();
        let snapshot = session.clone();
        self.slots.lock().await.insert(
            session.id(),
            SessionSlot {
                session: Arc::new(Mutex::new(session)),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session = %snapshot.id(), "session created");
        snapshot
    }

    /// Look up a session and mark it active
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        let mut slots = self.slots.lock().await;
        let slot = slots.get_mut(id)?;
        slot.last_active = Instant::now();
        Some(slot.session.clone())
    }

    pub async fn touch(&self, id: &Uuid) {
        if let Some(slot) = self.slots.lock().await.get_mut(id) {
            slot.last_active = Instant::now();
        }
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.slots.lock().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session removed");
        }
        removed
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Drop sessions idle for longer than the ttl. Sessions in the middle of a
    /// turn are kept.
    pub async fn sweep(&self, now: Instant) -> usize {
        let ttl = self.ttl;
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, slot| {
            let idle = now.saturating_duration_since(slot.last_active);
            idle <= ttl || slot.session.try_lock().is_err()
        });
        let removed = before - slots.len();
        if removed > 0 {
            tracing::info!(removed, remaining = slots.len(), "expired sessions swept");
        }
        removed
    }

    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.sweep(Instant::now()).await;
            }
        })
    }
}
