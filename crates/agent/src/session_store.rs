use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::domain::session::{ConversationId, Session};

/// Booking sessions keyed by conversation. Each session sits behind its own mutex so a
/// conversation handles one message at a time while others proceed.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ConversationId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `conversation`, creating an inactive one on first use.
    pub async fn session(&self, conversation: &ConversationId) -> Arc<Mutex<Session>> {
        if let Some(existing) = self.sessions.read().await.get(conversation) {
            return existing.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(conversation.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    /// Hands a session back after a turn. A session that is back in its initial state and
    /// held by no other request is dropped, so idle conversations cost nothing.
    pub async fn release(&self, conversation: &ConversationId, handle: Arc<Mutex<Session>>) {
        let mut sessions = self.sessions.write().await;
        let Some(stored) = sessions.get(conversation) else {
            return;
        };
        if !Arc::ptr_eq(stored, &handle) || Arc::strong_count(&handle) > 2 {
            return;
        }
        let idle = match handle.try_lock() {
            Ok(session) => *session == Session::new(),
            Err(_) => false,
        };
        if idle {
            sessions.remove(conversation);
        }
    }

    /// Current preferences without creating a session.
    pub async fn preferences(&self, conversation: &ConversationId) -> PreferenceSet {
        let handle = self.sessions.read().await.get(conversation).cloned();
        match handle {
            Some(session) => session.lock().await.preferences().clone(),
            None => PreferenceSet::default(),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
