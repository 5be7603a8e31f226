//! Per-session conversational history.
//!
//! Sessions are created lazily on first unseen id and live for the life of
//! the process. The outer map is read-locked for lookups so sessions mutate
//! concurrently across ids, while the per-session mutex serializes appends
//! within one session. History is append-only except on explicit clear.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use mnemo_core::message::ChatMessage;

/// One caller-keyed conversation.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

/// Process-scoped store of session records.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRecord>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, session_id: &str) -> Arc<Mutex<SessionRecord>> {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(record) = sessions.get(session_id) {
                return Arc::clone(record);
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!("Creating session {}", session_id);
            Arc::new(Mutex::new(SessionRecord {
                id: session_id.to_string(),
                history: Vec::new(),
                created_at: Utc::now(),
            }))
        }))
    }

    /// Snapshot of a session's history, creating the session if unseen.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        let record = self.record(session_id);
        let guard = record.lock().unwrap_or_else(|e| e.into_inner());
        guard.history.clone()
    }

    /// Append one completed turn (user prompt plus assistant answer).
    ///
    /// Both messages land atomically, so a session never records half a
    /// turn.
    pub fn append_turn(&self, session_id: &str, user: ChatMessage, assistant: ChatMessage) {
        let record = self.record(session_id);
        let mut guard = record.lock().unwrap_or_else(|e| e.into_inner());
        guard.history.push(user);
        guard.history.push(assistant);
    }

    /// Explicitly clear a session's history.
    pub fn clear(&self, session_id: &str) {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(record) = sessions.get(session_id) {
                let mut guard = record.lock().unwrap_or_else(|e| e.into_inner());
                guard.history.clear();
            }
        }
    }

    /// Creation time of a session, if it exists.
    pub fn created_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let sessions = self.sessions.read().ok()?;
        let record = sessions.get(session_id)?;
        let guard = record.lock().ok()?;
        Some(guard.created_at)
    }

    /// Ids of all known sessions, sorted.
    pub fn session_ids(&self) -> Vec<String> {
        let sessions = match self.sessions.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of known sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no session has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
