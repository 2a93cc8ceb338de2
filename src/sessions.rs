use crate::models::Session;
use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::debug;

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Per-session counters keyed by the client-supplied session id.
///
/// Ids are unauthenticated, so the store is capped: inserting into a full
/// store evicts the least recently seen session.
#[derive(Debug)]
pub struct SessionStore {
    sessions: LruCache<String, Session>,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        let cap = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: LruCache::new(cap),
        }
    }

    /// Looks a session up without marking it as seen.
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.peek(session_id)
    }

    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    pub fn upsert(&mut self, session_id: &str, now_ms: i64) -> &mut Session {
        if !self.sessions.contains(session_id) && self.sessions.len() >= self.sessions.cap().get() {
            if let Some((evicted, _)) = self.sessions.pop_lru() {
                debug!(session_id = %evicted, "session store full, evicting least recently seen");
            }
        }

        let session = self
            .sessions
            .get_or_insert_mut(session_id.to_string(), || Session::new(now_ms));
        session.last_seen = now_ms;
        session
    }

    /// Removes sessions whose age since start exceeds `max_age_ms`.
    /// Activity after the start does not extend a session's lifetime.
    pub fn sweep(&mut self, now_ms: i64, max_age_ms: i64) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| now_ms.saturating_sub(session.start_time) > max_age_ms)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.sessions.pop(id.as_str());
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}
