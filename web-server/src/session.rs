//! Per-browser page state
//!
//! A browser gets a random session id in the `mindcheck_session` cookie
//! when it presses Get Started; the `Session` value itself stays on the
//! server. Without a known cookie a request is treated as on the landing
//! screen and nothing is stored.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use mindcheck_core::Session;
use parking_lot::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mindcheck_session";

/// Idle sessions older than this are dropped
const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Upper bound on live sessions
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    capacity: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Session named by the request's cookie, if the server still knows it
    pub fn lookup(&self, headers: &HeaderMap) -> Option<(Uuid, Session)> {
        let id = session_id(headers)?;
        let mut sessions = self.inner.write();
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some((id, entry.session.clone()))
    }

    /// Start a fresh session. Expired entries are pruned first; at capacity
    /// the least recently seen one is evicted.
    pub fn create(&self) -> (Uuid, Session) {
        let id = Uuid::new_v4();
        let session = Session::new();
        let mut sessions = self.inner.write();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < SESSION_TTL);
        if sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                tracing::warn!("Session store full ({}), evicted {}", self.capacity, oldest);
            }
        }
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("New session {} ({} active)", id, sessions.len());
        (id, session)
    }

    pub fn save(&self, id: Uuid, session: Session) {
        self.inner.write().insert(
            id,
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: Uuid) -> HeaderValue {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    // A hyphenated uuid is always a valid header value
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcheck_core::Screen;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_new_session_starts_on_landing() {
        let store = SessionStore::new();
        let (_, session) = store.create();
        assert_eq!(session.screen(), Screen::Landing);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_never_creates() {
        let store = SessionStore::new();
        assert!(store.lookup(&HeaderMap::new()).is_none());
        assert!(store
            .lookup(&headers_with(&format!("{}={}", SESSION_COOKIE, Uuid::new_v4())))
            .is_none());
        assert!(store.lookup(&headers_with("mindcheck_session=garbage")).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_saved_session_is_found_by_cookie() {
        let store = SessionStore::new();
        let (id, mut session) = store.create();
        session.get_started();
        store.save(id, session);

        let headers = headers_with(&format!("theme=dark; {}={}", SESSION_COOKIE, id));
        let (same_id, session) = store.lookup(&headers).unwrap();
        assert_eq!(same_id, id);
        assert_eq!(session.screen(), Screen::Form);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = SessionStore::with_capacity(2);
        let (first, _) = store.create();
        std::thread::sleep(Duration::from_millis(2));
        let (second, _) = store.create();
        std::thread::sleep(Duration::from_millis(2));
        let (third, _) = store.create();

        assert_eq!(store.len(), 2);
        let cookie = |id: Uuid| headers_with(&format!("{}={}", SESSION_COOKIE, id));
        assert!(store.lookup(&cookie(first)).is_none());
        assert!(store.lookup(&cookie(second)).is_some());
        assert!(store.lookup(&cookie(third)).is_some());
    }

    #[test]
    fn test_cookie_format() {
        let id = Uuid::new_v4();
        let cookie = session_cookie(id);
        assert!(cookie.to_str().unwrap().starts_with(&format!("mindcheck_session={}", id)));
    }
}
