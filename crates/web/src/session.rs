//! Server-side session table.
//!
//! Sessions are keyed by a random 31-bit [`SessionId`] carried in the `__SESSION` cookie and
//! hold free-form json values. The table is shared by every connection through an
//! `Arc<SessionStore>`.

use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

/// Name of the cookie that carries the session id.
pub const SESSION_COOKIE_NAME: &str = "__SESSION";

const SESSION_ID_BITS: u32 = 31;
const SESSION_ID_MIN: u32 = 1 << (SESSION_ID_BITS - 1);
const SESSION_ID_MAX: u32 = 1 << SESSION_ID_BITS;

/// Session identifier, rendered as lowercase hex in the session cookie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u32);

impl SessionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// A random id in `[2^30, 2^31)`, so its hex form is always eight digits wide.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(SESSION_ID_MIN..SESSION_ID_MAX))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16).map(Self)
    }
}

type SessionData = HashMap<String, Value>;

/// Concurrent table of session data keyed by [`SessionId`].
///
/// Sessions are never expired by the store itself. Without a limit every created session stays
/// until [`remove`](Self::remove) or [`clear`](Self::clear); with
/// [`with_max_sessions`](Self::with_max_sessions) creating a session past the limit evicts an
/// arbitrary existing one.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionData>,
    max_sessions: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `max_sessions` sessions (at least one).
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self { sessions: DashMap::new(), max_sessions: Some(max_sessions.max(1)) }
    }

    #[inline]
    pub fn max_sessions(&self) -> Option<usize> {
        self.max_sessions
    }

    /// Allocates a fresh, unused id with empty data, evicting a session first when full.
    pub fn create(&self) -> SessionId {
        if let Some(max_sessions) = self.max_sessions {
            while self.sessions.len() >= max_sessions {
                let Some(victim) = self.sessions.iter().next().map(|entry| *entry.key()) else {
                    break;
                };
                self.sessions.remove(&victim);
                debug!(session = %victim, max_sessions, "evicted session");
            }
        }

        loop {
            let id = SessionId::random();
            // the entry guard makes the collision check and the insert one step
            if let Entry::Vacant(entry) = self.sessions.entry(id) {
                entry.insert(SessionData::new());
                debug!(session = %id, "created session");
                return id;
            }
        }
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn get(&self, id: SessionId, key: &str) -> Option<Value> {
        self.sessions.get(&id).and_then(|data| data.get(key).cloned())
    }

    /// Stores `value` under `key`, creating the session if it was removed meanwhile.
    pub fn insert(&self, id: SessionId, key: impl Into<String>, value: Value) -> Option<Value> {
        self.sessions.entry(id).or_default().insert(key.into(), value)
    }

    pub fn remove_value(&self, id: SessionId, key: &str) -> Option<Value> {
        self.sessions.get_mut(&id).and_then(|mut data| data.remove(key))
    }

    /// Destroys a session; returns whether it existed.
    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops every session, e.g. on server teardown.
    pub fn clear(&self) {
        self.sessions.clear();
    }
}

/// Handle to one session, attached to a request by
/// [`SessionMiddleware`](crate::middleware::SessionMiddleware).
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<SessionStore>,
}

impl Session {
    pub fn new(id: SessionId, store: Arc<SessionStore>) -> Self {
        Self { id, store }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(self.id, key)
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.store.insert(self.id, key, value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.store.remove_value(self.id, key)
    }
}
