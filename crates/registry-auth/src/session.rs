//! Ephemeral authorization-flow sessions
//!
//! The generic OIDC authorization-code flow needs to remember the `state`
//! and `nonce` it handed out between the redirect to the provider and the
//! callback. Sessions live in an in-process concurrent map keyed by the
//! opaque random state string; entries are independent, so per-key locking
//! from the map is all the synchronization required.
//!
//! A session is valid once and only within five minutes of creation:
//! expired entries are swept on every access and `take` deletes on first
//! use, so a replayed or stale callback never finds its session. The
//! in-process map is a deliberate deployment default; an installation
//! that must survive restarts mid-flow can put an external expiring store
//! behind the same insert/take surface in its adapter layer.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;

/// Default session lifetime.
const SESSION_TTL_MINUTES: i64 = 5;

/// Length of generated state and nonce strings.
const OPAQUE_TOKEN_LENGTH: usize = 32;

/// Generate an opaque random alphanumeric string for state/nonce values.
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(OPAQUE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// A pending authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque state value, also the storage key.
    pub state: String,

    /// Nonce expected inside the returned ID token.
    pub nonce: String,

    /// Redirect URI the flow was started with.
    pub redirect_uri: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a session with fresh random state and nonce.
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            state: random_state(),
            nonce: random_state(),
            redirect_uri: redirect_uri.into(),
            created_at: Utc::now(),
        }
    }

    /// Check if the session has outlived its lifetime at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(SESSION_TTL_MINUTES)
    }
}

/// Concurrent store of pending authorization sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, AuthSession>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session keyed by its state.
    pub fn insert(&self, session: AuthSession) {
        self.sweep(Utc::now());
        self.sessions.insert(session.state.clone(), session);
    }

    /// Consume the session for `state`, if it exists and has not expired.
    ///
    /// The entry is removed either way; a second take with the same state
    /// returns `None`.
    pub fn take(&self, state: &str) -> Option<AuthSession> {
        let now = Utc::now();
        self.sweep(now);
        self.sessions
            .remove(state)
            .map(|(_, session)| session)
            .filter(|session| !session.is_expired_at(now))
    }

    /// Drop every expired entry.
    fn sweep(&self, now: DateTime<Utc>) {
        self.sessions
            .retain(|_, session| !session.is_expired_at(now));
    }

    /// Number of pending sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
