//! Session credential state shared by every request the client sends.
//!
//! Credentials live in a [`SessionStore`], a string key-value contract with
//! fixed key names. The [`SessionContext`] wraps a store together with an
//! observer registry so UI layers can react to login, refresh, and logout
//! without ambient global events.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Storage key holding the short-lived bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key holding the long-lived refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key holding the serialized user profile. Owned by UI callers;
/// the session layer never reads or writes it.
pub const USER_KEY: &str = "user";

/// A login-issued credential pair.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Absent when the backend issues only a short-lived access token; such
    /// a session cannot recover from an expired access token.
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credentials stay out of logs.
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Session lifecycle notifications delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A credential pair was established after a successful login.
    LoggedIn,
    /// The access token was replaced after a successful refresh.
    TokenRefreshed,
    /// Both credentials were removed.
    LoggedOut,
}

/// String key-value storage backing a session.
///
/// Writes are last-write-wins; no ordering is guaranteed between writers
/// racing on the same key.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory [`SessionStore`], the default for native clients and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

/// Identifier returned by [`SessionContext::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SessionCallback = Box<dyn Fn(&SessionEvent) + Send + Sync>;

struct SessionInner {
    store: Arc<dyn SessionStore>,
    observers: RwLock<Vec<(SubscriptionId, SessionCallback)>>,
    next_subscription: AtomicU64,
}

/// Cheap-clone handle over the credential state shared by every client clone.
///
/// Constructed once and injected into the HTTP client; all clones observe the
/// same store and the same subscriber registry.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl SessionContext {
    /// Create a context over an existing store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                observers: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    /// Create a context over a fresh [`MemorySessionStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// The stored access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.inner.store.get(ACCESS_TOKEN_KEY)
    }

    /// The stored refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.store.get(REFRESH_TOKEN_KEY)
    }

    /// Whether an access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Store a freshly issued credential pair and notify subscribers. A pair
    /// without a refresh token removes any previously stored one.
    pub fn establish(&self, tokens: &TokenPair) {
        self.inner.store.set(ACCESS_TOKEN_KEY, &tokens.access_token);
        match &tokens.refresh_token {
            Some(refresh_token) => self.inner.store.set(REFRESH_TOKEN_KEY, refresh_token),
            None => self.inner.store.remove(REFRESH_TOKEN_KEY),
        }
        debug!("session established");
        self.emit(&SessionEvent::LoggedIn);
    }

    /// Replace the access token after a successful refresh and notify
    /// subscribers. The refresh token is left untouched.
    pub fn store_access_token(&self, token: &str) {
        self.inner.store.set(ACCESS_TOKEN_KEY, token);
        debug!("access token replaced");
        self.emit(&SessionEvent::TokenRefreshed);
    }

    /// Remove both credentials and notify subscribers. Other keys, including
    /// [`USER_KEY`], are left to their owners.
    pub fn clear(&self) {
        self.inner.store.remove(ACCESS_TOKEN_KEY);
        self.inner.store.remove(REFRESH_TOKEN_KEY);
        debug!("session cleared");
        self.emit(&SessionEvent::LoggedOut);
    }

    /// Register a callback invoked synchronously after every session change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        let mut observers = self
            .inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        observers.push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut observers = self
            .inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// The underlying store, for keys owned by callers (e.g. [`USER_KEY`]).
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    fn emit(&self, event: &SessionEvent) {
        let observers = self
            .inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in observers.iter() {
            callback(event);
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
