use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::CredentialStore;

/// Identity of the authenticated user as reported by the identity endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Identity {
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Identity of a session restored from a stored credential alone
    pub fn restored() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("restored session")
    }
}

/// Derived authentication state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "identity", rename_all = "lowercase")]
pub enum Session {
    Absent,
    Present(Identity),
}

impl Session {
    pub fn is_present(&self) -> bool {
        matches!(self, Session::Present(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Present(identity) => Some(identity),
            Session::Absent => None,
        }
    }
}

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct SessionState {
    current: Session,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Process-wide authentication state with change notification.
///
/// Cloning yields another handle to the same state. Callers own the pairing
/// with the credential store: write the store before `set_authenticated`, and
/// clear it together with `set_unauthenticated`.
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<Mutex<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_session(Session::Absent)
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                current: session,
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Initialize from the credential store at process start.
    /// A store read failure counts as no credential.
    pub async fn from_store(store: &dyn CredentialStore) -> Self {
        let session = match store.get().await {
            Ok(Some(_)) => Session::Present(Identity::restored()),
            Ok(None) => Session::Absent,
            Err(e) => {
                tracing::warn!("Could not read credential store, starting unauthenticated: {}", e);
                Session::Absent
            }
        };
        Self::with_session(session)
    }

    pub fn current(&self) -> Session {
        self.lock().current.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().current.is_present()
    }

    pub fn set_authenticated(&self, identity: Identity) {
        tracing::info!("Session authenticated as {}", identity.display());
        self.transition(Session::Present(identity));
    }

    /// Returns whether a session was actually ended
    pub fn set_unauthenticated(&self) -> bool {
        let changed = self.transition(Session::Absent);
        if changed {
            tracing::info!("Session ended");
        }
        changed
    }

    /// Register a listener for session transitions. Listeners run
    /// synchronously, in subscription order, until the handle is dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn transition(&self, next: Session) -> bool {
        let listeners: Vec<Listener> = {
            let mut state = self.lock();
            if state.current == next {
                return false;
            }
            state.current = next.clone();
            state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        // Run outside the lock so listeners may read the session
        for listener in listeners {
            listener(&next);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Listeners never run under this lock
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionContext")
            .field("current", &state.current)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Handle returned by [`SessionContext::on_change`]
pub struct Subscription {
    id: u64,
    state: std::sync::Weak<Mutex<SessionState>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
