use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Instruction for the host routing layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    /// Session is missing or was rejected; show the login screen
    ToLogin,
    /// Session already exists; leave login/landing for the default screen
    ToDefault,
}

impl Navigation {
    /// Target path under the given session configuration
    pub fn path<'a>(&self, session: &'a crate::config::SessionConfig) -> &'a str {
        match self {
            Navigation::ToLogin => &session.login_path,
            Navigation::ToDefault => &session.default_path,
        }
    }
}

/// Broadcast channel carrying navigation signals to every subscribed host
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: broadcast::Sender<Navigation>,
}

impl Navigator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.tx.subscribe()
    }

    /// Emit a signal; having no host listening is not an error
    pub fn emit(&self, signal: Navigation) {
        match self.tx.send(signal.clone()) {
            Ok(receivers) => tracing::debug!("Navigation {:?} delivered to {} host(s)", signal, receivers),
            Err(_) => tracing::debug!("Navigation {:?} dropped: no host subscribed", signal),
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(crate::config::config().session.navigation_buffer)
    }
}
