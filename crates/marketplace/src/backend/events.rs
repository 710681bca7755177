//! Auth-state change fan-out shared by the auth provider implementations.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::models::SessionIdentity;

/// Receiving end of an auth-state subscription.
///
/// Each message is the identity after a change, or `None` once signed out.
pub type AuthSubscription = mpsc::UnboundedReceiver<Option<SessionIdentity>>;

#[derive(Default)]
struct Inner {
    current: Option<SessionIdentity>,
    subscribers: Vec<mpsc::UnboundedSender<Option<SessionIdentity>>>,
}

/// Current identity plus the list of live subscribers.
#[derive(Default)]
pub struct AuthEvents {
    inner: Mutex<Inner>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity most recently published.
    #[must_use]
    pub fn current(&self) -> Option<SessionIdentity> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Open a subscription primed with the current identity.
    pub fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // Receiver is alive, so this cannot fail.
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(tx);
        rx
    }

    /// Record a new identity and deliver it to every live subscriber.
    pub fn publish(&self, identity: Option<SessionIdentity>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.current.clone_from(&identity);
        inner
            .subscribers
            .retain(|tx| tx.send(identity.clone()).is_ok());
        tracing::debug!(
            signed_in = identity.is_some(),
            subscribers = inner.subscribers.len(),
            "Auth state published"
        );
    }
}
