//! Session state.
//!
//! A [`Session`] is an explicit handle shared by the workflows. It starts
//! `Unresolved` and is moved to `SignedIn` or `SignedOut` by each auth-state
//! event from the provider, indefinitely.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use drivex_core::OwnerId;

use crate::backend::AuthSubscription;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::SessionIdentity;

/// Auth state as seen by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No auth event received yet; auth-gated UI must not decide anything.
    #[default]
    Unresolved,
    SignedIn(SessionIdentity),
    SignedOut,
}

impl SessionState {
    #[must_use]
    pub const fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Unresolved | Self::SignedOut => None,
        }
    }
}

impl From<Option<SessionIdentity>> for SessionState {
    fn from(identity: Option<SessionIdentity>) -> Self {
        identity.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Shared session handle. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct Session {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unresolved);
        Self { tx: Arc::new(tx) }
    }

    /// Apply one auth-state event.
    pub fn apply(&self, identity: Option<SessionIdentity>) {
        match &identity {
            Some(who) => {
                set_sentry_user(&who.uid, who.email.as_deref());
                info!(uid = %who.uid, "Session signed in");
            }
            None => {
                clear_sentry_user();
                info!("Session signed out");
            }
        }
        self.tx.send_replace(identity.into());
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// True only until the first auth event.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.tx.borrow(), SessionState::Unresolved)
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        matches!(*self.tx.borrow(), SessionState::SignedIn(_))
    }

    #[must_use]
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.tx.borrow().identity().cloned()
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<OwnerId> {
        self.tx.borrow().identity().map(|who| who.uid.clone())
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Apply auth events until the provider drops the subscription.
    pub async fn follow(&self, mut events: AuthSubscription) {
        while let Some(identity) = events.recv().await {
            self.apply(identity);
        }
    }

    /// Apply the events already queued on a subscription without waiting.
    ///
    /// Returns the number of events applied.
    pub fn drain(&self, events: &mut AuthSubscription) -> usize {
        let mut applied = 0;
        while let Ok(identity) = events.try_recv() {
            self.apply(identity);
            applied += 1;
        }
        applied
    }

    /// Wait until the first auth event has been applied.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.watch();
        match rx
            .wait_for(|state| !matches!(state, SessionState::Unresolved))
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}
