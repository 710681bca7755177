//! Marketplace state shared across workflows.

use std::sync::Arc;

use crate::account::AccountService;
use crate::backend::Gateway;
use crate::catalog::CatalogSearch;
use crate::listings::{ListingDeletion, ListingSubmission, OwnerDashboard};
use crate::notice::{Notice, Notifier};
use crate::session::Session;

/// Handles shared by every workflow: the backend gateway, the session and
/// the notifier.
///
/// Cheaply cloneable via `Arc`.
pub struct MarketplaceState<G> {
    inner: Arc<MarketplaceStateInner<G>>,
}

struct MarketplaceStateInner<G> {
    gateway: G,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl<G> Clone for MarketplaceState<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: Gateway> MarketplaceState<G> {
    /// Create the state.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Backend gateway
    /// * `session` - Session handle, usually following `gateway.subscribe()`
    /// * `notifier` - Receiver of user-visible notices
    pub fn new(gateway: G, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(MarketplaceStateInner {
                gateway,
                session,
                notifier,
            }),
        }
    }

    /// Get a reference to the backend gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Get a reference to the session handle.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Report a notice to the user.
    pub fn notify(&self, notice: Notice) {
        self.inner.notifier.notify(notice);
    }

    /// A catalog search with an empty visible set.
    #[must_use]
    pub fn catalog(&self) -> CatalogSearch<G> {
        CatalogSearch::new(self.clone())
    }

    /// A fresh listing form with no pending images.
    #[must_use]
    pub fn submission(&self) -> ListingSubmission<G> {
        ListingSubmission::new(self.clone())
    }

    #[must_use]
    pub fn deletion(&self) -> ListingDeletion<G> {
        ListingDeletion::new(self.clone())
    }

    #[must_use]
    pub fn dashboard(&self) -> OwnerDashboard<G> {
        OwnerDashboard::new(self.clone())
    }

    #[must_use]
    pub fn account(&self) -> AccountService<G> {
        AccountService::new(self.clone())
    }
}
