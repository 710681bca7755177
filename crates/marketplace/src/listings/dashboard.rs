//! Owner dashboard: the signed-in user's own listings.

use thiserror::Error;
use tracing::instrument;

use super::deletion::{DeletionError, DeletionReport, ListingDeletion};
use crate::backend::{BackendError, Gateway, ListingField, ListingQuery, ListingStore};
use crate::error::capture_backend_error;
use crate::models::ListingRecord;
use crate::notice::Notice;
use crate::state::MarketplaceState;

/// Errors loading the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

pub struct OwnerDashboard<G> {
    state: MarketplaceState<G>,
    deletion: ListingDeletion<G>,
    listings: Vec<ListingRecord>,
}

impl<G: Gateway> OwnerDashboard<G> {
    #[must_use]
    pub fn new(state: MarketplaceState<G>) -> Self {
        Self {
            deletion: ListingDeletion::new(state.clone()),
            state,
            listings: Vec::new(),
        }
    }

    #[must_use]
    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    /// Load the owner's listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a backend call, or `Backend` if the
    /// query fails.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[ListingRecord], DashboardError> {
        let Some(owner) = self.state.session().owner_id() else {
            return Err(DashboardError::NotSignedIn);
        };

        let query = ListingQuery::Equals {
            field: ListingField::OwnerId,
            value: owner.into_inner(),
        };
        let mut records = match self.state.gateway().query(&query).await {
            Ok(records) => records,
            Err(e) => {
                capture_backend_error(&e, "dashboard.load");
                self.state
                    .notify(Notice::error("Could not load your listings"));
                return Err(e.into());
            }
        };

        // Equality queries carry no ordering.
        records.sort_by(|a, b| b.fields.created_at.cmp(&a.fields.created_at));
        self.listings = records;
        Ok(&self.listings)
    }

    /// Delete one of the owner's listings and drop it from the list.
    ///
    /// # Errors
    ///
    /// See [`ListingDeletion::delete_listing`]; on error the list is unchanged.
    pub async fn delete(
        &mut self,
        record: &ListingRecord,
    ) -> Result<DeletionReport, DeletionError> {
        let report = self.deletion.delete_listing(record).await?;
        self.listings.retain(|listing| listing.id != report.listing);
        Ok(report)
    }
}
