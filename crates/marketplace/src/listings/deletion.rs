//! Listing deletion: the document first, then each image independently.

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, instrument, warn};

use drivex_core::ListingId;

use crate::backend::{BackendError, BlobPath, BlobStore, Gateway, ListingStore};
use crate::error::capture_backend_error;
use crate::models::ListingRecord;
use crate::notice::Notice;
use crate::state::MarketplaceState;

/// Errors that stop a deletion before any image is touched.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("not signed in")]
    NotSignedIn,

    /// The signed-in user does not own the listing.
    #[error("listing {0} belongs to another user")]
    NotOwner(ListingId),

    /// The document delete failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Outcome of deleting one image.
#[derive(Debug)]
pub struct ImageOutcome {
    pub path: BlobPath,
    pub result: Result<(), BackendError>,
}

impl ImageOutcome {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a deletion whose document delete succeeded.
#[derive(Debug)]
pub struct DeletionReport {
    pub listing: ListingId,
    /// One outcome per image, in listing order.
    pub images: Vec<ImageOutcome>,
}

impl DeletionReport {
    /// Images that could not be deleted.
    pub fn failures(&self) -> impl Iterator<Item = &ImageOutcome> {
        self.images.iter().filter(|outcome| !outcome.is_deleted())
    }

    #[must_use]
    pub fn all_images_deleted(&self) -> bool {
        self.images.iter().all(ImageOutcome::is_deleted)
    }
}

/// Deletes listings owned by the signed-in user.
pub struct ListingDeletion<G> {
    state: MarketplaceState<G>,
}

impl<G: Gateway> ListingDeletion<G> {
    #[must_use]
    pub const fn new(state: MarketplaceState<G>) -> Self {
        Self { state }
    }

    /// Delete a listing and then its images.
    ///
    /// Image deletes all run; each failure is reported on its own and does
    /// not restore the document. Overall success is reported once the
    /// document is gone.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` or `NotOwner` without any backend call, or
    /// `Backend` if the document delete fails (images untouched).
    #[instrument(skip(self, record), fields(id = %record.id, images = record.fields.images.len()))]
    pub async fn delete_listing(
        &self,
        record: &ListingRecord,
    ) -> Result<DeletionReport, DeletionError> {
        let Some(owner) = self.state.session().owner_id() else {
            self.state
                .notify(Notice::error("Sign in to delete listings"));
            return Err(DeletionError::NotSignedIn);
        };
        if !record.is_owned_by(&owner) {
            warn!(owner = %owner, "Refused to delete another user's listing");
            self.state
                .notify(Notice::error("You can only delete your own listings"));
            return Err(DeletionError::NotOwner(record.id.clone()));
        }

        let gateway = self.state.gateway();
        if let Err(e) = ListingStore::delete(gateway, &record.id).await {
            capture_backend_error(&e, "deletion.document");
            self.state.notify(Notice::error(
                "Could not delete the listing. Please try again.",
            ));
            return Err(e.into());
        }

        let tasks = record.fields.images.iter().map(|image| async move {
            let path = BlobPath::of(image);
            let result = BlobStore::delete(gateway, &path).await;
            ImageOutcome { path, result }
        });
        let images = join_all(tasks).await;

        for outcome in &images {
            if let Err(e) = &outcome.result {
                capture_backend_error(e, "deletion.image");
                self.state.notify(Notice::error(format!(
                    "Could not delete image {}",
                    outcome.path.name
                )));
            }
        }

        let report = DeletionReport {
            listing: record.id.clone(),
            images,
        };
        let failed = report.failures().count();
        info!(failed_images = failed, "Listing deleted");
        self.state.notify(Notice::success("Listing deleted"));
        Ok(report)
    }
}
