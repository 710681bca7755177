//! Listing detail lookup.

use tracing::instrument;

use drivex_core::ListingId;

use super::CatalogError;
use crate::backend::ListingStore;
use crate::models::ListingRecord;

/// Load one listing for its detail page.
///
/// # Errors
///
/// Returns `CatalogError::NotFound` for an empty id or a missing document,
/// and `CatalogError::Backend` if the read fails.
#[instrument(skip(store), fields(id = %id))]
pub async fn load_listing<S: ListingStore>(
    store: &S,
    id: &ListingId,
) -> Result<ListingRecord, CatalogError> {
    if id.is_empty() {
        return Err(CatalogError::NotFound(id.clone()));
    }
    store
        .get(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(id.clone()))
}
