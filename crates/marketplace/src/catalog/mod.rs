//! Catalog search.
//!
//! Produces the visible listing set from a free-text term, a body-type
//! category or a plain reload. Every operation replaces the visible set.
//!
//! Free-text search runs three prefix-range queries (`name`, `model`,
//! `searchName`) concurrently and merges them in the order the result sets
//! arrive, keeping the first occurrence of each listing.

mod detail;

use std::collections::HashSet;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tracing::{debug, info, instrument};

use drivex_core::ListingId;

use crate::backend::{BackendError, Gateway, ListingField, ListingQuery, ListingStore};
use crate::error::{add_breadcrumb, capture_backend_error};
use crate::models::ListingRecord;
use crate::notice::Notice;
use crate::state::MarketplaceState;

pub use detail::load_listing;

/// Highest private-use code point; appended to a prefix it bounds every
/// string starting with that prefix.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Fields matched by free-text search.
pub const SEARCH_FIELDS: [ListingField; 3] = [
    ListingField::Name,
    ListingField::Model,
    ListingField::SearchName,
];

const GENERIC_FAILURE: &str = "Something went wrong loading listings. Please try again.";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Free-text search with an empty or whitespace-only term.
    #[error("search term is empty")]
    EmptyTerm,

    /// No listing with this id.
    #[error("listing not found: {0}")]
    NotFound(ListingId),

    /// A backend query failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Inclusive range `[UPPER(term), UPPER(term) + sentinel]`.
#[must_use]
pub fn prefix_range(term: &str) -> (String, String) {
    let start = term.to_uppercase();
    let mut end = start.clone();
    end.push(PREFIX_SENTINEL);
    (start, end)
}

/// Concatenate result sets in order, dropping repeated listing ids.
#[must_use]
pub fn merge_unique(batches: impl IntoIterator<Item = Vec<ListingRecord>>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

/// Run the three prefix queries and merge them in completion order.
async fn prefix_search<S: ListingStore>(
    store: &S,
    term: &str,
) -> Result<Vec<ListingRecord>, BackendError> {
    let (start, end) = prefix_range(term);
    let queries = SEARCH_FIELDS.map(|field| ListingQuery::Range {
        field,
        start: start.clone(),
        end: end.clone(),
    });

    let mut pending: FuturesUnordered<_> = queries.iter().map(|query| store.query(query)).collect();
    let mut batches = Vec::with_capacity(queries.len());
    while let Some(batch) = pending.next().await {
        batches.push(batch?);
    }
    Ok(merge_unique(batches))
}

/// Catalog state behind the home page: visible listings, the search input
/// and which listing thumbnails have finished loading.
pub struct CatalogSearch<G> {
    state: MarketplaceState<G>,
    listings: Vec<ListingRecord>,
    search_input: String,
    loaded_images: HashSet<ListingId>,
}

impl<G: Gateway> CatalogSearch<G> {
    #[must_use]
    pub fn new(state: MarketplaceState<G>) -> Self {
        Self {
            state,
            listings: Vec::new(),
            search_input: String::new(),
            loaded_images: HashSet::new(),
        }
    }

    /// The visible listing set.
    #[must_use]
    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn set_search_input(&mut self, input: impl Into<String>) {
        self.search_input = input.into();
    }

    /// Record that a listing's thumbnail finished loading.
    pub fn mark_image_loaded(&mut self, id: &ListingId) {
        self.loaded_images.insert(id.clone());
    }

    /// Whether to show the thumbnail instead of its placeholder.
    #[must_use]
    pub fn is_image_loaded(&self, id: &ListingId) -> bool {
        self.loaded_images.contains(id)
    }

    fn report_failure(&self, error: &BackendError, operation: &'static str) {
        capture_backend_error(error, operation);
        self.state.notify(Notice::error(GENERIC_FAILURE));
    }

    async fn fetch_recent(&self) -> Result<Vec<ListingRecord>, BackendError> {
        self.state.gateway().query(&ListingQuery::Recent).await
    }

    /// Load every listing, newest first, and clear the search input.
    ///
    /// This is also the initial load.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if the query fails; the visible set is
    /// left unchanged.
    #[instrument(skip(self))]
    pub async fn reload(&mut self) -> Result<&[ListingRecord], CatalogError> {
        let records = match self.fetch_recent().await {
            Ok(records) => records,
            Err(e) => {
                self.report_failure(&e, "catalog.reload");
                return Err(e.into());
            }
        };

        info!(count = records.len(), "Catalog reloaded");
        self.listings = records;
        self.search_input.clear();
        self.state.notify(Notice::success("Catalog reloaded"));
        Ok(&self.listings)
    }

    /// Free-text prefix search on make, model and the combined search name.
    ///
    /// With no match, falls back to the full catalog and reports that nothing
    /// was found.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTerm` without querying if `term` is blank,
    /// or `CatalogError::Backend` if any query fails (visible set unchanged).
    #[instrument(skip(self))]
    pub async fn search(&mut self, term: &str) -> Result<&[ListingRecord], CatalogError> {
        let term = term.trim();
        if term.is_empty() {
            self.state
                .notify(Notice::error("Type a make or model to search"));
            return Err(CatalogError::EmptyTerm);
        }

        add_breadcrumb("catalog", "Searched listings", Some(&[("term", term)]));

        let merged = match prefix_search(self.state.gateway(), term).await {
            Ok(merged) => merged,
            Err(e) => {
                self.report_failure(&e, "catalog.search");
                return Err(e.into());
            }
        };

        if !merged.is_empty() {
            debug!(count = merged.len(), "Search matched listings");
            self.listings = merged;
            self.state
                .notify(Notice::success(format!("Showing results for \"{term}\"")));
            return Ok(&self.listings);
        }

        let all = match self.fetch_recent().await {
            Ok(all) => all,
            Err(e) => {
                self.report_failure(&e, "catalog.search_fallback");
                return Err(e.into());
            }
        };
        debug!("Search matched nothing, showing full catalog");
        self.listings = all;
        self.state.notify(Notice::error(format!(
            "No listings found for \"{term}\". Showing all listings."
        )));
        Ok(&self.listings)
    }

    /// Search using the current search input.
    ///
    /// # Errors
    ///
    /// See [`CatalogSearch::search`].
    pub async fn submit_search(&mut self) -> Result<&[ListingRecord], CatalogError> {
        let term = self.search_input.clone();
        self.search(&term).await
    }

    /// Show only listings with this body type.
    ///
    /// A category with no listings is not an error: the visible set becomes
    /// empty and an error notice is reported.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if the query fails.
    #[instrument(skip(self))]
    pub async fn filter_by_category(
        &mut self,
        category: &str,
    ) -> Result<&[ListingRecord], CatalogError> {
        let query = ListingQuery::Equals {
            field: ListingField::BodyType,
            value: category.to_string(),
        };
        let records = match self.state.gateway().query(&query).await {
            Ok(records) => records,
            Err(e) => {
                self.report_failure(&e, "catalog.filter_by_category");
                return Err(e.into());
            }
        };

        self.loaded_images.clear();
        if records.is_empty() {
            let message = format!("No listings in category {category}");
            self.state.notify(Notice::error(message));
        } else {
            self.state.notify(Notice::success(format!(
                "Showing {} listing(s) in category {category}",
                records.len()
            )));
        }
        self.listings = records;
        Ok(&self.listings)
    }
}
