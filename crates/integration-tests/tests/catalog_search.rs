//! Integration tests for catalog search.
//!
//! These tests drive `CatalogSearch` against the in-memory backend and check
//! the visible set, backend call counts and reported notices.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use drivex_core::ListingId;
use drivex_integration_tests::{TestContext, day, listing};
use drivex_marketplace::backend::ListingField;
use drivex_marketplace::catalog::{CatalogError, load_listing};
use drivex_marketplace::models::ListingRecord;
use drivex_marketplace::notice::{Notice, NoticeLevel};

fn names(records: &[ListingRecord]) -> Vec<String> {
    records.iter().map(|r| r.fields.name.clone()).collect()
}

fn ids(records: &[ListingRecord]) -> Vec<ListingId> {
    records.iter().map(|r| r.id.clone()).collect()
}

// =============================================================================
// Reload and Category Tests
// =============================================================================

#[tokio::test]
async fn test_reload_then_category_scenario() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    let a = backend.insert(listing("Jeep", "Compass", "SUV", day(1)));
    let b = backend.insert(listing("Honda", "Civic", "Sedan", day(2)));

    let mut catalog = ctx.state.catalog();
    let visible = ids(catalog.reload().await.unwrap());
    assert_eq!(visible, [b.id.clone(), a.id.clone()]);

    let suvs = catalog.filter_by_category("SUV").await.unwrap();
    assert_eq!(suvs.len(), 1);
    assert_eq!(suvs[0].id, a.id);
    assert_eq!(ctx.notices.last().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_reload_resets_search_input() {
    let ctx = TestContext::new();
    let mut catalog = ctx.state.catalog();
    catalog.set_search_input("civic");

    catalog.reload().await.unwrap();
    assert_eq!(catalog.search_input(), "");
    assert_eq!(
        ctx.notices.last(),
        Some(Notice::success("Catalog reloaded"))
    );
}

#[tokio::test]
async fn test_empty_category_is_not_an_error() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    backend.insert(listing("Jeep", "Compass", "SUV", day(1)));

    let mut catalog = ctx.state.catalog();
    catalog.reload().await.unwrap();
    let result = catalog.filter_by_category("Minivan").await.unwrap();

    assert!(result.is_empty());
    assert!(catalog.listings().is_empty());
    assert!(ctx.notices.last().unwrap().is_error());
}

#[tokio::test]
async fn test_category_failure_reports_error() {
    let ctx = TestContext::new();
    ctx.backend().fail_queries(true);

    let mut catalog = ctx.state.catalog();
    let result = catalog.filter_by_category("SUV").await;

    assert!(matches!(result, Err(CatalogError::Backend(_))));
    assert_eq!(ctx.notices.errors().len(), 1);
}

// =============================================================================
// Free-text Search Tests
// =============================================================================

#[tokio::test]
async fn test_empty_term_makes_no_query() {
    let ctx = TestContext::new();
    let mut catalog = ctx.state.catalog();

    for term in ["", "   "] {
        assert!(matches!(
            catalog.search(term).await,
            Err(CatalogError::EmptyTerm)
        ));
    }
    assert_eq!(ctx.backend().calls().queries, 0);
    assert_eq!(ctx.notices.errors().len(), 2);
}

#[tokio::test]
async fn test_search_is_case_insensitive_prefix() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    backend.insert(listing("Ferrari", "SF90", "Esportivo", day(1)));
    backend.insert(listing("Fiat", "Uno", "Hatchback", day(2)));
    backend.insert(listing("Kia", "Sportage", "SUV", day(3)));

    let mut catalog = ctx.state.catalog();
    assert_eq!(names(catalog.search("fer").await.unwrap()), ["FERRARI"]);
    assert_eq!(names(catalog.search("SPORT").await.unwrap()), ["KIA"]);
    let found = catalog.search("ferrari sf").await.unwrap();
    assert_eq!(names(found), ["FERRARI"]);
    assert_eq!(backend.calls().queries, 9);
    assert_eq!(
        ctx.notices.last(),
        Some(Notice::success("Showing results for \"ferrari sf\""))
    );
}

#[tokio::test]
async fn test_listing_matching_several_fields_appears_once() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    // Matches on name and searchName.
    backend.insert(listing("Ferrari", "488", "Esportivo", day(1)));

    let mut catalog = ctx.state.catalog();
    let found = catalog.search("f").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_merge_follows_completion_order() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    // "fe" matches X on name and searchName, Y on model only.
    let x = backend.insert(listing("Ferrari", "488", "Esportivo", day(1)));
    let y = backend.insert(listing("Fiat", "Feroza", "SUV", day(2)));

    backend.delay_queries_on(ListingField::Name, Duration::from_millis(150));
    backend.delay_queries_on(ListingField::SearchName, Duration::from_millis(75));

    let mut catalog = ctx.state.catalog();
    let visible = ids(catalog.search("fe").await.unwrap());
    assert_eq!(visible, [y.id.clone(), x.id.clone()]);

    // Now the model query is the slowest.
    backend.delay_queries_on(ListingField::Name, Duration::ZERO);
    backend.delay_queries_on(ListingField::SearchName, Duration::ZERO);
    backend.delay_queries_on(ListingField::Model, Duration::from_millis(150));

    let visible = ids(catalog.search("fe").await.unwrap());
    assert_eq!(visible, [x.id, y.id]);
}

#[tokio::test]
async fn test_no_match_falls_back_to_full_catalog() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    backend.insert(listing("Jeep", "Compass", "SUV", day(1)));
    backend.insert(listing("Honda", "Civic", "Sedan", day(2)));

    let mut catalog = ctx.state.catalog();
    catalog.set_search_input("zzz");
    let found = catalog.submit_search().await.unwrap();

    assert_eq!(names(found), ["HONDA", "JEEP"]);
    // Fallback keeps the typed term.
    assert_eq!(catalog.search_input(), "zzz");
    let last = ctx.notices.last().unwrap();
    assert!(last.is_error());
    assert!(last.message.contains("zzz"));
    // Three prefix queries plus the fallback.
    assert_eq!(backend.calls().queries, 4);
}

#[tokio::test]
async fn test_search_failure_keeps_visible_set() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    backend.insert(listing("Jeep", "Compass", "SUV", day(1)));

    let mut catalog = ctx.state.catalog();
    catalog.reload().await.unwrap();
    ctx.notices.take();

    backend.fail_queries(true);
    let result = catalog.search("jeep").await;

    assert!(matches!(result, Err(CatalogError::Backend(_))));
    assert_eq!(names(catalog.listings()), ["JEEP"]);
    assert_eq!(ctx.notices.errors().len(), 1);
}

// =============================================================================
// Image Load Tracking Tests
// =============================================================================

#[tokio::test]
async fn test_loaded_images_reset_only_by_category() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    let jeep = backend.insert(listing("Jeep", "Compass", "SUV", day(1)));

    let mut catalog = ctx.state.catalog();
    catalog.reload().await.unwrap();
    catalog.mark_image_loaded(&jeep.id);

    catalog.search("jeep").await.unwrap();
    assert!(catalog.is_image_loaded(&jeep.id));
    catalog.reload().await.unwrap();
    assert!(catalog.is_image_loaded(&jeep.id));

    catalog.filter_by_category("SUV").await.unwrap();
    assert!(!catalog.is_image_loaded(&jeep.id));
}

// =============================================================================
// Detail Lookup Tests
// =============================================================================

#[tokio::test]
async fn test_detail_lookup() {
    let ctx = TestContext::new();
    let backend = ctx.backend();
    let stored = backend.insert(listing("Jeep", "Compass", "SUV", day(1)));

    let loaded = load_listing(backend, &stored.id).await.unwrap();
    assert_eq!(loaded.fields.search_name, "JEEP COMPASS");

    let missing = load_listing(backend, &ListingId::new("missing")).await;
    assert!(matches!(missing, Err(CatalogError::NotFound(_))));
}
