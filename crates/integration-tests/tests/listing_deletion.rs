//! Integration tests for listing deletion and the owner dashboard.

#![allow(clippy::unwrap_used)]

use drivex_integration_tests::{TestContext, day, listing, owned_listing};
use drivex_marketplace::backend::BlobPath;
use drivex_marketplace::listings::DeletionError;
use drivex_marketplace::notice::{Notice, NoticeLevel};

// =============================================================================
// Deletion Tests
// =============================================================================

#[tokio::test]
async fn test_one_image_failure_still_reports_success() {
    let ctx = TestContext::signed_in("u1");
    let backend = ctx.backend();
    let record = backend.insert(owned_listing(backend, "u1", day(1), &["front", "back"]));
    let front = BlobPath::of(&record.fields.images[0]);
    let back = BlobPath::of(&record.fields.images[1]);
    backend.fail_blob_delete(&back);

    let report = ctx.state.deletion().delete_listing(&record).await.unwrap();

    assert!(backend.documents().is_empty());
    assert_eq!(report.images.len(), 2);
    assert!(report.images[0].is_deleted());
    assert!(!report.all_images_deleted());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.failures().next().unwrap().path, back);
    assert!(!backend.has_blob(&front));
    assert!(backend.has_blob(&back));

    let notices = ctx.notices.notices();
    assert_eq!(notices.iter().filter(|n| n.is_error()).count(), 1);
    assert_eq!(notices.last(), Some(&Notice::success("Listing deleted")));
}

#[tokio::test]
async fn test_all_images_deleted() {
    let ctx = TestContext::signed_in("u1");
    let backend = ctx.backend();
    let record = backend.insert(owned_listing(backend, "u1", day(1), &["a", "b", "c"]));

    let report = ctx.state.deletion().delete_listing(&record).await.unwrap();

    assert!(report.all_images_deleted());
    assert_eq!(backend.blob_count(), 0);
    assert_eq!(backend.calls().blob_deletes, 3);
    assert!(ctx.notices.errors().is_empty());
}

#[tokio::test]
async fn test_foreign_listing_is_refused() {
    let ctx = TestContext::signed_in("intruder");
    let backend = ctx.backend();
    let record = backend.insert(owned_listing(backend, "owner", day(1), &["a"]));

    let result = ctx.state.deletion().delete_listing(&record).await;

    assert!(matches!(result, Err(DeletionError::NotOwner(id)) if id == record.id));
    assert_eq!(backend.calls().storage_total(), 0);
    assert_eq!(backend.documents().len(), 1);
    assert_eq!(backend.blob_count(), 1);
}

#[tokio::test]
async fn test_signed_out_cannot_delete() {
    let mut ctx = TestContext::new();
    ctx.sync_session();
    let backend = ctx.backend();
    let record = backend.insert(owned_listing(backend, "owner", day(1), &[]));

    let result = ctx.state.deletion().delete_listing(&record).await;

    assert!(matches!(result, Err(DeletionError::NotSignedIn)));
    assert_eq!(backend.calls().storage_total(), 0);
}

// =============================================================================
// Owner Dashboard Tests
// =============================================================================

#[tokio::test]
async fn test_dashboard_lists_own_listings_newest_first() {
    let ctx = TestContext::signed_in("u1");
    let backend = ctx.backend();
    let old = backend.insert(owned_listing(backend, "u1", day(1), &[]));
    backend.insert(owned_listing(backend, "u2", day(2), &[]));
    let new = backend.insert(owned_listing(backend, "u1", day(3), &[]));
    backend.insert(listing("Kia", "Soul", "SUV", day(4)));

    let mut dashboard = ctx.state.dashboard();
    let loaded = dashboard.load().await.unwrap();
    let ids: Vec<_> = loaded.iter().map(|r| r.id.clone()).collect();

    assert_eq!(ids, [new.id, old.id]);
}

#[tokio::test]
async fn test_dashboard_delete_drops_listing() {
    let ctx = TestContext::signed_in("u1");
    let backend = ctx.backend();
    let first = backend.insert(owned_listing(backend, "u1", day(1), &["a"]));
    backend.insert(owned_listing(backend, "u1", day(2), &["b"]));

    let mut dashboard = ctx.state.dashboard();
    dashboard.load().await.unwrap();
    dashboard.delete(&first).await.unwrap();

    assert_eq!(dashboard.listings().len(), 1);
    assert_ne!(dashboard.listings()[0].id, first.id);
}

#[tokio::test]
async fn test_dashboard_keeps_listing_when_document_delete_fails() {
    let ctx = TestContext::signed_in("u1");
    let backend = ctx.backend();
    let record = backend.insert(owned_listing(backend, "u1", day(1), &["a"]));
    backend.fail_document_deletes(true);

    let mut dashboard = ctx.state.dashboard();
    dashboard.load().await.unwrap();
    let result = dashboard.delete(&record).await;

    assert!(matches!(result, Err(DeletionError::Backend(_))));
    assert_eq!(dashboard.listings().len(), 1);
    assert_eq!(backend.calls().blob_deletes, 0);
    assert_eq!(ctx.notices.last().unwrap().level, NoticeLevel::Error);
}
