//! Integration tests for the new-listing workflow.

#![allow(clippy::unwrap_used)]

use futures::future::join_all;

use drivex_integration_tests::{TestContext, valid_form};
use drivex_marketplace::backend::BlobPath;
use drivex_marketplace::listings::{ImageUpload, ListingForm, SubmissionError};
use drivex_marketplace::notice::Notice;

fn png(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

// =============================================================================
// Image Upload Tests
// =============================================================================

#[tokio::test]
async fn test_gif_is_rejected_without_network_call() {
    let ctx = TestContext::signed_in("u1");
    let submission = ctx.state.submission();

    let gif = ImageUpload::new("car.gif", "image/gif", vec![b'G', b'I', b'F']);
    let result = submission.add_image(gif).await;

    assert!(matches!(result, Err(SubmissionError::UnsupportedMedia(t)) if t == "image/gif"));
    assert!(submission.pending_images().is_empty());
    assert_eq!(ctx.backend().calls().storage_total(), 0);
    assert_eq!(ctx.backend().blob_count(), 0);
    assert_eq!(ctx.notices.errors().len(), 1);
}

#[tokio::test]
async fn test_upload_requires_signed_in_owner() {
    let mut ctx = TestContext::new();
    ctx.sync_session();
    let submission = ctx.state.submission();

    let result = submission.add_image(png("car.png")).await;

    assert!(matches!(result, Err(SubmissionError::NotSignedIn)));
    assert_eq!(ctx.backend().calls().uploads, 0);
}

#[tokio::test]
async fn test_concurrent_uploads_each_append_once() {
    let ctx = TestContext::signed_in("u1");
    let submission = ctx.state.submission();

    let uploads = ["a.png", "b.png", "c.png"].map(|name| submission.add_image(png(name)));
    let results = join_all(uploads).await;

    assert!(results.iter().all(Result::is_ok));
    let pending = submission.pending_images().references();
    assert_eq!(pending.len(), 3);
    assert_eq!(ctx.backend().blob_count(), 3);
    for image in &pending {
        assert_eq!(image.uid.as_str(), "u1");
        assert!(ctx.backend().has_blob(&BlobPath::of(image)));
    }
}

#[tokio::test]
async fn test_upload_failure_leaves_pending_list() {
    let ctx = TestContext::signed_in("u1");
    ctx.backend().fail_uploads(true);
    let submission = ctx.state.submission();

    assert!(matches!(
        submission.add_image(png("a.png")).await,
        Err(SubmissionError::Backend(_))
    ));
    assert!(submission.pending_images().is_empty());
    assert_eq!(ctx.notices.errors().len(), 1);
}

#[tokio::test]
async fn test_remove_image_deletes_blob_and_pending_entry() {
    let ctx = TestContext::signed_in("u1");
    let submission = ctx.state.submission();
    let first = submission.add_image(png("a.png")).await.unwrap();
    let second = submission.add_image(png("b.png")).await.unwrap();

    submission.remove_image(&first.reference).await.unwrap();

    assert!(!ctx.backend().has_blob(&BlobPath::of(&first.reference)));
    let remaining = submission.pending_images().references();
    assert_eq!(remaining, vec![second.reference]);
}

// =============================================================================
// Submit Tests
// =============================================================================

#[tokio::test]
async fn test_submit_creates_one_record_with_pending_images() {
    let ctx = TestContext::signed_in("u1");
    let mut submission = ctx.state.submission();
    *submission.form_mut() = valid_form();
    submission.add_image(png("a.png")).await.unwrap();
    submission.add_image(png("b.png")).await.unwrap();
    let pending = submission.pending_images().references();

    let record = submission.submit().await.unwrap();

    let stored = ctx.backend().documents();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], record);
    assert_eq!(record.fields.images, pending);
    assert_eq!(record.fields.owner_id.as_str(), "u1");
    assert_eq!(record.fields.owner_name, "User u1");
    assert_eq!(record.fields.name, "FERRARI");
    assert_eq!(record.fields.search_name, "FERRARI SF90");
    assert_eq!(record.fields.price_label(), "R$ 5.550.000,00");
    assert_eq!(ctx.backend().calls().creates, 1);

    // Form and pending list are cleared.
    assert_eq!(submission.form(), &ListingForm::default());
    assert!(submission.pending_images().is_empty());
    assert_eq!(
        ctx.notices.last(),
        Some(Notice::success("Listing published!"))
    );
}

#[tokio::test]
async fn test_invalid_form_names_every_field_without_backend_call() {
    let ctx = TestContext::signed_in("u1");
    let mut submission = ctx.state.submission();
    *submission.form_mut() = ListingForm {
        city: String::new(),
        price: "  ".to_string(),
        year: "22".to_string(),
        ..valid_form()
    };

    let Err(SubmissionError::Validation(errors)) = submission.submit().await else {
        panic!("expected validation error");
    };

    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        ["city", "images", "price", "year"]
    );
    assert_eq!(ctx.backend().calls().storage_total(), 0);
    assert_eq!(submission.field_errors(), &errors);
}

#[tokio::test]
async fn test_empty_form_reports_all_fields() {
    let ctx = TestContext::signed_in("u1");
    let mut submission = ctx.state.submission();

    let Err(SubmissionError::Validation(errors)) = submission.submit().await else {
        panic!("expected validation error");
    };

    // 21 form fields plus the image list.
    assert_eq!(errors.len(), 22);
    assert_eq!(ctx.backend().calls().storage_total(), 0);
}

#[tokio::test]
async fn test_create_failure_keeps_form_and_orphans_images() {
    let ctx = TestContext::signed_in("u1");
    let mut submission = ctx.state.submission();
    *submission.form_mut() = valid_form();
    let image = submission.add_image(png("a.png")).await.unwrap();
    ctx.backend().fail_creates(true);

    let result = submission.submit().await;

    assert!(matches!(result, Err(SubmissionError::Backend(_))));
    assert_eq!(submission.form(), &valid_form());
    assert_eq!(submission.pending_images().len(), 1);
    assert!(ctx.backend().documents().is_empty());
    // The uploaded object stays in storage, unreferenced.
    assert!(ctx.backend().has_blob(&BlobPath::of(&image.reference)));
    assert!(ctx.notices.last().unwrap().is_error());
}
