//! New-listing workflow: image uploads, validation and the single create call.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::form::ListingForm;
use super::images::{ImageUpload, PendingImage, PendingImages};
use crate::backend::{BackendError, BlobPath, BlobStore, Gateway, ListingStore};
use crate::error::capture_backend_error;
use crate::models::{ImageReference, ListingRecord};
use crate::notice::Notice;
use crate::state::MarketplaceState;
use crate::validation::FieldErrors;

/// Errors from the submission workflow.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// One or more fields are invalid, or no image was added.
    #[error("invalid listing: {0}")]
    Validation(FieldErrors),

    /// The picked file is not JPEG or PNG.
    #[error("unsupported image type: {0}")]
    UnsupportedMedia(String),

    /// The workflow needs a signed-in owner.
    #[error("not signed in")]
    NotSignedIn,

    /// Upload, blob delete or document create failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// State of one "new listing" page.
pub struct ListingSubmission<G> {
    state: MarketplaceState<G>,
    form: ListingForm,
    pending: PendingImages,
    field_errors: FieldErrors,
}

impl<G: Gateway> ListingSubmission<G> {
    #[must_use]
    pub fn new(state: MarketplaceState<G>) -> Self {
        Self {
            state,
            form: ListingForm::default(),
            pending: PendingImages::default(),
            field_errors: FieldErrors::new(),
        }
    }

    #[must_use]
    pub const fn form(&self) -> &ListingForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut ListingForm {
        &mut self.form
    }

    /// Errors from the last rejected submit, keyed by field.
    #[must_use]
    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Handle to the pending image list.
    #[must_use]
    pub fn pending_images(&self) -> &PendingImages {
        &self.pending
    }

    /// Upload a picked file and append it to the pending list.
    ///
    /// Rejects anything but JPEG and PNG, and uploads only for a signed-in
    /// owner; a rejected file changes nothing and reaches no backend.
    /// Several uploads may run at once.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMedia`, `NotSignedIn` or `Backend` if the upload fails.
    #[instrument(skip(self, upload), fields(file = %upload.file_name, mime = %upload.content_type))]
    pub async fn add_image(&self, upload: ImageUpload) -> Result<PendingImage, SubmissionError> {
        let Some(mime) = upload.accepted_mime() else {
            warn!("Rejected image type");
            self.state
                .notify(Notice::error("Upload a JPEG or PNG image"));
            return Err(SubmissionError::UnsupportedMedia(upload.content_type));
        };

        let Some(owner) = self.state.session().owner_id() else {
            self.state.notify(Notice::error("Sign in to upload images"));
            return Err(SubmissionError::NotSignedIn);
        };

        let name = Uuid::new_v4().to_string();
        let path = BlobPath::new(owner.clone(), name.clone());
        let preview_url = upload.preview_url(&mime);

        let url = match BlobStore::upload(self.state.gateway(), &path, upload.bytes, &mime).await {
            Ok(url) => url,
            Err(e) => {
                capture_backend_error(&e, "submission.add_image");
                self.state
                    .notify(Notice::error("Image upload failed. Please try again."));
                return Err(e.into());
            }
        };

        let image = PendingImage {
            reference: ImageReference {
                uid: owner,
                name,
                url,
            },
            preview_url,
        };
        self.pending.push(image.clone());
        info!(path = %path, "Image added to listing");
        Ok(image)
    }

    /// Delete an uploaded image and drop it from the pending list.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the blob delete fails; the pending list is unchanged.
    #[instrument(skip(self, image), fields(name = %image.name))]
    pub async fn remove_image(&self, image: &ImageReference) -> Result<(), SubmissionError> {
        if let Err(e) = BlobStore::delete(self.state.gateway(), &BlobPath::of(image)).await {
            capture_backend_error(&e, "submission.remove_image");
            self.state.notify(Notice::error(
                "Could not remove the image. Please try again.",
            ));
            return Err(e.into());
        }
        self.pending.remove_by_url(&image.url);
        Ok(())
    }

    /// Validate and publish the listing.
    ///
    /// On success the form and the pending list are cleared. On a failed
    /// create both are kept, and the uploaded images stay in blob storage
    /// unreferenced.
    ///
    /// # Errors
    ///
    /// Returns `Validation` (no backend call) naming every invalid field, with
    /// an empty pending list reported under `images`; `NotSignedIn`; or
    /// `Backend` if the create fails.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<ListingRecord, SubmissionError> {
        let images = self.pending.references();

        let (validated, mut errors) = match self.form.validate() {
            Ok(validated) => (Some(validated), FieldErrors::new()),
            Err(errors) => (None, errors),
        };
        if images.is_empty() {
            errors.insert("images", "Add at least one image");
        }
        let Some(validated) = validated.filter(|_| errors.is_empty()) else {
            warn!(fields = %errors, "Listing rejected by validation");
            self.field_errors = errors.clone();
            self.state
                .notify(Notice::error("Please fix the highlighted fields"));
            return Err(SubmissionError::Validation(errors));
        };
        self.field_errors = FieldErrors::new();

        let Some(owner) = self.state.session().identity() else {
            self.state
                .notify(Notice::error("Sign in to publish a listing"));
            return Err(SubmissionError::NotSignedIn);
        };

        let fields = validated.into_fields(&owner, images, Utc::now());
        let record = match self.state.gateway().create(&fields).await {
            Ok(record) => record,
            Err(e) => {
                capture_backend_error(&e, "submission.submit");
                self.state.notify(Notice::error(
                    "Could not publish the listing. Please try again.",
                ));
                return Err(e.into());
            }
        };

        info!(id = %record.id, images = record.fields.images.len(), "Listing published");
        self.form.clear();
        self.pending.clear();
        self.state.notify(Notice::success("Listing published!"));
        Ok(record)
    }
}
