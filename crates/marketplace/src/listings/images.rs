//! Image uploads and the pending image list.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mime::Mime;

use crate::models::ImageReference;

/// Content types accepted for listing images.
pub const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A file picked by the seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// Declared content type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// The content type, if it is JPEG or PNG.
    #[must_use]
    pub fn accepted_mime(&self) -> Option<Mime> {
        let mime: Mime = self.content_type.trim().parse().ok()?;
        ACCEPTED_IMAGE_TYPES
            .contains(&mime.essence_str())
            .then_some(mime)
    }

    /// Local preview as a `data:` URL.
    #[must_use]
    pub fn preview_url(&self, mime: &Mime) -> String {
        format!(
            "data:{};base64,{}",
            mime.essence_str(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// An uploaded image not yet attached to a stored listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub reference: ImageReference,
    pub preview_url: String,
}

/// The pending image list of one submission.
///
/// Clones share the list so concurrent uploads each append exactly once.
#[derive(Debug, Clone, Default)]
pub struct PendingImages {
    items: Arc<Mutex<Vec<PendingImage>>>,
}

impl PendingImages {
    fn lock(&self) -> MutexGuard<'_, Vec<PendingImage>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, image: PendingImage) {
        self.lock().push(image);
    }

    /// Remove the image with this retrievable URL. Returns whether one was removed.
    pub fn remove_by_url(&self, url: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|image| image.reference.url != url);
        items.len() != before
    }

    /// Copy of the list in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PendingImage> {
        self.lock().clone()
    }

    /// The `{uid, name, url}` triples stored on a listing.
    #[must_use]
    pub fn references(&self) -> Vec<ImageReference> {
        self.lock()
            .iter()
            .map(|image| image.reference.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pending(url: &str) -> PendingImage {
        PendingImage {
            reference: ImageReference {
                uid: "u1".into(),
                name: url.to_string(),
                url: url.to_string(),
            },
            preview_url: String::new(),
        }
    }

    #[test]
    fn test_accepted_types() {
        let png = ImageUpload::new("a.png", "image/png", vec![]);
        assert_eq!(png.accepted_mime(), Some(mime::IMAGE_PNG));
        let jpeg = ImageUpload::new("a.jpg", "image/jpeg", vec![]);
        assert!(jpeg.accepted_mime().is_some());
        let gif = ImageUpload::new("a.gif", "image/gif", vec![]);
        assert!(gif.accepted_mime().is_none());
        let junk = ImageUpload::new("a", "not a mime", vec![]);
        assert!(junk.accepted_mime().is_none());
    }

    #[test]
    fn test_preview_is_data_url() {
        let upload = ImageUpload::new("a.png", "image/png", b"hi".to_vec());
        assert_eq!(
            upload.preview_url(&mime::IMAGE_PNG),
            "data:image/png;base64,aGk="
        );
    }

    #[test]
    fn test_remove_by_url() {
        let images = PendingImages::default();
        let shared = images.clone();
        shared.push(pending("a"));
        shared.push(pending("b"));

        assert!(images.remove_by_url("a"));
        assert!(!images.remove_by_url("zzz"));
        assert_eq!(images.len(), 1);
        assert_eq!(images.references()[0].url, "b");
    }
}
