//! Backend gateway: document store, blob store and auth provider.
//!
//! The marketplace owns no persistence. Listings live in a document store,
//! images in a blob store and identities in an auth provider; this module
//! defines the three capabilities as traits so workflows can run against
//! either backend:
//!
//! - [`memory::InMemoryBackend`] - process-local, used in tests and local
//!   development, with failure injection
//! - [`firebase::FirebaseBackend`] - Firestore, Cloud Storage and the
//!   Identity Toolkit over their REST APIs
//!
//! No transactional guarantee spans the three services.

mod error;
mod events;
pub mod firebase;
pub mod memory;

use std::fmt;
use std::future::Future;

use mime::Mime;
use secrecy::SecretString;

use drivex_core::{Email, ListingId, OwnerId};

use crate::models::{ImageReference, ListingFields, ListingRecord, SessionIdentity};

pub use error::{AuthError, BackendError};
pub use events::{AuthEvents, AuthSubscription};

/// Collection holding listing documents.
pub const LISTINGS_COLLECTION: &str = "vehicles";

/// Queryable listing document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingField {
    Name,
    Model,
    SearchName,
    BodyType,
    OwnerId,
    CreatedAt,
}

impl ListingField {
    /// Field path inside the stored document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Model => "model",
            Self::SearchName => "searchName",
            Self::BodyType => "body",
            Self::OwnerId => "uid",
            Self::CreatedAt => "created",
        }
    }

    /// Read the string value of this field from a document body.
    #[must_use]
    pub fn value_of(self, fields: &ListingFields) -> Option<&str> {
        match self {
            Self::Name => Some(&fields.name),
            Self::Model => Some(&fields.model),
            Self::SearchName => Some(&fields.search_name),
            Self::BodyType => Some(&fields.body_type),
            Self::OwnerId => Some(fields.owner_id.as_str()),
            Self::CreatedAt => None,
        }
    }
}

/// A listing query understood by every [`ListingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    /// Every listing, newest first.
    Recent,
    /// Listings whose field equals `value`. No ordering guarantee.
    Equals { field: ListingField, value: String },
    /// Listings whose field lies in the inclusive range `[start, end]`.
    /// No ordering guarantee.
    Range {
        field: ListingField,
        start: String,
        end: String,
    },
}

/// Location of an image in blob storage: `images/{owner}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath {
    pub owner: OwnerId,
    pub name: String,
}

impl BlobPath {
    #[must_use]
    pub fn new(owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }

    /// Path of a previously uploaded image.
    #[must_use]
    pub fn of(image: &ImageReference) -> Self {
        Self::new(image.uid.clone(), image.name.clone())
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "images/{}/{}", self.owner, self.name)
    }
}

/// Document store holding listing records.
pub trait ListingStore: Send + Sync {
    /// Run a query against the listings collection.
    fn query(
        &self,
        query: &ListingQuery,
    ) -> impl Future<Output = Result<Vec<ListingRecord>, BackendError>> + Send;

    /// Fetch one listing by id.
    fn get(
        &self,
        id: &ListingId,
    ) -> impl Future<Output = Result<Option<ListingRecord>, BackendError>> + Send;

    /// Append a new listing; the store assigns its id.
    fn create(
        &self,
        fields: &ListingFields,
    ) -> impl Future<Output = Result<ListingRecord, BackendError>> + Send;

    /// Delete a listing document.
    fn delete(&self, id: &ListingId) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Blob store holding listing images.
pub trait BlobStore: Send + Sync {
    /// Upload bytes and return the retrievable URL.
    fn upload(
        &self,
        path: &BlobPath,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Delete an object.
    fn delete(&self, path: &BlobPath) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Email/password auth provider.
///
/// Every successful sign-in, sign-up, profile update and sign-out is also
/// published to subscribers.
pub trait AuthProvider: Send + Sync {
    fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<SessionIdentity, AuthError>> + Send;

    fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<SessionIdentity, AuthError>> + Send;

    /// Set the display name of the signed-in user.
    fn update_display_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<SessionIdentity, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Subscribe to auth-state changes. The current state is delivered
    /// immediately.
    fn subscribe(&self) -> AuthSubscription;
}

/// The full backend gateway: documents, blobs and auth behind one handle.
pub trait Gateway: ListingStore + BlobStore + AuthProvider + 'static {}

impl<T> Gateway for T where T: ListingStore + BlobStore + AuthProvider + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_path_display() {
        let path = BlobPath::new(OwnerId::new("u1"), "3f2a");
        assert_eq!(path.to_string(), "images/u1/3f2a");
    }

    #[test]
    fn test_blob_path_of_image() {
        let image = ImageReference {
            uid: OwnerId::new("u9"),
            name: "n1".to_string(),
            url: "https://cdn/x".to_string(),
        };
        assert_eq!(BlobPath::of(&image).to_string(), "images/u9/n1");
    }

    #[test]
    fn test_field_paths() {
        assert_eq!(ListingField::SearchName.as_str(), "searchName");
        assert_eq!(ListingField::BodyType.as_str(), "body");
        assert_eq!(ListingField::CreatedAt.as_str(), "created");
    }
}
