//! Listing workflows for signed-in owners.
//!
//! - [`ListingSubmission`] - form, pending images, publish
//! - [`ListingDeletion`] - document then images, partial failure tolerated
//! - [`OwnerDashboard`] - the owner's own listings

mod dashboard;
mod deletion;
pub mod form;
pub mod images;
mod submission;

pub use dashboard::{DashboardError, OwnerDashboard};
pub use deletion::{DeletionError, DeletionReport, ImageOutcome, ListingDeletion};
pub use form::{ListingForm, ValidatedListing};
pub use images::{ImageUpload, PendingImage, PendingImages};
pub use submission::{ListingSubmission, SubmissionError};
