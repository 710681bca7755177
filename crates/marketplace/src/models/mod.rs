//! Domain models.
//!
//! These types represent listings and session identities independently of
//! the backend that stores them.

pub mod listing;
pub mod session;

pub use listing::{ImageReference, ListingFields, ListingRecord};
pub use session::SessionIdentity;
