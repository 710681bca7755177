//! DriveX Core - Shared types library.
//!
//! This crate provides the types shared by the marketplace workflows and
//! the integration tests:
//! - Type-safe identifiers for listings and owners
//! - Validated email addresses and contact phone numbers
//! - Amounts stored either as numbers or as free text (price, odometer)
//! - The enumerated option sets offered by the listing form
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! backend access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and option enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
