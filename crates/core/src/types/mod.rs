//! Core types for DriveX.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod email;
pub mod id;
pub mod options;
pub mod phone;

pub use amount::{Amount, format_odometer, format_price};
pub use email::{Email, EmailError};
pub use id::*;
pub use options::*;
pub use phone::{PhoneError, PhoneNumber};
