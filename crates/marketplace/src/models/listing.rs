//! Listing domain types.
//!
//! These mirror the documents stored in the `vehicles` collection. Field
//! names on the wire are fixed by existing data; the Rust names are the
//! readable ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivex_core::{Amount, ListingId, OwnerId, PhoneNumber, format_odometer, format_price};

/// A stored reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImageReference {
    /// Owner who uploaded the image (first path segment in blob storage).
    pub uid: OwnerId,
    /// Generated unique object name (second path segment).
    pub name: String,
    /// Retrievable download URL.
    pub url: String,
}

/// The body of a listing document.
///
/// Every field defaults when absent so that partially written or older
/// documents still load into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingFields {
    /// Make, uppercase (e.g. `"FERRARI"`).
    pub name: String,
    /// Model, uppercase (e.g. `"SF90"`).
    pub model: String,
    /// Trim/version, uppercase.
    pub version: String,
    /// Normalized search key: uppercase `"{name} {model}"`.
    pub search_name: String,
    /// Model year, `"2021"` or `"2021/2022"`.
    pub year: String,
    #[serde(rename = "km")]
    pub odometer: Amount,
    pub price: Amount,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    #[serde(rename = "whatsapp")]
    pub phone: String,
    pub description: String,
    #[serde(rename = "gas")]
    pub fuel: String,
    pub color: String,
    #[serde(rename = "body")]
    pub body_type: String,
    pub plate_end: String,
    pub transmission: String,
    #[serde(rename = "ipva")]
    pub tax_paid: String,
    #[serde(rename = "owner")]
    pub single_owner: String,
    #[serde(rename = "trade")]
    pub trade_accepted: String,
    #[serde(rename = "license")]
    pub licensed: String,
    pub armored: String,
    pub inspections: String,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    /// Owner identity that created the listing.
    #[serde(rename = "uid")]
    pub owner_id: OwnerId,
    /// Owner display name at creation time.
    #[serde(rename = "vehicleOwner")]
    pub owner_name: String,
    pub images: Vec<ImageReference>,
}

impl ListingFields {
    /// First image, used as the catalog card thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&ImageReference> {
        self.images.first()
    }

    /// Price as shown on cards and the detail page.
    #[must_use]
    pub fn price_label(&self) -> String {
        format_price(&self.price)
    }

    /// Odometer as shown on cards and the detail page.
    #[must_use]
    pub fn odometer_label(&self) -> String {
        format_odometer(&self.odometer)
    }

    /// Contact number as shown on the detail page.
    #[must_use]
    pub fn phone_label(&self) -> String {
        PhoneNumber::display(&self.phone)
    }

    /// `"City - ST"`.
    #[must_use]
    pub fn location_label(&self) -> String {
        format!("{} - {}", self.city, self.state)
    }

    /// Link that opens a chat with the seller.
    #[must_use]
    pub fn whatsapp_link(&self) -> String {
        let digits: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        format!("https://api.whatsapp.com/send?phone={digits}")
    }
}

/// A listing as read from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Document id assigned by the store.
    pub id: ListingId,
    #[serde(flatten)]
    pub fields: ListingFields,
}

impl ListingRecord {
    #[must_use]
    pub const fn new(id: ListingId, fields: ListingFields) -> Self {
        Self { id, fields }
    }

    /// Whether `owner` created this listing.
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.fields.owner_id == owner
    }
}
