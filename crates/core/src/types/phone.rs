//! Contact phone number (`WhatsApp`) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number cannot be empty")]
    Empty,
    #[error("phone number must contain digits only")]
    NonDigit,
    #[error("phone number must have {min} to {max} digits")]
    Length { min: usize, max: usize },
}

/// A contact number: 11 or 12 digits, no punctuation (area code included).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 11;
    pub const MAX_DIGITS: usize = 12;

    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is empty, has non-digit
    /// characters, or has the wrong number of digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&s.len()) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the number for display.
    ///
    /// See [`PhoneNumber::display`].
    #[must_use]
    pub fn formatted(&self) -> String {
        Self::display(&self.0)
    }

    /// Formats a stored contact number for display.
    ///
    /// Non-digits are stripped; an 11-digit result renders as
    /// `(AA) BBBBB-CCCC`. Anything else is returned unchanged.
    ///
    /// ```
    /// use drivex_core::PhoneNumber;
    ///
    /// assert_eq!(PhoneNumber::display("34991234567"), "(34) 99123-4567");
    /// assert_eq!(PhoneNumber::display("553499123456"), "553499123456");
    /// ```
    #[must_use]
    pub fn display(raw: &str) -> String {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 11 {
            return raw.to_owned();
        }
        let (area, rest) = digits.split_at(2);
        let (first, second) = rest.split_at(5);
        format!("({area}) {first}-{second}")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
