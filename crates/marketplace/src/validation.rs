//! Per-field validation errors.

use std::collections::BTreeMap;
use std::fmt;

/// Map of invalid form fields to their error message.
///
/// Keys are the stored field names (`name`, `km`, `images`, ...), so callers
/// can bind messages to their inputs without knowing the form layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first error for a field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` unless `value` has non-whitespace content.
    pub fn require(&mut self, field: &'static str, value: &str, message: &str) -> bool {
        let present = !value.trim().is_empty();
        if !present {
            self.insert(field, message);
        }
        present
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(value)` when no error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field is invalid.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("year", "Year is required");
        errors.insert("year", "Invalid year");
        assert_eq!(errors.get("year"), Some("Year is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_require_whitespace() {
        let mut errors = FieldErrors::new();
        assert!(!errors.require("city", "  ", "City is required"));
        assert!(errors.require("state", "SP", "State is required"));
        assert!(errors.contains("city"));
        assert!(!errors.contains("state"));
    }

    #[test]
    fn test_display_is_sorted() {
        let mut errors = FieldErrors::new();
        errors.insert("price", "Price is required");
        errors.insert("km", "Odometer is required");
        assert_eq!(
            errors.to_string(),
            "km: Odometer is required; price: Price is required"
        );
        assert!(errors.into_result(()).is_err());
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
    }
}
