//! Session identity.

use serde::{Deserialize, Serialize};

use drivex_core::OwnerId;

/// The signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Auth provider user id.
    pub uid: OwnerId,
    /// Display name, if the profile has one.
    pub name: Option<String>,
    /// Account email, if known.
    pub email: Option<String>,
}

impl SessionIdentity {
    #[must_use]
    pub fn new(uid: impl Into<OwnerId>, name: Option<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            name,
            email,
        }
    }

    /// Name to show in greetings and on listings, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let named = SessionIdentity::new("u1", Some("Ana".into()), Some("ana@x.com".into()));
        assert_eq!(named.display_name(), "Ana");

        let unnamed = SessionIdentity::new("u2", Some(String::new()), Some("bia@x.com".into()));
        assert_eq!(unnamed.display_name(), "bia@x.com");

        let bare = SessionIdentity::new("u3", None, None);
        assert_eq!(bare.display_name(), "");
    }
}
