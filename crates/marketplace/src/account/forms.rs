//! Sign-in and registration forms.

use std::fmt;

use secrecy::SecretString;

use drivex_core::{Email, EmailError};

use crate::validation::FieldErrors;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Email and password as typed.
#[derive(Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated sign-in credentials.
#[derive(Debug)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// Registration input as typed.
#[derive(Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated registration input.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub credentials: Credentials,
}

fn email(errors: &mut FieldErrors, value: &str) -> Option<Email> {
    match Email::parse(value.trim()) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.insert("email", "Email is required");
            None
        }
        Err(_) => {
            errors.insert("email", "Enter a valid email address");
            None
        }
    }
}

impl SignInForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns the invalid fields (`email`, `password`).
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        match email {
            Some(email) if errors.is_empty() => Ok(Credentials {
                email,
                password: SecretString::from(self.password.clone()),
            }),
            _ => Err(errors),
        }
    }
}

impl RegisterForm {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns the invalid fields (`name`, `email`, `password`).
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        errors.require("name", name, "Name is required");
        let email = email(&mut errors, &self.email);
        match self.password.chars().count() {
            0 => errors.insert("password", "Password is required"),
            n if n < MIN_PASSWORD_CHARS => errors.insert(
                "password",
                format!("Password must have at least {MIN_PASSWORD_CHARS} characters"),
            ),
            _ => {}
        }
        match email {
            Some(email) if errors.is_empty() => Ok(Registration {
                name: name.to_string(),
                credentials: Credentials {
                    email,
                    password: SecretString::from(self.password.clone()),
                },
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_requires_both_fields() {
        let errors = SignInForm::default().validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["email", "password"]);

        let errors = SignInForm::new("not-an-email", "x").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));

        let credentials = SignInForm::new(" ana@drivex.com ", "x").validate().unwrap();
        assert_eq!(credentials.email.as_str(), "ana@drivex.com");
    }

    #[test]
    fn test_register_password_length() {
        let errors = RegisterForm::new("Ana", "ana@drivex.com", "12345")
            .validate()
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["password"]);

        let ok = RegisterForm::new(" Ana ", "ana@drivex.com", "123456")
            .validate()
            .unwrap();
        assert_eq!(ok.name, "Ana");
    }

    #[test]
    fn test_register_requires_name() {
        let errors = RegisterForm::new("  ", "ana@drivex.com", "123456")
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
    }
}
