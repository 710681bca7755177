//! Account workflows: sign-in, registration and sign-out.
//!
//! Session changes are not applied here; they reach the [`Session`] through
//! the auth provider subscription.
//!
//! [`Session`]: crate::session::Session

mod forms;

use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{AuthError, AuthProvider, Gateway};
use crate::error::{add_breadcrumb, capture_backend_error};
use crate::models::SessionIdentity;
use crate::notice::Notice;
use crate::state::MarketplaceState;
use crate::validation::FieldErrors;

pub use forms::{Credentials, MIN_PASSWORD_CHARS, RegisterForm, Registration, SignInForm};

/// Errors from account workflows.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid form: {0}")]
    Validation(FieldErrors),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Message shown for an auth failure.
fn auth_message(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::EmailInUse => "An account with this email already exists".to_string(),
        AuthError::WeakPassword(detail) if !detail.is_empty() => detail.clone(),
        AuthError::WeakPassword(_) => "Password is too weak".to_string(),
        AuthError::NotSignedIn => "Your session expired, please sign in again".to_string(),
        AuthError::Backend(_) => "Something went wrong. Please try again.".to_string(),
    }
}

pub struct AccountService<G> {
    state: MarketplaceState<G>,
}

impl<G: Gateway> AccountService<G> {
    #[must_use]
    pub const fn new(state: MarketplaceState<G>) -> Self {
        Self { state }
    }

    fn report(&self, error: AuthError, operation: &'static str) -> AccountError {
        if let AuthError::Backend(e) = &error {
            capture_backend_error(e, operation);
        }
        self.state.notify(Notice::error(auth_message(&error)));
        AccountError::Auth(error)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without a backend call, or `Auth` if the provider
    /// rejects the credentials.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_in(&self, form: &SignInForm) -> Result<SessionIdentity, AccountError> {
        let credentials = form.validate().map_err(AccountError::Validation)?;

        let identity = self
            .state
            .gateway()
            .sign_in(&credentials.email, &credentials.password)
            .await
            .map_err(|e| self.report(e, "account.sign_in"))?;

        add_breadcrumb("auth", "Signed in", None);
        info!(uid = %identity.uid, "User signed in");
        Ok(identity)
    }

    /// Create an account, then set its display name.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without a backend call, or `Auth` if sign-up or
    /// the profile update fails.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegisterForm) -> Result<SessionIdentity, AccountError> {
        let registration = form.validate().map_err(AccountError::Validation)?;
        let gateway = self.state.gateway();
        let credentials = &registration.credentials;

        gateway
            .sign_up(&credentials.email, &credentials.password)
            .await
            .map_err(|e| self.report(e, "account.sign_up"))?;

        let identity = gateway
            .update_display_name(&registration.name)
            .await
            .map_err(|e| self.report(e, "account.update_profile"))?;

        info!(uid = %identity.uid, "User registered");
        self.state.notify(Notice::success(format!(
            "Account created! Welcome, {}!",
            identity.display_name()
        )));
        Ok(identity)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns `Auth` if the provider fails.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AccountError> {
        self.state
            .gateway()
            .sign_out()
            .await
            .map_err(|e| self.report(e, "account.sign_out"))?;
        add_breadcrumb("auth", "Signed out", None);
        self.state.notify(Notice::info("Signed out"));
        Ok(())
    }
}
