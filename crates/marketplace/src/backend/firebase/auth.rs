//! Identity Toolkit email/password auth and Secure Token refresh.

use std::sync::PoisonError;

use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use drivex_core::{Email, OwnerId};

use super::{AuthTokens, FirebaseBackend, error_message, parse_json};
use crate::backend::{AuthError, AuthProvider, AuthSubscription, BackendError};
use crate::models::SessionIdentity;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

/// Token response of `signInWithPassword`, `signUp` and `update`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds until the ID token expires, as a decimal string.
    #[serde(default)]
    expires_in: Option<String>,
}

/// Response of the Secure Token `token` endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Lifetime assumed when a response omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Unix timestamp when a token with the given `expiresIn` expires.
fn expiry(expires_in: Option<&str>) -> i64 {
    let lifetime = expires_in
        .and_then(|secs| secs.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    chrono::Utc::now().timestamp() + lifetime
}

/// Read an auth response body, mapping provider error codes.
async fn read_auth_body(response: Response, action: &str) -> Result<String, AuthError> {
    let status = response.status();
    let text = response.text().await.map_err(BackendError::from)?;

    if !status.is_success() {
        let code = error_message(&text);
        tracing::warn!(action, status = %status, code = %code, "Firebase auth rejected call");
        return Err(AuthError::from_identity_code(status.as_u16(), &code));
    }

    Ok(text)
}

impl TokenResponse {
    fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            uid: OwnerId::new(self.local_id.clone()),
            name: self.display_name.clone().filter(|name| !name.is_empty()),
            email: self.email.clone(),
        }
    }
}

impl FirebaseBackend {
    fn accounts_url(&self, action: &str) -> String {
        format!(
            "{}/v1/accounts:{action}",
            self.config().auth_url.as_str().trim_end_matches('/')
        )
    }

    /// POST an `accounts:*` call and decode the token response.
    async fn accounts_call<B: Serialize + Sync>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<TokenResponse, AuthError> {
        let response = self
            .client()
            .post(self.accounts_url(action))
            .query(&[("key", self.config().api_key())])
            .json(body)
            .send()
            .await
            .map_err(BackendError::from)?;

        let text = read_auth_body(response, action).await?;
        Ok(parse_json(&text)?)
    }

    fn token_url(&self) -> String {
        format!(
            "{}/v1/token",
            self.config().token_url.as_str().trim_end_matches('/')
        )
    }

    /// Exchange the refresh token for a new ID token.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` when there is no refresh token or the provider
    /// rejects it, or `Backend` on transport failures.
    #[instrument(skip(self))]
    pub(super) async fn try_refresh_token(&self) -> Result<(), AuthError> {
        let Some((refresh_token, identity)) = self.refresh_grant() else {
            return Err(AuthError::NotSignedIn);
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
        ];
        let response = self
            .client()
            .post(self.token_url())
            .query(&[("key", self.config().api_key())])
            .form(&params)
            .send()
            .await
            .map_err(BackendError::from)?;

        let text = read_auth_body(response, "token").await?;
        let refreshed: RefreshResponse = parse_json(&text)?;
        self.replace_tokens(AuthTokens {
            id_token: SecretString::from(refreshed.id_token),
            refresh_token: Some(SecretString::from(refreshed.refresh_token)),
            expires_at: expiry(Some(&refreshed.expires_in)),
            identity,
        });
        debug!("ID token refreshed");
        Ok(())
    }

    /// Current refresh token and the identity it belongs to.
    fn refresh_grant(&self) -> Option<(SecretString, SessionIdentity)> {
        let guard = self
            .inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let tokens = guard.as_ref()?;
        let refresh_token = tokens.refresh_token.as_ref()?.expose_secret();
        Some((SecretString::from(refresh_token), tokens.identity.clone()))
    }

    async fn password_call(
        &self,
        action: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<SessionIdentity, AuthError> {
        let response = self
            .accounts_call(
                action,
                &PasswordRequest {
                    email: email.as_str(),
                    password: password.expose_secret(),
                    return_secure_token: true,
                },
            )
            .await?;

        let id_token = response
            .id_token
            .clone()
            .ok_or_else(|| BackendError::Parse("response without idToken".to_string()))?;
        let identity = response.identity();
        self.store_tokens(Some(AuthTokens {
            id_token: SecretString::from(id_token),
            refresh_token: response.refresh_token.map(SecretString::from),
            expires_at: expiry(response.expires_in.as_deref()),
            identity: identity.clone(),
        }));
        Ok(identity)
    }
}

impl AuthProvider for FirebaseBackend {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SessionIdentity, AuthError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SessionIdentity, AuthError> {
        self.password_call("signUp", email, password).await
    }

    #[instrument(skip(self))]
    async fn update_display_name(&self, name: &str) -> Result<SessionIdentity, AuthError> {
        let id_token = self.fresh_id_token().await.ok_or(AuthError::NotSignedIn)?;
        let response = self
            .accounts_call(
                "update",
                &UpdateProfileRequest {
                    id_token: &id_token,
                    display_name: name,
                    return_secure_token: true,
                },
            )
            .await?;

        let mut identity = response.identity();
        if identity.name.is_none() {
            identity.name = Some(name.to_string());
        }
        // `update` may rotate the tokens; keep the current ones otherwise.
        match response.id_token {
            Some(id_token) => self.store_tokens(Some(AuthTokens {
                id_token: SecretString::from(id_token),
                refresh_token: response.refresh_token.map(SecretString::from),
                expires_at: expiry(response.expires_in.as_deref()),
                identity: identity.clone(),
            })),
            None => self.store_identity(identity.clone()),
        }
        Ok(identity)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        // ID tokens are stateless; dropping them is the whole sign-out.
        self.store_tokens(None);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.inner.events.subscribe()
    }
}
