//! Firebase backend over the public REST APIs.
//!
//! - Identity Toolkit (`accounts:*`) for email/password auth
//! - Firestore (`documents`, `documents:runQuery`) for listing records
//! - Cloud Storage for Firebase (`v0/b/{bucket}/o`) for images
//!
//! - Secure Token (`v1/token`) for ID token refresh
//!
//! The signed-in user's ID token is kept in memory and sent as a bearer
//! token on document and blob calls. It is refreshed with the refresh token
//! shortly before it expires. Listing detail reads are cached with `moka`;
//! deleting a listing evicts its entry.

mod auth;
pub mod codec;
mod firestore;
mod storage;

use std::sync::{Arc, PoisonError, RwLock};

use moka::future::Cache;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use drivex_core::ListingId;

use super::{AuthError, AuthEvents, BackendError};
use crate::config::{FirebaseConfig, MarketplaceConfig};
use crate::models::{ListingRecord, SessionIdentity};

/// Maximum cached listing details.
const DETAIL_CACHE_CAPACITY: u64 = 500;

/// Characters of an error body kept in logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Refresh the ID token when it expires within this many seconds.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Tokens of the signed-in user.
struct AuthTokens {
    id_token: SecretString,
    refresh_token: Option<SecretString>,
    /// Unix timestamp when the ID token expires
    expires_at: i64,
    identity: SessionIdentity,
}

impl AuthTokens {
    /// Check if the ID token expires within the given number of seconds.
    fn expires_within(&self, seconds: i64) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at - seconds
    }

    const fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    fn refresh_due(&self) -> bool {
        self.can_refresh() && self.expires_within(REFRESH_MARGIN_SECS)
    }
}

/// Document store, blob store and auth provider backed by Firebase.
#[derive(Clone)]
pub struct FirebaseBackend {
    inner: Arc<FirebaseBackendInner>,
}

struct FirebaseBackendInner {
    client: reqwest::Client,
    config: FirebaseConfig,
    collection: String,
    tokens: RwLock<Option<AuthTokens>>,
    events: AuthEvents,
    details: Option<Cache<ListingId, ListingRecord>>,
}

impl FirebaseBackend {
    /// Create a backend for the configured Firebase project.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &MarketplaceConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("drivex/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let details = (!config.detail_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(DETAIL_CACHE_CAPACITY)
                .time_to_live(config.detail_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(FirebaseBackendInner {
                client,
                config: config.firebase.clone(),
                collection: config.listings_collection.clone(),
                tokens: RwLock::new(None),
                events: AuthEvents::new(),
                details,
            }),
        })
    }

    fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    fn config(&self) -> &FirebaseConfig {
        &self.inner.config
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn current_identity(&self) -> Option<SessionIdentity> {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tokens| tokens.identity.clone())
    }

    fn id_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tokens| tokens.id_token.expose_secret().to_string())
    }

    /// Whether the ID token is close to expiry and can be refreshed.
    fn needs_refresh(&self) -> bool {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(AuthTokens::refresh_due)
    }

    /// ID token of the signed-in user, refreshed first when close to expiry.
    ///
    /// A refresh rejected by the provider signs the user out. A transport
    /// failure keeps the current token.
    async fn fresh_id_token(&self) -> Option<String> {
        if self.needs_refresh() {
            match self.try_refresh_token().await {
                Ok(()) => {}
                Err(AuthError::Backend(e)) => warn!(error = %e, "ID token refresh failed"),
                Err(e) => {
                    warn!(error = %e, "Refresh token rejected, signing out");
                    self.store_tokens(None);
                }
            }
        }
        self.id_token()
    }

    /// Swap in refreshed tokens for the same user without publishing.
    ///
    /// Ignored when the user signed out or changed during the refresh.
    fn replace_tokens(&self, tokens: AuthTokens) {
        let mut guard = self
            .inner
            .tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = guard.as_mut()
            && current.identity.uid == tokens.identity.uid
        {
            *current = tokens;
        }
    }

    /// Replace the signed-in identity, keeping the tokens, and publish it.
    fn store_identity(&self, identity: SessionIdentity) {
        let mut guard = self
            .inner
            .tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(tokens) = guard.as_mut() {
            tokens.identity = identity.clone();
        }
        drop(guard);
        self.inner.events.publish(Some(identity));
    }

    fn store_tokens(&self, tokens: Option<AuthTokens>) {
        let identity = tokens.as_ref().map(|t| t.identity.clone());
        *self
            .inner
            .tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner) = tokens;
        self.inner.events.publish(identity);
    }

    /// Attach the bearer token when signed in.
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.fresh_id_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Attach the bearer token, failing when signed out.
    async fn require_auth(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        self.fresh_id_token()
            .await
            .map(|token| request.bearer_auth(token))
            .ok_or(BackendError::Unauthenticated)
    }
}

/// Error envelope shared by the Google REST APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Extract the `error.message` of a Google API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |envelope| envelope.error.message,
    )
}

/// Read a response body, converting non-success statuses into errors.
async fn read_body(response: Response, service: &'static str) -> Result<String, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let logged = body.chars().take(LOGGED_BODY_CHARS).collect::<String>();
    if status == StatusCode::NOT_FOUND {
        // Missing documents are an expected outcome of `get`.
        tracing::debug!(service, body = %logged, "Firebase resource not found");
    } else {
        tracing::error!(
            service,
            status = %status,
            body = %logged,
            "Firebase returned non-success status"
        );
    }

    Err(status_error(status, error_message(&body)))
}

/// Map a non-success status to a backend error.
fn status_error(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthenticated,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
            BackendError::Unavailable(message)
        }
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Parse a JSON body, logging the payload on failure.
fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
            "Failed to parse Firebase response"
        );
        BackendError::from(e)
    })
}
