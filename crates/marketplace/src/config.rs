//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key of the Firebase project
//! - `FIREBASE_PROJECT_ID` - Firebase project id
//!
//! ## Optional
//! - `FIREBASE_STORAGE_BUCKET` - Storage bucket (default: `{project}.appspot.com`)
//! - `FIREBASE_AUTH_URL` - Identity Toolkit base URL (default: production; set for the emulator)
//! - `FIREBASE_TOKEN_URL` - Secure Token base URL for ID token refresh (default: production)
//! - `FIRESTORE_URL` - Firestore base URL (default: production)
//! - `FIREBASE_STORAGE_URL` - Cloud Storage base URL (default: production)
//! - `DRIVEX_LISTINGS_COLLECTION` - Listings collection (default: `vehicles`)
//! - `DRIVEX_DETAIL_CACHE_SECS` - Listing detail cache TTL in seconds (default: 60, 0 disables)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::backend::LISTINGS_COLLECTION;

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com";
const DEFAULT_DETAIL_CACHE_SECS: u64 = 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Marketplace configuration.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Firebase backend endpoints and credentials
    pub firebase: FirebaseConfig,
    /// Collection holding listing documents
    pub listings_collection: String,
    /// TTL for cached listing detail reads (`Duration::ZERO` disables caching)
    pub detail_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: SecretString,
    /// Project id
    pub project_id: String,
    /// Cloud Storage bucket
    pub storage_bucket: String,
    /// Identity Toolkit base URL
    pub auth_url: Url,
    /// Secure Token base URL
    pub token_url: Url,
    /// Firestore base URL
    pub firestore_url: Url,
    /// Cloud Storage base URL
    pub storage_url: Url,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("firestore_url", &self.firestore_url.as_str())
            .field("storage_url", &self.storage_url.as_str())
            .finish()
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let firebase = FirebaseConfig::from_env()?;
        let listings_collection =
            get_env_or_default("DRIVEX_LISTINGS_COLLECTION", LISTINGS_COLLECTION);
        let cache_secs = get_env_or_default(
            "DRIVEX_DETAIL_CACHE_SECS",
            &DEFAULT_DETAIL_CACHE_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("DRIVEX_DETAIL_CACHE_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            firebase,
            listings_collection,
            detail_cache_ttl: Duration::from_secs(cache_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_required_env("FIREBASE_API_KEY")?;
        validate_api_key(&api_key, "FIREBASE_API_KEY")?;
        let project_id = get_required_env("FIREBASE_PROJECT_ID")?;
        let storage_bucket = get_optional_env("FIREBASE_STORAGE_BUCKET")
            .unwrap_or_else(|| format!("{project_id}.appspot.com"));

        Ok(Self {
            api_key: SecretString::from(api_key),
            project_id,
            storage_bucket,
            auth_url: get_url("FIREBASE_AUTH_URL", DEFAULT_AUTH_URL)?,
            token_url: get_url("FIREBASE_TOKEN_URL", DEFAULT_TOKEN_URL)?,
            firestore_url: get_url("FIRESTORE_URL", DEFAULT_FIRESTORE_URL)?,
            storage_url: get_url("FIREBASE_STORAGE_URL", DEFAULT_STORAGE_URL)?,
        })
    }

    /// Configuration pointing every service at one base URL (emulator or test server).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` does not parse.
    pub fn with_base_url(
        api_key: SecretString,
        project_id: &str,
        base_url: &str,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string()))?;
        Ok(Self {
            api_key,
            project_id: project_id.to_string(),
            storage_bucket: format!("{project_id}.appspot.com"),
            auth_url: url.clone(),
            token_url: url.clone(),
            firestore_url: url.clone(),
            storage_url: url,
        })
    }

    /// The API key, for query strings.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a base URL, falling back to the production endpoint.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject empty or placeholder API keys.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.trim().is_empty() {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "is empty".to_string(),
        ));
    }

    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
