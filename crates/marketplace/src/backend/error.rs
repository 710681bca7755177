//! Backend error types.

use thiserror::Error;

/// Errors returned by document and blob store calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse or encode a payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The call needs a signed-in user.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The addressed document or object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service is unreachable or refused the call.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors returned by the auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("email already in use")]
    EmailInUse,

    /// Provider rejected the password.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// Transport or service failure.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl AuthError {
    /// Map an Identity Toolkit error code to an auth error.
    ///
    /// Codes arrive as `"EMAIL_EXISTS"` or `"WEAK_PASSWORD : Password should be..."`.
    #[must_use]
    pub fn from_identity_code(status: u16, code: &str) -> Self {
        let (head, detail) = code
            .split_once(':')
            .map_or((code, ""), |(head, detail)| (head.trim(), detail.trim()));
        match head {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "USER_DISABLED" | "INVALID_EMAIL" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::EmailInUse,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_string()),
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN" => {
                Self::NotSignedIn
            }
            _ => Self::Backend(BackendError::Api {
                status,
                message: code.to_string(),
            }),
        }
    }
}
