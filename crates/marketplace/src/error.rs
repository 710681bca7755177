//! Error reporting with Sentry integration.
//!
//! Each workflow module defines its own `thiserror` enum. Backend failures
//! are captured to Sentry at the point where they become a user notice, via
//! [`capture_backend_error`].

use crate::backend::BackendError;

/// Capture a backend failure to Sentry and log it.
pub fn capture_backend_error(error: &BackendError, operation: &'static str) {
    let event_id = sentry::capture_error(error);
    tracing::error!(
        error = %error,
        operation,
        sentry_event_id = %event_id,
        "Backend operation failed"
    );
}

/// Set the Sentry user context.
///
/// Called on every sign-in so captured errors are associated with the user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a user action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
