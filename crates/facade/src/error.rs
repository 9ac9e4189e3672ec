//! Unified error handling with Sentry integration.
//!
//! Every API handler returns `Result<T, AppError>`. Failures are rendered as
//! the uniform `{ "success": false, "message": "..." }` envelope; gateway and
//! internal errors are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use paygate_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Application-level error type for the facade.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input was rejected before reaching the gateway.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The gateway call failed or reported an error.
    #[error(transparent)]
    Gateway(GatewayError),

    /// The gateway does not know the requested order, term or subscription.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every failed API response.
#[derive(Debug, Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub message: String,
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message text shown to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Gateway(_) | Self::Internal(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
            Self::Validation(err) => tracing::info!(error = %err, "Rejected request"),
            Self::NotFound(_) => {}
        }

        let body = FailureEnvelope {
            success: false,
            message: self.client_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected {
                status: 404,
                message,
            } => Self::NotFound(message),
            other => Self::Gateway(other),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a gateway interaction.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of calls
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
