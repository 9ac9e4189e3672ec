//! Webhook receivers and the stored-webhook listing.
//!
//! Receivers always answer `{"status": "ok"}`: the gateway only needs to
//! know the delivery arrived, and a storage failure is ours to fix. That
//! includes bodies that cannot be read, such as ones over
//! [`WEBHOOK_BODY_LIMIT`].

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use paygate_core::WebhookKind;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::webhooks::{DEFAULT_LIST_LIMIT, WebhookRecord};

/// Acknowledgement returned to the gateway.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
}

const ACK: Ack = Ack { status: "ok" };

/// Largest callback body that is read and stored.
pub const WEBHOOK_BODY_LIMIT: usize = 16 * 1024 * 1024;

async fn receive(
    state: &AppState,
    kind: WebhookKind,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<Ack> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::error!(
                kind = %kind,
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "Failed to read webhook body"
            );
            return Json(ACK);
        }
    };

    match state.webhooks().record(kind, &body).await {
        Ok(filename) => {
            tracing::info!(kind = %kind, filename = %filename, bytes = body.len(), "Webhook stored");
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "Failed to store webhook");
        }
    }
    Json(ACK)
}

#[instrument(skip(state, body))]
pub async fn callback(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<Ack> {
    receive(&state, WebhookKind::Callback, body).await
}

#[instrument(skip(state, body))]
pub async fn fail_callback(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<Ack> {
    receive(&state, WebhookKind::Fail, body).await
}

#[instrument(skip(state, body))]
pub async fn refund_callback(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<Ack> {
    receive(&state, WebhookKind::Refund, body).await
}

#[instrument(skip(state, body))]
pub async fn cancel_callback(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<Ack> {
    receive(&state, WebhookKind::Cancel, body).await
}

/// Most recent stored webhooks, newest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<WebhookRecord>>> {
    let records = state
        .webhooks()
        .list_recent(DEFAULT_LIST_LIMIT)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(records))
}
