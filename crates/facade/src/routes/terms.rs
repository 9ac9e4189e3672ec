//! Installment-term route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use paygate_core::TermReferenceId;
use serde_json::Value;
use tracing::instrument;

use crate::assembly::{
    TermCreateInput, TermDeleteInput, TermRefundInput, TermUpdateInput, parse_body,
};
use crate::error::Result;
use crate::gateway::OrderListFilter;
use crate::state::AppState;

/// Page size of the term scan.
pub const SCAN_PAGE_SIZE: u32 = 20;

#[instrument(skip(state, body))]
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let term = parse_body::<TermCreateInput>(&body)?.assemble()?;
    let response = state.gateway().create_term(&term).await?;
    tracing::info!(order_id = %term.order_id, due_date = %term.due_date, "Term created");
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(term_reference_id): Path<String>,
) -> Result<Json<Value>> {
    let term_reference_id = TermReferenceId::new(term_reference_id);
    Ok(Json(state.gateway().term(&term_reference_id).await?))
}

/// Apply a partial update; fields the client left out are not sent.
#[instrument(skip(state, body))]
pub async fn update(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let update = parse_body::<TermUpdateInput>(&body)?.assemble()?;
    let response = state.gateway().update_term(&update).await?;
    tracing::info!(term_reference_id = %update.term_reference_id, "Term updated");
    Ok(Json(response))
}

#[instrument(skip(state, body))]
pub async fn refund(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let refund = parse_body::<TermRefundInput>(&body)?.assemble()?;
    let response = state.gateway().refund_term(&refund).await?;
    tracing::info!(term_id = %refund.term_id, amount = ?refund.amount, "Term refunded");
    Ok(Json(response))
}

#[instrument(skip(state, body))]
pub async fn delete(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let term = parse_body::<TermDeleteInput>(&body)?.assemble()?;
    let response = state.gateway().delete_term(&term).await?;
    tracing::info!(
        order_id = %term.order_id,
        term_reference_id = %term.term_reference_id,
        "Term deleted"
    );
    Ok(Json(response))
}

/// First page of orders, used by the front end to poll for term changes.
#[instrument(skip(state))]
pub async fn scan(State(state): State<AppState>) -> Result<Json<Value>> {
    let filter = OrderListFilter {
        page: 1,
        per_page: SCAN_PAGE_SIZE,
        ..OrderListFilter::default()
    };
    Ok(Json(state.gateway().list_orders(&filter).await?))
}
