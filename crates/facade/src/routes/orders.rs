//! Order route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use paygate_core::{ConversationId, ReferenceId};
use serde_json::Value;
use tracing::instrument;

use super::{CreatedResponse, resolve_checkout_url};
use crate::assembly::{
    CheckoutInput, ManualCallbackInput, OrderListQuery, PageQuery, ReferenceInput, RefundInput,
    RequestOrigin, assemble_order, parse_body,
};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Assemble a checkout payload into a gateway order and create it.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    origin: RequestOrigin,
    body: Bytes,
) -> Result<Json<CreatedResponse>> {
    let input: CheckoutInput = parse_body(&body)?;
    let order = assemble_order(input, &origin.return_urls(), state.checkout())?;

    let amount = order.amount.to_string();
    let items = order.basket_items.len().to_string();
    add_breadcrumb(
        "gateway",
        "Creating order",
        Some(&[
            ("conversation_id", order.conversation_id.as_str()),
            ("amount", amount.as_str()),
            ("items", items.as_str()),
        ]),
    );

    let created = state.gateway().create_order(&order).await?;
    let checkout_url =
        resolve_checkout_url(state.gateway(), &created.reference_id, created.checkout_url).await;

    tracing::info!(
        reference_id = %created.reference_id,
        conversation_id = %order.conversation_id,
        amount = %order.amount,
        "Order created"
    );

    Ok(Json(CreatedResponse {
        success: true,
        reference_id: created.reference_id.into_inner(),
        checkout_url,
    }))
}

/// Paged order listing.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Value>> {
    let filter = query.assemble()?;
    Ok(Json(state.gateway().list_orders(&filter).await?))
}

#[instrument(skip(state))]
pub async fn details(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Json<Value>> {
    let reference_id = ReferenceId::new(reference_id);
    Ok(Json(state.gateway().order_details(&reference_id).await?))
}

#[instrument(skip(state))]
pub async fn by_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Value>> {
    let conversation_id = ConversationId::new(conversation_id);
    Ok(Json(
        state.gateway().order_by_conversation(&conversation_id).await?,
    ))
}

#[instrument(skip(state))]
pub async fn transactions(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Json<Value>> {
    let reference_id = ReferenceId::new(reference_id);
    Ok(Json(state.gateway().order_transactions(&reference_id).await?))
}

#[instrument(skip(state))]
pub async fn payment_status(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Json<Value>> {
    let reference_id = ReferenceId::new(reference_id);
    Ok(Json(state.gateway().order_status(&reference_id).await?))
}

#[instrument(skip(state))]
pub async fn submerchants(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let page = query.assemble()?;
    Ok(Json(state.gateway().order_submerchants(page).await?))
}

#[instrument(skip(state))]
pub async fn organization_settings(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(state.gateway().organization_settings().await?))
}

#[instrument(skip(state, body))]
pub async fn terminate(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let reference_id = parse_body::<ReferenceInput>(&body)?.assemble()?;
    let response = state.gateway().terminate_order(&reference_id).await?;
    tracing::info!(reference_id = %reference_id, "Order terminated");
    Ok(Json(response))
}

#[instrument(skip(state, body))]
pub async fn cancel(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let reference_id = parse_body::<ReferenceInput>(&body)?.assemble()?;
    let response = state.gateway().cancel_order(&reference_id).await?;
    tracing::info!(reference_id = %reference_id, "Order cancelled");
    Ok(Json(response))
}

/// Refund an order; without an amount the whole order is refunded.
#[instrument(skip(state, body))]
pub async fn refund(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let refund = parse_body::<RefundInput>(&body)?.assemble()?;
    let response = state.gateway().refund_order(&refund).await?;
    tracing::info!(
        reference_id = %refund.reference_id,
        amount = ?refund.amount,
        "Order refunded"
    );
    Ok(Json(response))
}

#[instrument(skip(state, body))]
pub async fn manual_callback(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let callback = parse_body::<ManualCallbackInput>(&body)?.assemble()?;
    Ok(Json(state.gateway().manual_callback(&callback).await?))
}
