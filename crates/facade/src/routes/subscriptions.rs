//! Subscription route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde_json::Value;
use tracing::instrument;

use super::{CreatedResponse, resolve_checkout_url};
use crate::assembly::{
    PageQuery, RequestOrigin, SubscriptionCancelInput, SubscriptionInput, assemble_subscription,
    parse_body,
};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Create a subscription.
///
/// The checkout URL comes from the order the gateway opens for the first
/// charge; a subscription without one reports `checkout_url: null`.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    origin: RequestOrigin,
    body: Bytes,
) -> Result<Json<CreatedResponse>> {
    let input: SubscriptionInput = parse_body(&body)?;
    let subscription = assemble_subscription(input, &origin.return_urls(), state.checkout())?;

    add_breadcrumb("gateway", "Creating subscription", None);
    let created = state.gateway().create_subscription(&subscription).await?;

    let checkout_url = match &created.order_reference_id {
        Some(order) => resolve_checkout_url(state.gateway(), order, None).await,
        None => None,
    };

    tracing::info!(
        subscription_id = %created.reference_id,
        period = subscription.period,
        amount = %subscription.amount,
        "Subscription created"
    );

    Ok(Json(CreatedResponse {
        success: true,
        reference_id: created.reference_id.into_inner(),
        checkout_url,
    }))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let page = query.assemble()?;
    Ok(Json(state.gateway().list_subscriptions(page).await?))
}

#[instrument(skip(state, body))]
pub async fn cancel(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let id = parse_body::<SubscriptionCancelInput>(&body)?.assemble()?;
    let response = state.gateway().cancel_subscription(&id).await?;
    tracing::info!(subscription_id = %id, "Subscription cancelled");
    Ok(Json(response))
}
