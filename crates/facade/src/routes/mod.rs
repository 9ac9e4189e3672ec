//! HTTP route handlers for the facade.
//!
//! # Route Structure
//!
//! ```text
//! # Orders
//! POST /api/order                        - Assemble and create an order
//! GET  /api/order/list                   - Paged order listing
//! GET  /api/order/details/{ref}          - Order details
//! GET  /api/order/conversation/{id}      - Order by conversation ID
//! GET  /api/order/transactions/{ref}     - Order transactions
//! GET  /api/payment/status/{ref}         - Payment status
//! GET  /api/order/submerchants           - Submerchant listing
//! GET  /api/organization/settings        - Organization settings
//! POST /api/order/terminate              - Terminate an order
//! POST /api/order/cancel                 - Cancel an order
//! POST /api/order/refund                 - Refund (whole or partial)
//! POST /api/order/manual-callback        - Ask the gateway to resend its callback
//!
//! # Subscriptions
//! POST /api/subscription                 - Create a subscription
//! GET  /api/subscription/list            - Subscription listing
//! POST /api/subscription/cancel          - Cancel a subscription
//!
//! # Installment terms
//! POST /api/term/create                  - Add a term to an order
//! GET  /api/term/scan                    - Bounded order listing (polling check)
//! GET  /api/term/{ref}                   - Term details
//! POST /api/term/update                  - Partial term update
//! POST /api/term/refund                  - Refund a term
//! POST /api/term/delete                  - Remove a term
//!
//! # Webhooks
//! POST /api/callback                     - Payment result callback
//! POST /api/fail_callback                - Failed payment callback
//! POST /api/refund_callback              - Refund callback
//! POST /api/cancel_callback              - Cancel callback
//! GET  /api/webhooks                     - Most recent stored webhooks
//! ```

pub mod orders;
pub mod subscriptions;
pub mod terms;
pub mod webhooks;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use paygate_core::ReferenceId;
use serde::Serialize;

use crate::gateway::PaymentGateway;
use crate::state::AppState;

/// Success body of order and subscription creation.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub reference_id: String,
    pub checkout_url: Option<String>,
}

/// Checkout URL for a freshly created reference.
///
/// The gateway usually returns the URL with the creation response; when it
/// does not, it is looked up. A failed lookup is logged and yields `None`,
/// since the order itself already exists on the gateway.
pub(crate) async fn resolve_checkout_url(
    gateway: &dyn PaymentGateway,
    reference_id: &ReferenceId,
    returned: Option<String>,
) -> Option<String> {
    if let Some(url) = returned.filter(|url| !url.trim().is_empty()) {
        return Some(url);
    }

    match gateway.checkout_url(reference_id).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(
                reference_id = %reference_id,
                error = %e,
                "Checkout URL lookup failed"
            );
            None
        }
    }
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/list", get(orders::list))
        .route("/details/{reference_id}", get(orders::details))
        .route("/conversation/{conversation_id}", get(orders::by_conversation))
        .route("/transactions/{reference_id}", get(orders::transactions))
        .route("/submerchants", get(orders::submerchants))
        .route("/terminate", post(orders::terminate))
        .route("/cancel", post(orders::cancel))
        .route("/refund", post(orders::refund))
        .route("/manual-callback", post(orders::manual_callback))
}

/// Create the subscription routes router.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(subscriptions::create))
        .route("/list", get(subscriptions::list))
        .route("/cancel", post(subscriptions::cancel))
}

/// Create the installment-term routes router.
pub fn term_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(terms::create))
        .route("/scan", get(terms::scan))
        .route("/update", post(terms::update))
        .route("/refund", post(terms::refund))
        .route("/delete", post(terms::delete))
        .route("/{term_reference_id}", get(terms::show))
}

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/callback", post(webhooks::callback))
        .route("/fail_callback", post(webhooks::fail_callback))
        .route("/refund_callback", post(webhooks::refund_callback))
        .route("/cancel_callback", post(webhooks::cancel_callback))
        .route("/webhooks", get(webhooks::list))
        .layer(DefaultBodyLimit::max(webhooks::WEBHOOK_BODY_LIMIT))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/order", order_routes())
        .route("/payment/status/{reference_id}", get(orders::payment_status))
        .route("/organization/settings", get(orders::organization_settings))
        .nest("/subscription", subscription_routes())
        .nest("/term", term_routes())
        .merge(webhook_routes());

    Router::new().nest("/api", api)
}
