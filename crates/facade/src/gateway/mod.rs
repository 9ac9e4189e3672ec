//! Payment gateway facade.
//!
//! Assembled payloads are handed to a [`PaymentGateway`]. The production
//! implementation is [`HttpGateway`]; tests inject a recording double.
//!
//! # Operations
//!
//! | Method                  | Gateway call                   |
//! |-------------------------|--------------------------------|
//! | `create_order`          | `POST order/create`            |
//! | `checkout_url`          | `GET order/{ref}`              |
//! | `list_orders`           | `GET order/list`               |
//! | `order_details`         | `GET order/{ref}`              |
//! | `order_by_conversation` | `GET order/conversation/{id}`  |
//! | `order_transactions`    | `GET order/{ref}/transactions` |
//! | `order_status`          | `GET order/{ref}/status`       |
//! | `order_submerchants`    | `GET order/submerchants`       |
//! | `organization_settings` | `GET organization/settings`    |
//! | `terminate_order`       | `POST order/terminate`         |
//! | `cancel_order`          | `POST order/cancel`            |
//! | `refund_order`          | `POST order/refund`            |
//! | `manual_callback`       | `POST order/callback`          |
//! | `create_subscription`   | `POST subscription/create`     |
//! | `list_subscriptions`    | `GET subscription/list`        |
//! | `cancel_subscription`   | `POST subscription/cancel`     |
//! | `create_term`           | `POST order/term`              |
//! | `term`                  | `GET order/term`               |
//! | `update_term`           | `PATCH order/term`             |
//! | `refund_term`           | `POST order/term/refund`       |
//! | `delete_term`           | `DELETE order/term`            |

mod client;
pub mod types;

use async_trait::async_trait;
use paygate_core::{ConversationId, ReferenceId, SubscriptionId, TermReferenceId};
use serde_json::Value;
use thiserror::Error;

pub use client::HttpGateway;
pub use types::*;

/// Errors from a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("gateway unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected gateway response: {0}")]
    Decode(String),

    /// A field the facade relies on was absent from the response.
    #[error("gateway response is missing {0}")]
    MissingField(&'static str),
}

/// Capabilities the facade needs from the payment gateway.
///
/// Passthrough reads and mutations return the gateway's JSON unchanged;
/// creation calls return the few fields the facade consumes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, order: &OrderRequest) -> Result<CreatedOrder, GatewayError>;

    /// Hosted checkout page for an order.
    async fn checkout_url(&self, reference_id: &ReferenceId) -> Result<String, GatewayError>;

    async fn list_orders(&self, filter: &OrderListFilter) -> Result<Value, GatewayError>;

    async fn order_details(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError>;

    async fn order_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Value, GatewayError>;

    async fn order_transactions(&self, reference_id: &ReferenceId)
    -> Result<Value, GatewayError>;

    async fn order_status(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError>;

    async fn order_submerchants(&self, page: Page) -> Result<Value, GatewayError>;

    async fn organization_settings(&self) -> Result<Value, GatewayError>;

    async fn terminate_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError>;

    async fn cancel_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError>;

    async fn refund_order(&self, refund: &RefundOrder) -> Result<Value, GatewayError>;

    async fn manual_callback(&self, callback: &ManualCallback) -> Result<Value, GatewayError>;

    async fn create_subscription(
        &self,
        subscription: &SubscriptionRequest,
    ) -> Result<CreatedSubscription, GatewayError>;

    async fn list_subscriptions(&self, page: Page) -> Result<Value, GatewayError>;

    async fn cancel_subscription(&self, id: &SubscriptionId) -> Result<Value, GatewayError>;

    async fn create_term(&self, term: &TermCreate) -> Result<Value, GatewayError>;

    async fn term(&self, term_reference_id: &TermReferenceId) -> Result<Value, GatewayError>;

    async fn update_term(&self, update: &TermUpdate) -> Result<Value, GatewayError>;

    async fn refund_term(&self, refund: &TermRefund) -> Result<Value, GatewayError>;

    async fn delete_term(&self, term: &TermDelete) -> Result<Value, GatewayError>;
}
