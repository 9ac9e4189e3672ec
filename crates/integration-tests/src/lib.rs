//! Integration test harness for the Paygate facade.
//!
//! Tests drive the real router through `tower::ServiceExt::oneshot` with a
//! [`RecordingGateway`] in place of the HTTP gateway client and a temporary
//! directory as the webhook store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paygate-integration-tests
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use paygate_core::{ConversationId, ReferenceId, SubscriptionId, TermReferenceId};
use paygate_facade::{
    app,
    config::CheckoutDefaults,
    gateway::{
        CreatedOrder, CreatedSubscription, GatewayError, ManualCallback, OrderListFilter,
        OrderRequest, Page, PaymentGateway, RefundOrder, SubscriptionRequest, TermCreate,
        TermDelete, TermRefund, TermUpdate,
    },
    state::AppState,
    webhooks::FilesystemWebhookStore,
};
use serde::Serialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Host header sent with every test request.
pub const TEST_HOST: &str = "shop.example.com";

/// One call received by the [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    pub operation: &'static str,
    pub payload: Value,
}

/// Gateway double that records every call and answers from canned responses.
///
/// Passthrough operations answer `{"operation": .., "request": ..}` so tests
/// can see what reached the gateway. A configured rejection makes every call
/// fail with [`GatewayError::Rejected`].
#[derive(Debug)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    order_reference: String,
    order_checkout_url: Option<String>,
    lookup_checkout_url: Option<String>,
    subscription_order: Option<String>,
    rejection: Option<(u16, String)>,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            order_reference: "ord-test-1".to_string(),
            order_checkout_url: Some("https://checkout.example.test/ord-test-1".to_string()),
            lookup_checkout_url: Some("https://checkout.example.test/lookup".to_string()),
            subscription_order: None,
            rejection: None,
        }
    }
}

impl RecordingGateway {
    /// Order creation answers without a checkout URL, forcing a lookup.
    #[must_use]
    pub fn without_checkout_url(mut self) -> Self {
        self.order_checkout_url = None;
        self
    }

    /// The checkout URL lookup fails.
    #[must_use]
    pub fn failing_lookup(mut self) -> Self {
        self.lookup_checkout_url = None;
        self
    }

    /// Subscription creation opens the given order for the first charge.
    #[must_use]
    pub fn with_subscription_order(mut self, reference_id: &str) -> Self {
        self.subscription_order = Some(reference_id.to_string());
        self
    }

    /// Every call is rejected with this status and message.
    #[must_use]
    pub fn rejecting(mut self, status: u16, message: &str) -> Self {
        self.rejection = Some((status, message.to_string()));
        self
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Operations received so far, oldest first.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }

    /// Payload of the first call to `operation`.
    #[must_use]
    pub fn payload_of(&self, operation: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .find(|call| call.operation == operation)
            .map(|call| call.payload)
    }

    fn record(&self, operation: &'static str, payload: &impl Serialize) -> Result<(), GatewayError> {
        let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(GatewayCall { operation, payload });

        match &self.rejection {
            Some((status, message)) => Err(GatewayError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn passthrough(
        &self,
        operation: &'static str,
        payload: &impl Serialize,
    ) -> Result<Value, GatewayError> {
        self.record(operation, payload)?;
        Ok(json!({
            "operation": operation,
            "request": serde_json::to_value(payload).unwrap_or(Value::Null),
        }))
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_order(&self, order: &OrderRequest) -> Result<CreatedOrder, GatewayError> {
        self.record("create_order", order)?;
        Ok(CreatedOrder {
            reference_id: ReferenceId::new(self.order_reference.clone()),
            checkout_url: self.order_checkout_url.clone(),
        })
    }

    async fn checkout_url(&self, reference_id: &ReferenceId) -> Result<String, GatewayError> {
        self.record("checkout_url", &reference_id.as_str())?;
        self.lookup_checkout_url
            .clone()
            .ok_or(GatewayError::MissingField("checkout_url"))
    }

    async fn list_orders(&self, filter: &OrderListFilter) -> Result<Value, GatewayError> {
        self.passthrough("list_orders", filter)
    }

    async fn order_details(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("order_details", &reference_id.as_str())
    }

    async fn order_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Value, GatewayError> {
        self.passthrough("order_by_conversation", &conversation_id.as_str())
    }

    async fn order_transactions(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("order_transactions", &reference_id.as_str())
    }

    async fn order_status(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("order_status", &reference_id.as_str())
    }

    async fn order_submerchants(&self, page: Page) -> Result<Value, GatewayError> {
        self.passthrough("order_submerchants", &page)
    }

    async fn organization_settings(&self) -> Result<Value, GatewayError> {
        self.passthrough("organization_settings", &Value::Null)
    }

    async fn terminate_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("terminate_order", &reference_id.as_str())
    }

    async fn cancel_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("cancel_order", &reference_id.as_str())
    }

    async fn refund_order(&self, refund: &RefundOrder) -> Result<Value, GatewayError> {
        self.passthrough("refund_order", refund)
    }

    async fn manual_callback(&self, callback: &ManualCallback) -> Result<Value, GatewayError> {
        self.passthrough("manual_callback", callback)
    }

    async fn create_subscription(
        &self,
        subscription: &SubscriptionRequest,
    ) -> Result<CreatedSubscription, GatewayError> {
        self.record("create_subscription", subscription)?;
        Ok(CreatedSubscription {
            reference_id: SubscriptionId::new("sub-test-1"),
            order_reference_id: self.subscription_order.clone().map(ReferenceId::new),
        })
    }

    async fn list_subscriptions(&self, page: Page) -> Result<Value, GatewayError> {
        self.passthrough("list_subscriptions", &page)
    }

    async fn cancel_subscription(&self, id: &SubscriptionId) -> Result<Value, GatewayError> {
        self.passthrough("cancel_subscription", &id.as_str())
    }

    async fn create_term(&self, term: &TermCreate) -> Result<Value, GatewayError> {
        self.passthrough("create_term", term)
    }

    async fn term(&self, term_reference_id: &TermReferenceId) -> Result<Value, GatewayError> {
        self.passthrough("term", &term_reference_id.as_str())
    }

    async fn update_term(&self, update: &TermUpdate) -> Result<Value, GatewayError> {
        self.passthrough("update_term", update)
    }

    async fn refund_term(&self, refund: &TermRefund) -> Result<Value, GatewayError> {
        self.passthrough("refund_term", refund)
    }

    async fn delete_term(&self, term: &TermDelete) -> Result<Value, GatewayError> {
        self.passthrough("delete_term", term)
    }
}

/// A router wired to a [`RecordingGateway`] and a temporary webhook store.
pub struct TestApp {
    router: Router,
    pub gateway: Arc<RecordingGateway>,
    // Held so the directory outlives the router.
    _webhook_root: TempDir,
}

impl TestApp {
    /// Default gateway, empty webhook store.
    ///
    /// # Panics
    ///
    /// Panics if a temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gateway(RecordingGateway::default())
    }

    /// Custom gateway, empty webhook store.
    ///
    /// # Panics
    ///
    /// Panics if a temporary directory cannot be created.
    #[must_use]
    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        let root = TempDir::new().expect("temporary directory");
        let webhook_dir = root.path().join("webhooks");
        Self::build(gateway, &webhook_dir, root)
    }

    /// Webhook store rooted under a regular file, so every write fails.
    ///
    /// # Panics
    ///
    /// Panics if the temporary fixture cannot be created.
    #[must_use]
    pub fn with_unwritable_store() -> Self {
        let root = TempDir::new().expect("temporary directory");
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"").expect("blocker file");
        Self::build(RecordingGateway::default(), &blocker.join("webhooks"), root)
    }

    fn build(gateway: RecordingGateway, webhook_dir: &Path, root: TempDir) -> Self {
        let gateway = Arc::new(gateway);
        let state = AppState::new(
            CheckoutDefaults::default(),
            gateway.clone(),
            Arc::new(FilesystemWebhookStore::new(webhook_dir)),
        );
        Self {
            router: app(state),
            gateway,
            _webhook_root: root,
        }
    }

    /// Send a request and decode the JSON response (`Value::Null` if empty
    /// or not JSON).
    ///
    /// # Panics
    ///
    /// Panics if the router fails to produce a response.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// `GET` a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::get(path)
            .header(header::HOST, TEST_HOST)
            .body(Body::empty())
            .expect("request");
        self.send(request).await
    }

    /// `POST` a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(path, body.to_string()).await
    }

    /// `POST` a raw body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::HOST, TEST_HOST)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("request");
        self.send(request).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal valid checkout payload.
#[must_use]
pub fn checkout_payload() -> Value {
    json!({
        "billing": {
            "contact_name": "Ada Lovelace",
            "email": "ada@example.com",
            "contact_phone": "+905551112233",
            "address": "1 Analytical St",
            "city": "Istanbul",
            "zip_code": "34000"
        },
        "cart": [
            { "name": "Notebook", "price": "0.10", "quantity": 1 },
            { "name": "Pen", "price": "0.10", "quantity": 2 }
        ]
    })
}
