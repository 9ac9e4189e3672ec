//! HTTP implementation of the payment gateway.
//!
//! One request per call: no retries, no caching. Transport timeouts come
//! from [`GatewayConfig::timeout`].

use async_trait::async_trait;
use paygate_core::{ConversationId, ReferenceId, SubscriptionId, TermReferenceId};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{
    CreatedOrder, CreatedSubscription, GatewayError, ManualCallback, OrderListFilter,
    OrderRequest, Page, PaymentGateway, RefundOrder, SubscriptionRequest, TermCreate,
    TermDelete, TermRefund, TermUpdate,
};
use crate::config::GatewayConfig;

/// Payment gateway client over HTTPS with bearer authentication.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| GatewayError::Decode(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Decode(format!("invalid endpoint {path}: {e}")))
    }

    fn endpoint_with_query(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Url, GatewayError> {
        let mut url = self.endpoint(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.request(method, url).json(body).send().await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send_json(reqwest::Method::POST, url, body).await
    }
}

/// Turn a gateway response into `T`, or into the gateway's error message.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Pull a human-readable message out of a gateway error body.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
        })
        .map_or_else(
            || {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "no error details".to_string()
                } else {
                    trimmed.chars().take(500).collect()
                }
            },
            str::to_string,
        )
}

/// Wire shape of the create-order response; `reference_id` is validated.
#[derive(serde::Deserialize)]
struct CreateOrderResponse {
    reference_id: Option<ReferenceId>,
    checkout_url: Option<String>,
}

#[derive(serde::Deserialize)]
struct CreateSubscriptionResponse {
    reference_id: Option<SubscriptionId>,
    order_reference_id: Option<ReferenceId>,
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    #[instrument(skip(self, order), fields(conversation_id = %order.conversation_id, amount = %order.amount))]
    async fn create_order(&self, order: &OrderRequest) -> Result<CreatedOrder, GatewayError> {
        let response: CreateOrderResponse = self.post("order/create", order).await?;
        let reference_id = response
            .reference_id
            .ok_or(GatewayError::MissingField("reference_id"))?;

        tracing::info!(reference_id = %reference_id, "Order created");

        Ok(CreatedOrder {
            reference_id,
            checkout_url: response.checkout_url.filter(|url| !url.is_empty()),
        })
    }

    #[instrument(skip(self))]
    async fn checkout_url(&self, reference_id: &ReferenceId) -> Result<String, GatewayError> {
        let order = self.order_details(reference_id).await?;
        order
            .get("checkout_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or(GatewayError::MissingField("checkout_url"))
    }

    #[instrument(skip(self))]
    async fn list_orders(&self, filter: &OrderListFilter) -> Result<Value, GatewayError> {
        let url = self.endpoint_with_query(
            "order/list",
            &[
                ("page", Some(filter.page.to_string())),
                ("per_page", Some(filter.per_page.to_string())),
                ("start_date", filter.start_date.clone()),
                ("end_date", filter.end_date.clone()),
                ("organization_id", filter.organization_id.clone()),
                ("related_reference_id", filter.related_reference_id.clone()),
                ("buyer_id", filter.buyer_id.clone()),
            ],
        )?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn order_details(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("order/{reference_id}"))?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn order_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("order/conversation/{conversation_id}"))?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn order_transactions(
        &self,
        reference_id: &ReferenceId,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("order/{reference_id}/transactions"))?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn order_status(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("order/{reference_id}/status"))?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn order_submerchants(&self, page: Page) -> Result<Value, GatewayError> {
        let url = self.endpoint_with_query(
            "order/submerchants",
            &[
                ("page", Some(page.page.to_string())),
                ("per_page", Some(page.per_page.to_string())),
            ],
        )?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn organization_settings(&self) -> Result<Value, GatewayError> {
        let url = self.endpoint("organization/settings")?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn terminate_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.post(
            "order/terminate",
            &serde_json::json!({ "reference_id": reference_id }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, reference_id: &ReferenceId) -> Result<Value, GatewayError> {
        self.post(
            "order/cancel",
            &serde_json::json!({ "reference_id": reference_id }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn refund_order(&self, refund: &RefundOrder) -> Result<Value, GatewayError> {
        self.post("order/refund", refund).await
    }

    #[instrument(skip(self))]
    async fn manual_callback(&self, callback: &ManualCallback) -> Result<Value, GatewayError> {
        self.post("order/callback", callback).await
    }

    #[instrument(skip(self, subscription), fields(title = %subscription.title))]
    async fn create_subscription(
        &self,
        subscription: &SubscriptionRequest,
    ) -> Result<CreatedSubscription, GatewayError> {
        let response: CreateSubscriptionResponse =
            self.post("subscription/create", subscription).await?;
        let reference_id = response
            .reference_id
            .ok_or(GatewayError::MissingField("reference_id"))?;

        tracing::info!(reference_id = %reference_id, "Subscription created");

        Ok(CreatedSubscription {
            reference_id,
            order_reference_id: response.order_reference_id,
        })
    }

    #[instrument(skip(self))]
    async fn list_subscriptions(&self, page: Page) -> Result<Value, GatewayError> {
        let url = self.endpoint_with_query(
            "subscription/list",
            &[
                ("page", Some(page.page.to_string())),
                ("per_page", Some(page.per_page.to_string())),
            ],
        )?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, id: &SubscriptionId) -> Result<Value, GatewayError> {
        self.post(
            "subscription/cancel",
            &serde_json::json!({ "reference_id": id }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn create_term(&self, term: &TermCreate) -> Result<Value, GatewayError> {
        self.post("order/term", term).await
    }

    #[instrument(skip(self))]
    async fn term(&self, term_reference_id: &TermReferenceId) -> Result<Value, GatewayError> {
        let url = self.endpoint_with_query(
            "order/term",
            &[("term_reference_id", Some(term_reference_id.to_string()))],
        )?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn update_term(&self, update: &TermUpdate) -> Result<Value, GatewayError> {
        let url = self.endpoint("order/term")?;
        self.send_json(reqwest::Method::PATCH, url, update).await
    }

    #[instrument(skip(self))]
    async fn refund_term(&self, refund: &TermRefund) -> Result<Value, GatewayError> {
        self.post("order/term/refund", refund).await
    }

    #[instrument(skip(self))]
    async fn delete_term(&self, term: &TermDelete) -> Result<Value, GatewayError> {
        let url = self.endpoint("order/term")?;
        self.send_json(reqwest::Method::DELETE, url, term).await
    }
}
