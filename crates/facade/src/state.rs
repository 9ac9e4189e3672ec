//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{CheckoutDefaults, FacadeConfig};
use crate::gateway::{GatewayError, HttpGateway, PaymentGateway};
use crate::webhooks::{FilesystemWebhookStore, WebhookStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the gateway
/// capability, the webhook store and the checkout defaults.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    checkout: CheckoutDefaults,
    gateway: Arc<dyn PaymentGateway>,
    webhooks: Arc<dyn WebhookStore>,
}

impl AppState {
    /// Build the production state: HTTP gateway and filesystem webhook store.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway client cannot be constructed.
    pub fn from_config(config: &FacadeConfig) -> Result<Self, GatewayError> {
        let gateway = HttpGateway::new(&config.gateway)?;
        let webhooks = FilesystemWebhookStore::new(config.webhook_dir.clone());

        Ok(Self::new(
            config.checkout.clone(),
            Arc::new(gateway),
            Arc::new(webhooks),
        ))
    }

    /// Create a state from explicit collaborators.
    #[must_use]
    pub fn new(
        checkout: CheckoutDefaults,
        gateway: Arc<dyn PaymentGateway>,
        webhooks: Arc<dyn WebhookStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                checkout,
                gateway,
                webhooks,
            }),
        }
    }

    /// Get the deployment defaults used by the assemblers.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutDefaults {
        &self.inner.checkout
    }

    /// Get the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// Get the webhook store.
    #[must_use]
    pub fn webhooks(&self) -> &dyn WebhookStore {
        self.inner.webhooks.as_ref()
    }
}
