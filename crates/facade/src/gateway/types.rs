//! Payload shapes sent to and received from the payment gateway.
//!
//! These are the strict, validated forms produced by the assemblers. Field
//! names follow the gateway's JSON schema; amounts are serialized as JSON
//! number literals written from the decimal's own text, never through `f64`.

use paygate_core::{ConversationId, CurrencyCode, ReferenceId, SubscriptionId, TermReferenceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Item type tag for every basket line.
pub const PHYSICAL_ITEM: &str = "PHYSICAL";

// =============================================================================
// Orders
// =============================================================================

/// A checkout order, ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Sum of all basket line totals.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub locale: String,
    pub description: String,
    pub conversation_id: ConversationId,
    pub buyer: Buyer,
    pub basket_items: Vec<BasketItem>,
    pub billing_address: BillingAddress,
    pub shipping_address: ShippingAddress,
    pub callback_url: String,
    pub payment_success_url: String,
    pub payment_failure_url: String,
    pub three_d_force: bool,
    /// Ask the gateway to show every payment method it supports.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub payment_methods: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_installments: Vec<u32>,
    pub metadata: Vec<MetadataEntry>,
}

impl OrderRequest {
    /// Look up a metadata value by key.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

/// The paying customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Buyer {
    #[serde(rename = "name")]
    pub first_name: String,
    #[serde(rename = "surname")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "gsm_number", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "identity_number", skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "registration_address", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "zip_code", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub country: String,
}

/// One basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketItem {
    pub id: String,
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub quantity: u32,
    pub item_type: String,
    #[serde(rename = "category1", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Address the invoice is issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingAddress {
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "zip_code", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
}

/// Address the goods ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "zip_code", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// A `key → value` metadata pair attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result of a successful order creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    pub reference_id: ReferenceId,
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// Filters for the paged order listing. `None` filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListFilter {
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
}

impl Default for OrderListFilter {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            start_date: None,
            end_date: None,
            organization_id: None,
            related_reference_id: None,
            buyer_id: None,
        }
    }
}

/// Plain page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// Full or partial refund of an order. A `None` amount refunds everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundOrder {
    pub reference_id: ReferenceId,
    #[serde(
        with = "rust_decimal::serde::arbitrary_precision_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
}

/// Ask the gateway to re-send the callback for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualCallback {
    pub reference_id: ReferenceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

// =============================================================================
// Subscriptions
// =============================================================================

/// A recurring payment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
    pub title: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Billing period in days.
    pub period: u32,
    /// Day of the period on which the charge runs; at least 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<u32>,
    /// Number of periods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    pub success_url: String,
    pub failure_url: String,
    pub user: Subscriber,
}

/// Identity of the subscribing customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Result of a successful subscription creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedSubscription {
    pub reference_id: SubscriptionId,
    /// Order the first charge is collected through, when the gateway opens one.
    #[serde(default)]
    pub order_reference_id: Option<ReferenceId>,
}

// =============================================================================
// Terms
// =============================================================================

/// A new installment term on an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCreate {
    pub order_id: ReferenceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_reference_id: Option<TermReferenceId>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// A partial update of a term. Only `Some` fields are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermUpdate {
    pub term_reference_id: TermReferenceId,
    #[serde(
        with = "rust_decimal::serde::arbitrary_precision_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Refund of a paid term. A `None` amount refunds the full term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRefund {
    pub term_id: TermReferenceId,
    #[serde(
        with = "rust_decimal::serde::arbitrary_precision_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
}

/// Removal of a term from its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermDelete {
    pub order_id: ReferenceId,
    pub term_reference_id: TermReferenceId,
}
