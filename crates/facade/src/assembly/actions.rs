//! Inputs for order and subscription passthrough calls.

use paygate_core::{
    ConversationId, NumericInput, ReferenceId, SubscriptionId, ValidationError, parse_quantity,
};
use serde::Deserialize;

use super::{non_blank, optional_amount, required};
use crate::gateway::{ManualCallback, OrderListFilter, Page, RefundOrder};

/// Body of terminate and cancel calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceInput {
    pub reference_id: Option<String>,
}

impl ReferenceInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if `reference_id` is blank.
    pub fn assemble(self) -> Result<ReferenceId, ValidationError> {
        required("reference_id", self.reference_id).map(ReferenceId::new)
    }
}

/// `POST /api/order/refund` payload. A blank amount refunds the whole order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundInput {
    pub reference_id: Option<String>,
    pub amount: Option<NumericInput>,
}

impl RefundInput {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `reference_id` is blank or `amount`
    /// is malformed or negative.
    pub fn assemble(self) -> Result<RefundOrder, ValidationError> {
        Ok(RefundOrder {
            reference_id: ReferenceId::new(required("reference_id", self.reference_id)?),
            amount: optional_amount("amount", self.amount.as_ref())?,
        })
    }
}

/// `POST /api/order/manual-callback` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualCallbackInput {
    pub reference_id: Option<String>,
    pub conversation_id: Option<String>,
}

impl ManualCallbackInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if `reference_id` is blank.
    pub fn assemble(self) -> Result<ManualCallback, ValidationError> {
        Ok(ManualCallback {
            reference_id: ReferenceId::new(required("reference_id", self.reference_id)?),
            conversation_id: non_blank(self.conversation_id).map(ConversationId::new),
        })
    }
}

/// `POST /api/subscription/cancel` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionCancelInput {
    #[serde(alias = "reference_id")]
    pub subscription_id: Option<String>,
}

impl SubscriptionCancelInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if `subscription_id` is blank.
    pub fn assemble(self) -> Result<SubscriptionId, ValidationError> {
        required("subscription_id", self.subscription_id).map(SubscriptionId::new)
    }
}

fn page_number(field: &str, value: Option<String>, default: u32) -> Result<u32, ValidationError> {
    non_blank(value).map_or(Ok(default), |raw| {
        parse_quantity(field, &NumericInput::Text(raw))
    })
}

/// Query string of paged listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a page number is not a positive integer.
    pub fn assemble(self) -> Result<Page, ValidationError> {
        let defaults = Page::default();
        Ok(Page {
            page: page_number("page", self.page, defaults.page)?,
            per_page: page_number("per_page", self.per_page, defaults.per_page)?,
        })
    }
}

/// Query string of `GET /api/order/list`. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub organization_id: Option<String>,
    pub related_reference_id: Option<String>,
    pub buyer_id: Option<String>,
}

impl OrderListQuery {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a page number is not a positive integer.
    pub fn assemble(self) -> Result<OrderListFilter, ValidationError> {
        let defaults = OrderListFilter::default();
        Ok(OrderListFilter {
            page: page_number("page", self.page, defaults.page)?,
            per_page: page_number("per_page", self.per_page, defaults.per_page)?,
            start_date: non_blank(self.start_date),
            end_date: non_blank(self.end_date),
            organization_id: non_blank(self.organization_id),
            related_reference_id: non_blank(self.related_reference_id),
            buyer_id: non_blank(self.buyer_id),
        })
    }
}
