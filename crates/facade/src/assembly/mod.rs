//! Assemblers: loosely-typed client payloads in, validated gateway payloads out.
//!
//! Each assembler deserializes the client's JSON into an `*Input` struct of
//! optional fields, then validates it once into the strict gateway type. The
//! untyped form never reaches the gateway.

pub mod actions;
pub mod order;
pub mod origin;
pub mod subscription;
pub mod term;

use paygate_core::{NumericInput, ValidationError, parse_price};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

pub use actions::{
    ManualCallbackInput, OrderListQuery, PageQuery, ReferenceInput, RefundInput,
    SubscriptionCancelInput,
};
pub use order::{CheckoutInput, assemble_order, split_contact_name};
pub use origin::{RequestOrigin, ReturnUrls};
pub use subscription::{SubscriptionInput, assemble_subscription};
pub use term::{TermCreateInput, TermDeleteInput, TermRefundInput, TermUpdateInput};

/// Decode a JSON request body.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] for an empty body or one that does
/// not match `T`.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::Malformed("request body is empty".to_string()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed value of a field that must be present and non-blank.
pub(crate) fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    non_blank(value).ok_or_else(|| ValidationError::missing(field))
}

/// Amount that may be omitted; a blank string counts as omitted.
pub(crate) fn optional_amount(
    field: &str,
    value: Option<&NumericInput>,
) -> Result<Option<Decimal>, ValidationError> {
    match value {
        None => Ok(None),
        Some(NumericInput::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(input) => parse_price(field, input).map(Some),
    }
}
