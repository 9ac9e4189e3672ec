//! Subscription assembly.

use paygate_core::{NumericInput, ValidationError, parse_price, parse_quantity};
use serde::Deserialize;

use super::order::PLACEHOLDER_LAST_NAME;
use super::{ReturnUrls, non_blank, split_contact_name};
use crate::config::CheckoutDefaults;
use crate::gateway::{Subscriber, SubscriptionRequest};

/// Subscriber name used when the client sends none.
pub const PLACEHOLDER_FIRST_NAME: &str = "Subscriber";
/// Title used when the client sends none.
pub const DEFAULT_TITLE: &str = "Subscription";

/// Subscription payload as sent by the front end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionInput {
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub amount: Option<NumericInput>,
    pub period: Option<NumericInput>,
    pub payment_date: Option<NumericInput>,
    pub cycle: Option<NumericInput>,
    pub card_id: Option<String>,
    pub subscriber_name: Option<String>,
    pub subscriber_email: Option<String>,
    pub subscriber_phone: Option<String>,
}

/// Day-of-period for the charge, clamped to at least 1.
fn clamp_payment_date(input: &NumericInput) -> Result<u32, ValidationError> {
    let raw = input.raw();
    let day = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "payment_date".to_string(),
            value: raw.clone(),
        })?;
    Ok(u32::try_from(day.max(1)).unwrap_or(u32::MAX))
}

/// Validate a subscription payload and build the gateway request.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `amount` is missing, non-numeric or not
/// positive, `period` is missing or not a positive integer, or an optional
/// numeric field is present but malformed.
pub fn assemble_subscription(
    input: SubscriptionInput,
    urls: &ReturnUrls,
    defaults: &CheckoutDefaults,
) -> Result<SubscriptionRequest, ValidationError> {
    let amount = input
        .amount
        .as_ref()
        .ok_or_else(|| ValidationError::missing("amount"))?;
    let amount = parse_price("amount", amount)?;
    if amount.is_zero() {
        return Err(ValidationError::InvalidField {
            field: "amount".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let period = input
        .period
        .as_ref()
        .ok_or_else(|| ValidationError::missing("period"))?;
    let period = parse_quantity("period", period)?;

    let payment_date = input.payment_date.as_ref().map(clamp_payment_date).transpose()?;
    let cycle = input
        .cycle
        .as_ref()
        .map(|cycle| parse_quantity("cycle", cycle))
        .transpose()?;

    let (first_name, last_name) = non_blank(input.subscriber_name).map_or_else(
        || {
            (
                PLACEHOLDER_FIRST_NAME.to_string(),
                PLACEHOLDER_LAST_NAME.to_string(),
            )
        },
        |name| split_contact_name(&name),
    );

    Ok(SubscriptionRequest {
        title: non_blank(input.name).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        amount,
        currency: defaults.currency.clone(),
        period,
        payment_date,
        cycle,
        card_id: non_blank(input.card_id),
        success_url: urls.success_url.clone(),
        failure_url: urls.failure_url.clone(),
        user: Subscriber {
            first_name,
            last_name,
            email: non_blank(input.subscriber_email),
            phone: non_blank(input.subscriber_phone),
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::assembly::RequestOrigin;

    fn assemble(value: serde_json::Value) -> Result<SubscriptionRequest, ValidationError> {
        let input: SubscriptionInput = serde_json::from_value(value).unwrap();
        assemble_subscription(
            input,
            &RequestOrigin::new("https://shop.example.com").return_urls(),
            &CheckoutDefaults::default(),
        )
    }

    #[test]
    fn test_minimal_subscription() {
        let sub = assemble(json!({ "amount": "99.90", "period": 30 })).unwrap();
        assert_eq!(sub.amount, dec!(99.90));
        assert_eq!(sub.period, 30);
        assert_eq!(sub.currency.as_str(), "TRY");
        assert_eq!(sub.title, DEFAULT_TITLE);
        assert_eq!(sub.user.first_name, PLACEHOLDER_FIRST_NAME);
        assert_eq!(sub.user.last_name, "User");
        assert_eq!(sub.success_url, "https://shop.example.com/payment/success");
        assert_eq!(sub.failure_url, "https://shop.example.com/payment/failure");
        assert!(sub.payment_date.is_none());
        assert!(sub.cycle.is_none());
    }

    #[test]
    fn test_full_subscription() {
        let sub = assemble(json!({
            "name": "Coffee club",
            "amount": 120,
            "period": "30",
            "payment_date": 5,
            "cycle": 12,
            "card_id": "card-1",
            "subscriber_name": "Grace Hopper",
            "subscriber_email": "grace@example.com",
            "subscriber_phone": "+905550000000"
        }))
        .unwrap();
        assert_eq!(sub.title, "Coffee club");
        assert_eq!(sub.payment_date, Some(5));
        assert_eq!(sub.cycle, Some(12));
        assert_eq!(sub.card_id.as_deref(), Some("card-1"));
        assert_eq!(sub.user.first_name, "Grace");
        assert_eq!(sub.user.last_name, "Hopper");
        assert_eq!(sub.user.email.as_deref(), Some("grace@example.com"));
    }

    #[test]
    fn test_payment_date_clamped() {
        let sub = assemble(json!({ "amount": 10, "period": 30, "payment_date": 0 })).unwrap();
        assert_eq!(sub.payment_date, Some(1));
        let sub = assemble(json!({ "amount": 10, "period": 30, "payment_date": -4 })).unwrap();
        assert_eq!(sub.payment_date, Some(1));
    }

    #[test]
    fn test_amount_and_period_required() {
        assert_eq!(
            assemble(json!({ "period": 30 })).unwrap_err(),
            ValidationError::missing("amount")
        );
        assert_eq!(
            assemble(json!({ "amount": 10 })).unwrap_err(),
            ValidationError::missing("period")
        );
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(assemble(json!({ "amount": "ten", "period": 30 })).is_err());
        assert!(assemble(json!({ "amount": 0, "period": 30 })).is_err());
        assert!(assemble(json!({ "amount": 10, "period": 0 })).is_err());
        assert!(assemble(json!({ "amount": 10, "period": 30, "payment_date": "soon" })).is_err());
    }
}
