//! Exact decimal arithmetic for basket amounts.
//!
//! Client payloads carry prices and quantities either as JSON numbers or as
//! numeric strings. Both are parsed into [`Decimal`] through their textual
//! form, so a price of `0.10` stays `0.10` and never passes through a binary
//! float.
//!
//! ```
//! use paygate_core::{NumericInput, compute_basket_total};
//! use rust_decimal::Decimal;
//!
//! let price = NumericInput::from("0.10");
//! let one = NumericInput::from(1_u32);
//! let total = compute_basket_total([(&price, &one), (&price, &one), (&price, &one)]).unwrap();
//! assert_eq!(total, Decimal::new(30, 2));
//! ```

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A number as it arrives in a loosely-typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// A JSON number literal.
    Number(serde_json::Number),
    /// A string expected to hold a number.
    Text(String),
}

impl NumericInput {
    /// The raw textual form, used for parsing and error messages.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u32> for NumericInput {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

/// Parse an amount of money.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidNumber`] if the input is not a decimal
/// number (plain or scientific notation).
pub fn parse_amount(field: &str, input: &NumericInput) -> Result<Decimal, ValidationError> {
    let raw = input.raw();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw,
        })
}

/// Parse a unit price, which must be zero or positive.
///
/// # Errors
///
/// Returns an error if the input is not numeric or is negative.
pub fn parse_price(field: &str, input: &NumericInput) -> Result<Decimal, ValidationError> {
    let price = parse_amount(field, input)?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::NegativeAmount(field.to_string()));
    }
    Ok(price)
}

/// Parse a line quantity, which must be a whole number of at least one.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidQuantity`] for zero, negative, fractional
/// or non-numeric input.
pub fn parse_quantity(field: &str, input: &NumericInput) -> Result<u32, ValidationError> {
    let parsed = match input {
        NumericInput::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        NumericInput::Text(s) => s.trim().parse::<u32>().ok(),
    };

    match parsed {
        Some(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(ValidationError::InvalidQuantity {
            field: field.to_string(),
            value: input.raw(),
        }),
    }
}

/// Total of one basket line (`unit_price × quantity`).
///
/// # Errors
///
/// Returns [`ValidationError::AmountOverflow`] if the product does not fit,
/// or [`ValidationError::PrecisionLoss`] if it only fits rounded.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, ValidationError> {
    let total = unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(ValidationError::AmountOverflow)?;
    exact(total, unit_price.scale(), "line total")
}

/// `Decimal` arithmetic rounds instead of failing once a result needs more
/// than 28 significant digits; the rounding shows up as a dropped scale.
fn exact(result: Decimal, scale: u32, what: &str) -> Result<Decimal, ValidationError> {
    if result.scale() < scale {
        return Err(ValidationError::PrecisionLoss(what.to_string()));
    }
    Ok(result)
}

/// Sum `price × quantity` over raw basket lines.
///
/// Lines are `(price, quantity)` pairs in cart order; error messages name the
/// offending line as `cart[i].price` / `cart[i].quantity`.
///
/// # Errors
///
/// Fails if any price or quantity cannot be parsed, a price is negative, a
/// quantity is below one, or the sum overflows. Totals are exact up to 28
/// significant digits; a basket whose total would need more is rejected with
/// [`ValidationError::PrecisionLoss`] rather than rounded.
pub fn compute_basket_total<'a, I>(lines: I) -> Result<Decimal, ValidationError>
where
    I: IntoIterator<Item = (&'a NumericInput, &'a NumericInput)>,
{
    lines
        .into_iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |total, (index, (price, quantity))| {
            let price = parse_price(&format!("cart[{index}].price"), price)?;
            let quantity = parse_quantity(&format!("cart[{index}].quantity"), quantity)?;
            let line = line_total(price, quantity)?;
            let sum = total
                .checked_add(line)
                .ok_or(ValidationError::AmountOverflow)?;
            exact(sum, total.scale().max(line.scale()), "basket total")
        })
}

/// ISO 4217 currency code (three ASCII letters, stored uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly three ASCII letters.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidField {
                field: "currency".to_string(),
                reason: format!("expected a three-letter ISO 4217 code, got {code:?}"),
            });
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Turkish lira, the default checkout currency.
    #[must_use]
    pub fn lira() -> Self {
        Self("TRY".to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn num(value: serde_json::Value) -> NumericInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_three_dimes_sum_exactly() {
        let price = num(serde_json::json!(0.10));
        let qty = num(serde_json::json!(1));
        let total = compute_basket_total([(&price, &qty), (&price, &qty), (&price, &qty)]).unwrap();
        assert_eq!(total, dec!(0.30));
    }

    #[test]
    fn test_total_multiplies_quantity() {
        let a = (num(serde_json::json!("19.99")), num(serde_json::json!(3)));
        let b = (num(serde_json::json!(0.01)), num(serde_json::json!("2")));
        let total = compute_basket_total([(&a.0, &a.1), (&b.0, &b.1)]).unwrap();
        assert_eq!(total, dec!(59.99));
    }

    #[test]
    fn test_many_small_prices_do_not_drift() {
        let price = num(serde_json::json!(0.1));
        let qty = num(serde_json::json!(1));
        let lines = vec![(&price, &qty); 1000];
        assert_eq!(compute_basket_total(lines).unwrap(), dec!(100.0));
    }

    #[test]
    fn test_total_beyond_28_digits_is_rejected_not_rounded() {
        let big = NumericInput::from("12345678901234567.89");
        let tiny = NumericInput::from("0.123456789012345678");
        let one = NumericInput::from(1_u32);
        let err = compute_basket_total([(&big, &one), (&tiny, &one)]).unwrap_err();
        assert_eq!(err, ValidationError::PrecisionLoss("basket total".to_string()));
    }

    #[test]
    fn test_total_at_full_precision_is_kept() {
        let big = NumericInput::from("12345678901234567.89");
        let small = NumericInput::from("0.0123456789");
        let one = NumericInput::from(1_u32);
        let total = compute_basket_total([(&big, &one), (&small, &one)]).unwrap();
        assert_eq!(total.to_string(), "12345678901234567.9023456789");
    }

    #[test]
    fn test_empty_lines_total_zero() {
        let lines: Vec<(&NumericInput, &NumericInput)> = Vec::new();
        assert_eq!(compute_basket_total(lines).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let price = NumericInput::from("twelve");
        let qty = NumericInput::from(1_u32);
        let err = compute_basket_total([(&price, &qty)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                field: "cart[0].price".to_string(),
                value: "twelve".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let price = NumericInput::from("5");
        let qty = NumericInput::from(0_u32);
        let err = compute_basket_total([(&price, &qty)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_fractional_quantity_is_rejected() {
        let qty = num(serde_json::json!(1.5));
        assert!(parse_quantity("q", &qty).is_err());
        assert!(parse_quantity("q", &NumericInput::from("2.5")).is_err());
        assert!(parse_quantity("q", &NumericInput::from("-1")).is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = parse_price("cart[0].price", &NumericInput::from("-0.01")).unwrap_err();
        assert_eq!(err, ValidationError::NegativeAmount("cart[0].price".to_string()));
        assert_eq!(parse_price("p", &NumericInput::from("0")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_trims_and_accepts_scientific() {
        assert_eq!(parse_amount("a", &NumericInput::from(" 12.50 ")).unwrap(), dec!(12.50));
        assert_eq!(parse_amount("a", &NumericInput::from("1e2")).unwrap(), dec!(100));
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::parse("try").unwrap().as_str(), "TRY");
        assert!(CurrencyCode::parse("TL").is_err());
        assert!(CurrencyCode::parse("US1").is_err());
        assert_eq!(CurrencyCode::parse("EUR").unwrap().to_string(), "EUR");
    }
}
