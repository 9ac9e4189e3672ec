//! Validation errors for client-supplied payloads.

use thiserror::Error;

/// An input field was missing, malformed, or out of range.
///
/// Raised at the assembler boundary, before any gateway call is made. The
/// `Display` text is safe to show to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(String),

    /// A field that must hold a number could not be parsed as one.
    #[error("{field} must be numeric (got {value:?})")]
    InvalidNumber {
        /// Dotted path of the offending field.
        field: String,
        /// The raw value as received.
        value: String,
    },

    /// A quantity was zero, negative, or fractional.
    #[error("{field} must be a positive integer (got {value:?})")]
    InvalidQuantity {
        /// Dotted path of the offending field.
        field: String,
        /// The raw value as received.
        value: String,
    },

    /// A monetary amount was below zero.
    #[error("{0} must not be negative")]
    NegativeAmount(String),

    /// The cart contained no items.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// The basket total does not fit into a decimal.
    #[error("basket total is too large")]
    AmountOverflow,

    /// An amount needs more significant digits than a decimal holds (28),
    /// so it could only be represented rounded.
    #[error("{0} has too many significant digits")]
    PrecisionLoss(String),

    /// A field was present but its value is not acceptable.
    #[error("{field} is invalid: {reason}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: String,
        /// Human readable reason.
        reason: String,
    },

    /// The payload could not be decoded into the expected shape.
    #[error("invalid request payload: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`].
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_missing_field() {
        let err = ValidationError::missing("billing.contact_name");
        assert_eq!(err.to_string(), "billing.contact_name is required");
    }

    #[test]
    fn test_display_invalid_number() {
        let err = ValidationError::InvalidNumber {
            field: "cart[0].price".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "cart[0].price must be numeric (got \"abc\")");
    }

    #[test]
    fn test_from_serde_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ValidationError::from(parse_err);
        assert!(matches!(err, ValidationError::Malformed(_)));
    }
}
