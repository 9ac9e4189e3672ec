//! Webhook kinds.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which gateway callback delivered a webhook.
///
/// The kind is part of a stored record's identifier, so its string form must
/// stay stable and filename-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WebhookKind {
    /// Payment result callback (`/api/callback`).
    #[default]
    Callback,
    /// Failed payment callback.
    Fail,
    /// Refund notification.
    Refund,
    /// Cancellation notification.
    Cancel,
}

impl WebhookKind {
    /// All kinds, in route registration order.
    pub const ALL: [Self; 4] = [Self::Callback, Self::Fail, Self::Refund, Self::Cancel];

    /// Stable lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::Fail => "fail",
            Self::Refund => "refund",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown webhook kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown webhook kind: {0}")]
pub struct UnknownWebhookKind(pub String);

impl FromStr for WebhookKind {
    type Err = UnknownWebhookKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownWebhookKind(s.to_string()))
    }
}
