//! Reference identifiers and identifier generators.
//!
//! Use the `define_ref!` macro to create type-safe string wrappers that
//! prevent accidentally passing a term reference where an order reference is
//! expected.

use chrono::Utc;
use uuid::Uuid;

/// Prefix of system-generated conversation IDs.
pub const CONVERSATION_ID_PREFIX: &str = "CONV";

/// Length of a generated basket item ID.
pub const SHORT_ITEM_ID_LEN: usize = 8;

/// Macro to define a type-safe reference wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()`, `into_inner()`, `Display`, `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use paygate_core::define_ref;
/// define_ref!(OrderRef);
/// define_ref!(TermRef);
///
/// let order = OrderRef::new("ord-1");
/// assert_eq!(order.as_str(), "ord-1");
///
/// // These are different types, so this won't compile:
/// // let _: TermRef = order;
/// ```
#[macro_export]
macro_rules! define_ref {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a reference string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

// Gateway-side references
define_ref!(ReferenceId);
define_ref!(ConversationId);
define_ref!(TermReferenceId);
define_ref!(SubscriptionId);

impl ConversationId {
    /// Generate a conversation ID for a checkout the client did not tag.
    #[must_use]
    pub fn generate() -> Self {
        Self(new_correlation_id())
    }

    /// Use the client's ID when it is non-blank, otherwise generate one.
    #[must_use]
    pub fn from_client_or_generate(client: Option<&str>) -> Self {
        match client.map(str::trim) {
            Some(id) if !id.is_empty() => Self::new(id),
            _ => Self::generate(),
        }
    }
}

/// Generate a correlation ID: `CONV_<unix millis>_<8 random hex chars>`.
///
/// The millisecond timestamp keeps IDs roughly sortable in gateway dashboards;
/// the random suffix makes two IDs minted in the same millisecond distinct.
#[must_use]
pub fn new_correlation_id() -> String {
    format!(
        "{CONVERSATION_ID_PREFIX}_{}_{}",
        Utc::now().timestamp_millis(),
        new_short_item_id()
    )
}

/// Generate an 8-character basket item ID from a random UUID v4.
#[must_use]
pub fn new_short_item_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ITEM_ID_LEN);
    id
}
