//! Core types for Paygate.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod webhook;

pub use id::*;
pub use money::*;
pub use webhook::{UnknownWebhookKind, WebhookKind};
