//! Paygate Core - Shared types library.
//!
//! This crate provides the types used across all Paygate components:
//! - `facade` - HTTP facade in front of the payment gateway
//! - `integration-tests` - Router-level tests against a mock gateway
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no filesystem access. This keeps the monetary arithmetic and the
//! identifier generators easy to test in isolation.
//!
//! # Modules
//!
//! - [`types`] - Decimal amounts, reference identifiers, webhook kinds
//! - [`error`] - Validation errors raised while normalizing client input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::*;
