//! BankBridge Types - Canonical domain types for open-banking account linking
//!
//! This crate contains all foundational types for BankBridge with zero
//! dependencies on other bankbridge crates. It defines the type system for:
//!
//! - Bank link records and their consent lifecycle
//! - Synchronized transaction views and sync results
//! - The shared error taxonomy (conflict / business rule / not found)
//!
//! # Consent lifecycle
//!
//! ```text
//! none → provisional (consent created) → valid (balance probe succeeded)
//!      → expired (validity window passed) | revoked (out-of-band signal)
//! ```
//!
//! A link is only ever persisted once it reaches `valid`; `provisional`
//! exists solely in-flight during linking.

pub mod error;
pub mod link;
pub mod transaction;

pub use error::*;
pub use link::*;
pub use transaction::*;

/// Version of the BankBridge types schema
pub const TYPES_VERSION: &str = "0.1.0";
