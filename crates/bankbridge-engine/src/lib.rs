//! BankBridge Engine - consent management and transaction synchronization
//!
//! The engine exposes the four public operations of the system:
//!
//! - [`ConsentService::link_account`] - negotiate a consent, discover the
//!   usable account identifier, validate it with a balance probe, persist
//!   the link
//! - [`ConsentService::get_bank_link`] - look up the caller's link
//! - [`SyncService::sync`] - idempotent ingestion of the provider feed
//! - [`SyncService::list_transactions`] - paginated stored transactions
//!
//! All operations are single-flow request/response: one call is one
//! sequential chain of provider calls followed by a batch write. There is
//! no background scheduler; synchronization and consent-expiry sweeps are
//! externally triggered. Callers are assumed to serialize calls per link;
//! the storage-layer uniqueness constraints are the correctness backstop
//! if they do not.

pub mod consent;
pub mod sync;

mod convert;

pub use consent::ConsentService;
pub use sync::SyncService;

pub use bankbridge_types::{
    account_last4, Balance, BankLinkSummary, BankProviderKind, BookingStatus, BridgeError,
    ConsentStatus, SyncResult, TransactionView,
};
