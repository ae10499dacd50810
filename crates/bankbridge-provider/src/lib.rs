//! BankBridge Provider - bank adapters behind a capability trait
//!
//! One adapter per bank provider. The adapter owns the actual network calls
//! (consent creation, balance, transaction listing, payment initiation,
//! sandbox cleanup/mock-deposit); everything above it works against the
//! [`BankProvider`] trait and the [`ProviderRegistry`] keyed by
//! [`BankProviderKind`].
//!
//! # Invariants
//!
//! 1. Every outbound call carries a fresh `X-Request-ID` correlation id
//! 2. Headers are built per call, never mutated across calls
//! 3. Sandbox-only endpoints are never sent a `Consent-ID` header
//! 4. HTTP error statuses are data (`ApiOutcome`), not exceptions

pub mod config;
pub mod error;
pub mod request_id;
pub mod vpbank;
pub mod wire;

pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderResult};
pub use vpbank::VpBank;
pub use wire::{ConsentGrant, RawTransaction, TransactionFeed};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use bankbridge_types::{Balance, BankProviderKind};

/// Capability set every bank adapter must implement
///
/// The first five operations are the production surface; the sandbox
/// affordances target non-standard, provider-undocumented endpoints and
/// must treat a 404 as "endpoint absent" rather than a hard failure.
#[async_trait]
pub trait BankProvider: Send + Sync {
    /// Create a recurring data-access consent, then look up its status to
    /// discover which account identifier the consent actually grants
    /// access to. Fails with [`ProviderError::NoAccessibleAccount`] when the
    /// consent's access list names no account (fatal, non-retryable).
    async fn create_consent(&self) -> ProviderResult<ConsentGrant>;

    /// Fetch the current balance.
    ///
    /// Also used as the validation probe at link time: consent creation
    /// alone does not guarantee read access, a successful balance fetch is
    /// the only confirmation that the discovered identifier is usable.
    async fn fetch_balance(&self, iban: &str, consent_id: &str) -> ProviderResult<Balance>;

    /// Fetch the transaction feed for a date window, split into booked and
    /// pending buckets (`bookingStatus=all`).
    async fn fetch_transactions(
        &self,
        iban: &str,
        consent_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> ProviderResult<TransactionFeed>;

    /// Count booked + pending transactions over a date window.
    async fn transaction_count(
        &self,
        iban: &str,
        consent_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> ProviderResult<usize>;

    /// Initiate a SEPA credit transfer. Single-shot: no saga semantics, no
    /// retry, no compensation if the response is lost. Returns the
    /// provider-issued payment id.
    async fn initiate_payment(
        &self,
        debtor_iban: &str,
        amount: Decimal,
        creditor_iban: &str,
        creditor_bic: &str,
    ) -> ProviderResult<String>;

    /// Query the status of a previously initiated payment.
    async fn check_payment_status(&self, payment_id: &str) -> ProviderResult<String>;

    /// Sandbox-only: delete all transactions on the account. Returns false
    /// when the sandbox does not expose the cleanup endpoint (404).
    async fn delete_all_transactions(&self, iban: &str) -> ProviderResult<bool>;

    /// Sandbox-only: create a mock incoming credit on the account. Returns
    /// false when the sandbox does not expose the deposit endpoint (404).
    async fn create_mock_deposit(&self, iban: &str, amount: Decimal) -> ProviderResult<bool>;
}

/// Adapter registry keyed by provider kind
///
/// Adding a bank means registering another adapter here; the consent
/// manager and synchronizer stay unchanged.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<BankProviderKind, Arc<dyn BankProvider>>,
}

impl ProviderRegistry {
    /// Build the default registry from configuration
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let mut registry = Self::empty();
        registry.register(BankProviderKind::Vpbank, Arc::new(VpBank::new(config)?));
        Ok(registry)
    }

    /// An empty registry (test injection)
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register an adapter for a provider kind
    pub fn register(&mut self, kind: BankProviderKind, provider: Arc<dyn BankProvider>) {
        self.providers.insert(kind, provider);
    }

    /// Look up the adapter for a provider kind
    pub fn get(&self, kind: BankProviderKind) -> Option<Arc<dyn BankProvider>> {
        self.providers.get(&kind).cloned()
    }
}
