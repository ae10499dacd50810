//! Store traits - the persistence seam the engine works against
//!
//! The engine never touches sqlx directly; it consumes these traits. The
//! PostgreSQL repositories implement them for production, and the `mock`
//! feature provides an in-memory implementation for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bankbridge_types::ConsentStatus;

use crate::error::DbResult;
use crate::models::{DbBankLink, DbTransaction, NewBankLink, NewTransaction};

/// Persistence for bank link records
#[async_trait]
pub trait BankLinkStore: Send + Sync {
    /// Persist a new link. The owner and consent uniqueness constraints
    /// are enforced here; a violation surfaces as `DbError::Duplicate`.
    async fn create(&self, link: &NewBankLink) -> DbResult<DbBankLink>;

    async fn find_by_owner(&self, owner_id: Uuid) -> DbResult<Option<DbBankLink>>;

    async fn find_by_consent_id(&self, consent_id: &str) -> DbResult<Option<DbBankLink>>;

    /// Load a link only if it belongs to the given owner. The ownership
    /// check doubles as the existence check so cross-tenant existence is
    /// never leaked.
    async fn find_for_owner(&self, link_id: Uuid, owner_id: Uuid) -> DbResult<Option<DbBankLink>>;

    async fn record_sync_time(&self, link_id: Uuid, at: DateTime<Utc>) -> DbResult<()>;

    async fn set_consent_status(&self, link_id: Uuid, status: ConsentStatus) -> DbResult<()>;

    /// Flip every `valid` link whose validity window has passed to
    /// `expired`. Returns the number of links flipped.
    async fn expire_lapsed(&self, now: DateTime<Utc>) -> DbResult<u64>;
}

/// Persistence for synchronized transactions
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a transaction unless its dedup tuple is already stored.
    /// Returns true when a row was actually written. Uniqueness is decided
    /// by the store, not the caller, so concurrent syncs cannot duplicate.
    async fn insert_ignore_duplicate(&self, tx: &NewTransaction) -> DbResult<bool>;

    async fn list_by_link(
        &self,
        link_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbTransaction>>;

    async fn count_by_link(&self, link_id: Uuid) -> DbResult<i64>;
}
