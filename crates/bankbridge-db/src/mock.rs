//! In-memory store implementations for tests
//!
//! Enforces the same uniqueness rules as the PostgreSQL schema (owner and
//! consent uniqueness on links, the dedup tuple on transactions, with
//! missing counterparties comparing equal) so engine tests exercise the
//! real idempotence behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use bankbridge_types::ConsentStatus;

use crate::error::{DbError, DbResult};
use crate::models::{DbBankLink, DbTransaction, NewBankLink, NewTransaction};
use crate::store::{BankLinkStore, TransactionStore};

/// In-memory implementation of both store traits
#[derive(Default)]
pub struct MemoryStore {
    links: Mutex<Vec<DbBankLink>>,
    transactions: Mutex<Vec<DbTransaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored transaction count across all links (test assertions)
    pub async fn transaction_count(&self) -> usize {
        self.transactions.lock().await.len()
    }
}

#[async_trait]
impl BankLinkStore for MemoryStore {
    async fn create(&self, link: &NewBankLink) -> DbResult<DbBankLink> {
        let mut links = self.links.lock().await;
        if links.iter().any(|l| l.owner_id == link.owner_id) {
            return Err(DbError::Duplicate("owner already has a bank link".to_string()));
        }
        if links.iter().any(|l| l.consent_id == link.consent_id) {
            return Err(DbError::Duplicate("consent already linked".to_string()));
        }
        let row = DbBankLink {
            id: Uuid::new_v4(),
            owner_id: link.owner_id,
            provider: link.provider.as_str().to_string(),
            consent_id: link.consent_id.clone(),
            iban: link.iban.clone(),
            consent_valid_until: link.consent_valid_until,
            consent_status: ConsentStatus::Valid.as_str().to_string(),
            is_active: true,
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        links.push(row.clone());
        Ok(row)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DbResult<Option<DbBankLink>> {
        let links = self.links.lock().await;
        Ok(links.iter().find(|l| l.owner_id == owner_id).cloned())
    }

    async fn find_by_consent_id(&self, consent_id: &str) -> DbResult<Option<DbBankLink>> {
        let links = self.links.lock().await;
        Ok(links.iter().find(|l| l.consent_id == consent_id).cloned())
    }

    async fn find_for_owner(&self, link_id: Uuid, owner_id: Uuid) -> DbResult<Option<DbBankLink>> {
        let links = self.links.lock().await;
        Ok(links
            .iter()
            .find(|l| l.id == link_id && l.owner_id == owner_id)
            .cloned())
    }

    async fn record_sync_time(&self, link_id: Uuid, at: DateTime<Utc>) -> DbResult<()> {
        let mut links = self.links.lock().await;
        let link = links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| DbError::NotFound("bank link not found".to_string()))?;
        link.last_synced_at = Some(at);
        link.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn set_consent_status(&self, link_id: Uuid, status: ConsentStatus) -> DbResult<()> {
        let mut links = self.links.lock().await;
        let link = links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| DbError::NotFound("bank link not found".to_string()))?;
        link.consent_status = status.as_str().to_string();
        link.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let mut links = self.links.lock().await;
        let mut flipped = 0;
        for link in links.iter_mut() {
            if link.consent_status == ConsentStatus::Valid.as_str()
                && link.consent_valid_until <= now
            {
                link.consent_status = ConsentStatus::Expired.as_str().to_string();
                link.updated_at = Some(Utc::now());
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_ignore_duplicate(&self, tx: &NewTransaction) -> DbResult<bool> {
        let mut transactions = self.transactions.lock().await;
        let exists = transactions.iter().any(|stored| {
            stored.bank_link_id == tx.bank_link_id
                && stored.booking_date == tx.booking_date
                && stored.amount == tx.amount
                && stored.creditor_account_last4.as_deref() == tx.creditor_account_last4.as_deref()
                && stored.debtor_account_last4.as_deref() == tx.debtor_account_last4.as_deref()
        });
        if exists {
            return Ok(false);
        }
        transactions.push(DbTransaction {
            id: Uuid::new_v4(),
            bank_link_id: tx.bank_link_id,
            booking_date: tx.booking_date,
            value_date: tx.value_date,
            amount: tx.amount,
            currency: tx.currency.clone(),
            creditor_name: tx.creditor_name.clone(),
            debtor_name: tx.debtor_name.clone(),
            creditor_account_last4: tx.creditor_account_last4.clone(),
            debtor_account_last4: tx.debtor_account_last4.clone(),
            booking_status: tx.booking_status.as_str().to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_by_link(
        &self,
        link_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbTransaction>> {
        let transactions = self.transactions.lock().await;
        let mut rows: Vec<DbTransaction> = transactions
            .iter()
            .filter(|t| t.bank_link_id == link_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_link(&self, link_id: Uuid) -> DbResult<i64> {
        let transactions = self.transactions.lock().await;
        Ok(transactions.iter().filter(|t| t.bank_link_id == link_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankbridge_types::{BankProviderKind, BookingStatus};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn new_link(owner: Uuid, consent: &str) -> NewBankLink {
        new_link_valid_until(owner, consent, Utc::now() + Duration::days(90))
    }

    fn new_link_valid_until(owner: Uuid, consent: &str, until: DateTime<Utc>) -> NewBankLink {
        NewBankLink {
            owner_id: owner,
            provider: BankProviderKind::Vpbank,
            consent_id: consent.to_string(),
            iban: "LI21088100002324013AA".to_string(),
            consent_valid_until: until,
        }
    }

    #[tokio::test]
    async fn test_owner_uniqueness_enforced() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create(&new_link(owner, "c-1")).await.unwrap();
        let err = store.create(&new_link(owner, "c-2")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_consent_uniqueness_enforced() {
        let store = MemoryStore::new();
        store.create(&new_link(Uuid::new_v4(), "c-1")).await.unwrap();
        let err = store
            .create(&new_link(Uuid::new_v4(), "c-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_missing_counterparties_compare_equal() {
        let store = MemoryStore::new();
        let link = Uuid::new_v4();
        let tx = NewTransaction {
            bank_link_id: link,
            booking_date: Utc::now(),
            value_date: None,
            amount: Decimal::new(500, 2),
            currency: "EUR".to_string(),
            creditor_name: None,
            debtor_name: None,
            creditor_account_last4: None,
            debtor_account_last4: None,
            booking_status: BookingStatus::Booked,
        };
        assert!(store.insert_ignore_duplicate(&tx).await.unwrap());
        assert!(!store.insert_ignore_duplicate(&tx).await.unwrap());
        assert_eq!(store.count_by_link(link).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_lapsed_flips_only_lapsed_valid_links() {
        let store = MemoryStore::new();
        let lapsed = store
            .create(&new_link_valid_until(
                Uuid::new_v4(),
                "c-1",
                Utc::now() - Duration::days(1),
            ))
            .await
            .unwrap();
        let current = store.create(&new_link(Uuid::new_v4(), "c-2")).await.unwrap();

        let flipped = store.expire_lapsed(Utc::now()).await.unwrap();
        assert_eq!(flipped, 1);

        let stored = store.find_by_owner(lapsed.owner_id).await.unwrap().unwrap();
        assert_eq!(stored.consent_status, "expired");
        let stored = store.find_by_owner(current.owner_id).await.unwrap().unwrap();
        assert_eq!(stored.consent_status, "valid");

        // Already-expired links are not flipped again
        let flipped = store.expire_lapsed(Utc::now()).await.unwrap();
        assert_eq!(flipped, 0);
    }
}
