//! Transaction synchronizer - idempotent ingestion of the provider feed
//!
//! The provider has no cursor semantics, so every sync fetches the same
//! fixed 90-day window used at link time and lets the storage layer's
//! dedup tuple decide which records are new. Re-running over an unchanged
//! feed never grows the table.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use bankbridge_db::{BankLinkStore, NewTransaction, TransactionStore};
use bankbridge_provider::{ProviderRegistry, RawTransaction};
use bankbridge_types::{
    account_last4, BookingStatus, BridgeError, ConsentStatus, SyncResult, TransactionView,
};

use crate::convert::{provider_err, store_err};

/// Fixed fetch window in days, matching the consent validity window
const SYNC_WINDOW_DAYS: i64 = 90;

/// Synchronizes provider transactions into local storage
pub struct SyncService {
    links: Arc<dyn BankLinkStore>,
    transactions: Arc<dyn TransactionStore>,
    providers: Arc<ProviderRegistry>,
}

impl SyncService {
    pub fn new(
        links: Arc<dyn BankLinkStore>,
        transactions: Arc<dyn TransactionStore>,
        providers: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            links,
            transactions,
            providers,
        }
    }

    /// Fetch the provider feed and persist every record not already stored.
    ///
    /// Safe to re-run arbitrarily often: novelty is decided by the storage
    /// layer's dedup tuple, so an unchanged feed yields zero new rows.
    /// `last_synced_at` is advanced whether or not anything was new.
    pub async fn sync(&self, link_id: Uuid, owner_id: Uuid) -> Result<SyncResult, BridgeError> {
        let link = self
            .links
            .find_for_owner(link_id, owner_id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| BridgeError::not_found("bank link not found"))?;

        let status = link.status().map_err(store_err)?;
        if status != ConsentStatus::Valid {
            return Err(BridgeError::business_rule(format!("consent is {}", status)));
        }

        // Lazily-evaluated expiry: the window may have passed even if the
        // stored status was never flipped. Checked before any provider call.
        let now = Utc::now();
        if now >= link.consent_valid_until {
            return Err(BridgeError::business_rule("consent has expired"));
        }

        let kind = link.provider_kind().map_err(store_err)?;
        let provider = self.providers.get(kind).ok_or_else(|| {
            BridgeError::business_rule(format!("bank provider {} is not supported", kind))
        })?;

        let date_from = (now - Duration::days(SYNC_WINDOW_DAYS)).date_naive();
        let date_to = now.date_naive();
        let feed = provider
            .fetch_transactions(&link.iban, &link.consent_id, date_from, date_to)
            .await
            .map_err(provider_err)?;

        let synced_count = feed.total();
        let mut new_transactions = 0;
        for (bucket, booking_status) in [
            (&feed.booked, BookingStatus::Booked),
            (&feed.pending, BookingStatus::Pending),
        ] {
            for raw in bucket {
                let record = ingest_record(link.id, raw, booking_status, now);
                if self
                    .transactions
                    .insert_ignore_duplicate(&record)
                    .await
                    .map_err(store_err)?
                {
                    new_transactions += 1;
                } else {
                    debug!(link_id = %link.id, "skipped duplicate transaction");
                }
            }
        }

        self.links
            .record_sync_time(link.id, now)
            .await
            .map_err(store_err)?;

        info!(
            link_id = %link.id,
            synced_count,
            new_transactions,
            "transaction sync complete"
        );
        Ok(SyncResult {
            synced_count,
            new_transactions,
            last_synced_at: now,
        })
    }

    /// List stored transactions for an owned link, newest first, plus the
    /// total count
    pub async fn list_transactions(
        &self,
        link_id: Uuid,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TransactionView>, i64), BridgeError> {
        let link = self
            .links
            .find_for_owner(link_id, owner_id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| BridgeError::not_found("bank link not found"))?;

        let rows = self
            .transactions
            .list_by_link(link.id, limit, offset)
            .await
            .map_err(store_err)?;
        let total = self
            .transactions
            .count_by_link(link.id)
            .await
            .map_err(store_err)?;

        let mut views = Vec::with_capacity(rows.len());
        for row in &rows {
            views.push(row.to_view().map_err(store_err)?);
        }
        Ok((views, total))
    }
}

/// Parse a provider date: RFC 3339 datetimes or plain `YYYY-MM-DD` dates
/// (taken as midnight UTC)
fn parse_provider_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date: NaiveDate = raw.parse().ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Map a raw provider record into an insertable row.
///
/// A record missing its booking date takes the ingestion time instead of
/// being dropped: never lose data, at the cost of a weaker dedup key for
/// such records.
fn ingest_record(
    link_id: Uuid,
    raw: &RawTransaction,
    booking_status: BookingStatus,
    now: DateTime<Utc>,
) -> NewTransaction {
    let booking_date = raw
        .booking_date
        .as_deref()
        .and_then(parse_provider_date)
        .unwrap_or(now);
    let value_date = raw.value_date.as_deref().and_then(parse_provider_date);

    let (amount, currency) = match &raw.transaction_amount {
        Some(wire) => (
            wire.amount.parse::<Decimal>().unwrap_or(Decimal::ZERO),
            wire.currency.clone(),
        ),
        None => (Decimal::ZERO, "EUR".to_string()),
    };

    NewTransaction {
        bank_link_id: link_id,
        booking_date,
        value_date,
        amount,
        currency,
        creditor_name: raw.creditor_name.clone(),
        debtor_name: raw.debtor_name.clone(),
        creditor_account_last4: raw.creditor_iban().map(account_last4),
        debtor_account_last4: raw.debtor_iban().map(account_last4),
        booking_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankbridge_provider::wire::{WireAccount, WireAmount};

    fn raw(amount: &str, booking_date: Option<&str>) -> RawTransaction {
        RawTransaction {
            transaction_amount: Some(WireAmount {
                currency: "EUR".to_string(),
                amount: amount.to_string(),
            }),
            booking_date: booking_date.map(str::to_string),
            value_date: None,
            creditor_name: Some("Test Recipient GmbH".to_string()),
            debtor_name: None,
            creditor_account: Some(WireAccount {
                iban: Some("DE89370400440532013000".to_string()),
            }),
            debtor_account: Some(WireAccount {
                iban: Some("ABC".to_string()),
            }),
            remittance_information_unstructured: None,
        }
    }

    #[test]
    fn test_parse_plain_date_as_midnight_utc() {
        let dt = parse_provider_date("2026-08-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_datetime() {
        let dt = parse_provider_date("2026-08-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_provider_date("yesterday").is_none());
    }

    #[test]
    fn test_ingest_derives_last4_fragments() {
        let now = Utc::now();
        let record = ingest_record(Uuid::new_v4(), &raw("100.50", Some("2026-08-01")), BookingStatus::Booked, now);
        assert_eq!(record.creditor_account_last4.as_deref(), Some("3000"));
        assert_eq!(record.debtor_account_last4.as_deref(), Some("ABC"));
        assert_eq!(record.amount, Decimal::new(10050, 2));
        assert_eq!(record.booking_status, BookingStatus::Booked);
    }

    #[test]
    fn test_missing_booking_date_takes_ingestion_time() {
        let now = Utc::now();
        let record = ingest_record(Uuid::new_v4(), &raw("5.00", None), BookingStatus::Pending, now);
        assert_eq!(record.booking_date, now);
    }

    #[test]
    fn test_missing_amount_defaults_to_zero_eur() {
        let now = Utc::now();
        let mut tx = raw("1.00", Some("2026-08-01"));
        tx.transaction_amount = None;
        let record = ingest_record(Uuid::new_v4(), &tx, BookingStatus::Booked, now);
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.currency, "EUR");
    }
}
