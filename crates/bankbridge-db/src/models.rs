//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use bankbridge_types::{
    BankLinkSummary, BankProviderKind, BookingStatus, ConsentStatus, TransactionView,
};

use crate::error::{DbError, DbResult};

// ============================================================================
// Bank Link Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbBankLink {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub provider: String,
    pub consent_id: String,
    pub iban: String,
    pub consent_valid_until: DateTime<Utc>,
    pub consent_status: String,
    pub is_active: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DbBankLink {
    pub fn provider_kind(&self) -> DbResult<BankProviderKind> {
        self.provider.parse().map_err(DbError::InvalidData)
    }

    pub fn status(&self) -> DbResult<ConsentStatus> {
        self.consent_status.parse().map_err(DbError::InvalidData)
    }

    pub fn to_summary(&self) -> DbResult<BankLinkSummary> {
        Ok(BankLinkSummary {
            id: self.id,
            owner_id: self.owner_id,
            provider: self.provider_kind()?,
            iban: self.iban.clone(),
            consent_valid_until: self.consent_valid_until,
            consent_status: self.status()?,
            last_synced_at: self.last_synced_at,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// Insert model for a freshly linked account
#[derive(Debug, Clone)]
pub struct NewBankLink {
    pub owner_id: Uuid,
    pub provider: BankProviderKind,
    pub consent_id: String,
    pub iban: String,
    pub consent_valid_until: DateTime<Utc>,
}

// ============================================================================
// Transaction Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTransaction {
    pub id: Uuid,
    pub bank_link_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub value_date: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub currency: String,
    pub creditor_name: Option<String>,
    pub debtor_name: Option<String>,
    pub creditor_account_last4: Option<String>,
    pub debtor_account_last4: Option<String>,
    pub booking_status: String,
    pub created_at: DateTime<Utc>,
}

impl DbTransaction {
    pub fn to_view(&self) -> DbResult<TransactionView> {
        let booking_status: BookingStatus =
            self.booking_status.parse().map_err(DbError::InvalidData)?;
        Ok(TransactionView {
            id: self.id,
            booking_date: self.booking_date,
            value_date: self.value_date,
            amount: self.amount,
            currency: self.currency.clone(),
            creditor_name: self.creditor_name.clone(),
            debtor_name: self.debtor_name.clone(),
            creditor_account_last4: self.creditor_account_last4.clone(),
            debtor_account_last4: self.debtor_account_last4.clone(),
            booking_status,
            created_at: self.created_at,
        })
    }
}

/// Insert model carrying the dedup tuple plus display fields
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub bank_link_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub value_date: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub currency: String,
    pub creditor_name: Option<String>,
    pub debtor_name: Option<String>,
    pub creditor_account_last4: Option<String>,
    pub debtor_account_last4: Option<String>,
    pub booking_status: BookingStatus,
}

impl NewTransaction {
    /// The composite identity tuple. Two records with equal tuples are the
    /// same transaction as far as this system can tell.
    pub fn dedup_key(&self) -> (Uuid, DateTime<Utc>, Decimal, Option<&str>, Option<&str>) {
        (
            self.bank_link_id,
            self.booking_date,
            self.amount,
            self.creditor_account_last4.as_deref(),
            self.debtor_account_last4.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_tx(link: Uuid) -> NewTransaction {
        NewTransaction {
            bank_link_id: link,
            booking_date: Utc::now(),
            value_date: None,
            amount: Decimal::new(10050, 2),
            currency: "EUR".to_string(),
            creditor_name: Some("Test Recipient GmbH".to_string()),
            debtor_name: None,
            creditor_account_last4: Some("3000".to_string()),
            debtor_account_last4: Some("2233".to_string()),
            booking_status: BookingStatus::Booked,
        }
    }

    #[test]
    fn test_dedup_key_ignores_display_fields() {
        let link = Uuid::new_v4();
        let a = sample_tx(link);
        let mut b = a.clone();
        b.creditor_name = Some("Renamed Counterparty".to_string());
        b.booking_status = BookingStatus::Pending;
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_distinguishes_amounts() {
        let link = Uuid::new_v4();
        let a = sample_tx(link);
        let mut b = a.clone();
        b.amount = Decimal::new(10051, 2);
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_link_summary_conversion_rejects_bad_status() {
        let link = DbBankLink {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            provider: "vpbank".to_string(),
            consent_id: "consent-1".to_string(),
            iban: "LI21088100002324013AA".to_string(),
            consent_valid_until: Utc::now(),
            consent_status: "garbage".to_string(),
            is_active: true,
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(link.to_summary().is_err());
    }
}
