//! Berlin-Group wire types shared across adapters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of consent creation plus identifier discovery
#[derive(Debug, Clone)]
pub struct ConsentGrant {
    /// Provider-issued consent id, globally unique
    pub consent_id: String,
    /// The account identifier the consent actually grants access to
    pub iban: String,
    /// Exclusive upper bound of the consent's usability
    pub valid_until: DateTime<Utc>,
}

/// A monetary amount as the provider serializes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAmount {
    pub currency: String,
    pub amount: String,
}

/// Account reference on a transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAccount {
    pub iban: Option<String>,
}

/// A raw transaction record from the provider feed
///
/// The sandbox does not reliably populate a stable transaction id, so none
/// is modeled here; identity is derived downstream from the dedup tuple.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub transaction_amount: Option<WireAmount>,
    pub booking_date: Option<String>,
    pub value_date: Option<String>,
    pub creditor_name: Option<String>,
    pub debtor_name: Option<String>,
    pub creditor_account: Option<WireAccount>,
    pub debtor_account: Option<WireAccount>,
    pub remittance_information_unstructured: Option<String>,
}

impl RawTransaction {
    pub fn creditor_iban(&self) -> Option<&str> {
        self.creditor_account.as_ref()?.iban.as_deref()
    }

    pub fn debtor_iban(&self) -> Option<&str> {
        self.debtor_account.as_ref()?.iban.as_deref()
    }
}

/// Transaction feed split into booking-status buckets
///
/// One `bookingStatus=all` call captures both settled and still-open
/// movements.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransactionFeed {
    #[serde(default)]
    pub booked: Vec<RawTransaction>,
    #[serde(default)]
    pub pending: Vec<RawTransaction>,
}

impl TransactionFeed {
    pub fn total(&self) -> usize {
        self.booked.len() + self.pending.len()
    }
}

/// Format a date the way the provider expects query/body dates
pub fn wire_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_transaction_parses_berlin_group_record() {
        let json = r#"{
            "transactionAmount": {"currency": "EUR", "amount": "100.50"},
            "bookingDate": "2026-08-01",
            "valueDate": "2026-08-02",
            "creditorName": "Test Recipient GmbH",
            "creditorAccount": {"iban": "DE89370400440532013000"},
            "debtorAccount": {"iban": "DE99111111112222222233"},
            "remittanceInformationUnstructured": "Payment for services rendered"
        }"#;
        let tx: RawTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.transaction_amount.as_ref().unwrap().amount, "100.50");
        assert_eq!(tx.creditor_iban(), Some("DE89370400440532013000"));
        assert_eq!(tx.debtor_iban(), Some("DE99111111112222222233"));
        assert_eq!(tx.booking_date.as_deref(), Some("2026-08-01"));
    }

    #[test]
    fn test_feed_defaults_missing_buckets() {
        let feed: TransactionFeed = serde_json::from_str(r#"{"booked": []}"#).unwrap();
        assert!(feed.pending.is_empty());
        assert_eq!(feed.total(), 0);
    }

    #[test]
    fn test_wire_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(wire_date(date), "2026-08-30");
    }
}
