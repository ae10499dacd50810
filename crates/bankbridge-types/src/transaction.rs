//! Synchronized transaction types
//!
//! The sandbox exposes no stable globally-unique transaction identifier, so
//! identity is inferred from the dedup tuple
//! `(bank_link_id, booking_date, amount, creditor_last4, debtor_last4)`.
//! Rows are append-only once stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Whether a transaction has settled or is still pending clearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Pending,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(Self::Booked),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// A stored transaction as exposed upward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub value_date: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub currency: String,
    pub creditor_name: Option<String>,
    pub debtor_name: Option<String>,
    pub creditor_account_last4: Option<String>,
    pub debtor_account_last4: Option<String>,
    pub booking_status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one synchronization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// Records seen in the provider feed this call (booked + pending)
    pub synced_count: usize,
    /// Records that were genuinely new to the store
    pub new_transactions: usize,
    pub last_synced_at: DateTime<Utc>,
}

/// A point-in-time account balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: Decimal,
    pub currency: String,
}

/// Derive the last-4 fragment of an account identifier.
///
/// Returns the trailing 4 characters, or the whole identifier when it is
/// shorter than 4 characters (no padding).
pub fn account_last4(iban: &str) -> String {
    let chars: Vec<char> = iban.chars().collect();
    if chars.len() <= 4 {
        iban.to_string()
    } else {
        chars[chars.len() - 4..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last4_of_full_iban() {
        assert_eq!(account_last4("DE89370400440532013000"), "3000");
    }

    #[test]
    fn test_last4_of_short_identifier() {
        assert_eq!(account_last4("ABC"), "ABC");
        assert_eq!(account_last4("ABCD"), "ABCD");
        assert_eq!(account_last4(""), "");
    }

    #[test]
    fn test_booking_status_round_trip() {
        assert_eq!("booked".parse::<BookingStatus>().unwrap(), BookingStatus::Booked);
        assert_eq!("pending".parse::<BookingStatus>().unwrap(), BookingStatus::Pending);
        assert!("settled".parse::<BookingStatus>().is_err());
    }
}
