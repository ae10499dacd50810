//! Bank link types - the per-owner record of a provider consent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Supported bank providers
///
/// Currently single-valued. Adding a provider means adding a variant here
/// and registering an adapter for it; the consent manager and synchronizer
/// are provider-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankProviderKind {
    Vpbank,
}

impl BankProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpbank => "vpbank",
        }
    }
}

impl fmt::Display for BankProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BankProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vpbank" => Ok(Self::Vpbank),
            other => Err(format!("unknown bank provider: {}", other)),
        }
    }
}

/// Consent lifecycle status of a persisted bank link
///
/// `expired` and `revoked` are terminal. A revocation signal is not modeled
/// by the sandbox; the variant exists so the storage layer can represent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Valid,
    Expired,
    Revoked,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "expired" => Ok(Self::Expired),
            "revoked" => Ok(Self::Revoked),
            other => Err(format!("unknown consent status: {}", other)),
        }
    }
}

/// Bank link as exposed upward
///
/// The provider-issued consent id stays internal; callers only see the
/// validity window and status derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankLinkSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub provider: BankProviderKind,
    pub iban: String,
    pub consent_valid_until: DateTime<Utc>,
    pub consent_status: ConsentStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip() {
        let kind: BankProviderKind = "vpbank".parse().unwrap();
        assert_eq!(kind, BankProviderKind::Vpbank);
        assert_eq!(kind.as_str(), "vpbank");
        assert!("monzo".parse::<BankProviderKind>().is_err());
    }

    #[test]
    fn test_consent_status_round_trip() {
        for status in [
            ConsentStatus::Valid,
            ConsentStatus::Expired,
            ConsentStatus::Revoked,
        ] {
            let parsed: ConsentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("pending".parse::<ConsentStatus>().is_err());
    }
}
