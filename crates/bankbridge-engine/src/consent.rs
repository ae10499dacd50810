//! Consent manager - owns the per-account bank link record
//!
//! State machine per link:
//!
//! ```text
//! none → provisional (consent created, identifier discovered)
//!      → valid (balance probe succeeded, link persisted)
//!      → expired (validity window passed)
//! ```
//!
//! Nothing is persisted before the probe succeeds: a failed probe means the
//! caller re-links from scratch, there is no partial state to resume.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use bankbridge_db::{BankLinkStore, NewBankLink};
use bankbridge_provider::vpbank::CONSENT_VALIDITY_DAYS;
use bankbridge_provider::ProviderRegistry;
use bankbridge_types::{Balance, BankLinkSummary, BankProviderKind, BridgeError, ConsentStatus};

use crate::convert::{provider_err, store_err};

/// Manages bank link creation and the consent lifecycle
pub struct ConsentService {
    links: Arc<dyn BankLinkStore>,
    providers: Arc<ProviderRegistry>,
}

impl ConsentService {
    pub fn new(links: Arc<dyn BankLinkStore>, providers: Arc<ProviderRegistry>) -> Self {
        Self { links, providers }
    }

    /// Create a consent with the provider and persist the resulting link.
    ///
    /// Fails with a conflict when the owner already has a link or the
    /// consent is already linked elsewhere; fails with a business-rule
    /// error when the provider is unsupported, the identifier cannot be
    /// discovered, or the balance probe rejects it.
    pub async fn link_account(
        &self,
        owner_id: Uuid,
        kind: BankProviderKind,
    ) -> Result<BankLinkSummary, BridgeError> {
        if self
            .links
            .find_by_owner(owner_id)
            .await
            .map_err(store_err)?
            .is_some()
        {
            return Err(BridgeError::conflict(
                "user already has a bank account linked",
            ));
        }

        let provider = self.providers.get(kind).ok_or_else(|| {
            BridgeError::business_rule(format!("bank provider {} is not supported", kind))
        })?;

        let grant = provider.create_consent().await.map_err(provider_err)?;

        // Validation probe: consent creation alone does not guarantee read
        // access. A failed probe leaves nothing behind.
        if let Err(e) = provider
            .fetch_balance(&grant.iban, &grant.consent_id)
            .await
        {
            warn!(iban = %grant.iban, error = %e, "balance probe rejected discovered identifier");
            return Err(BridgeError::business_rule(format!(
                "account identifier {} is not accessible: {}",
                grant.iban, e
            )));
        }

        // Double-link race: another caller may have stored this consent
        // between creation and now.
        if self
            .links
            .find_by_consent_id(&grant.consent_id)
            .await
            .map_err(store_err)?
            .is_some()
        {
            return Err(BridgeError::conflict("this bank account is already linked"));
        }

        let link = self
            .links
            .create(&NewBankLink {
                owner_id,
                provider: kind,
                consent_id: grant.consent_id,
                iban: grant.iban,
                consent_valid_until: Utc::now() + Duration::days(CONSENT_VALIDITY_DAYS),
            })
            .await
            .map_err(store_err)?;

        info!(link_id = %link.id, owner_id = %owner_id, "bank account linked");
        link.to_summary().map_err(store_err)
    }

    /// Look up the bank link for an owner, if any
    pub async fn get_bank_link(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<BankLinkSummary>, BridgeError> {
        match self.links.find_by_owner(owner_id).await.map_err(store_err)? {
            Some(link) => Ok(Some(link.to_summary().map_err(store_err)?)),
            None => Ok(None),
        }
    }

    /// Fetch the live balance for an owned link
    pub async fn get_balance(
        &self,
        link_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Balance, BridgeError> {
        let link = self
            .links
            .find_for_owner(link_id, owner_id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| BridgeError::not_found("bank account not found"))?;

        let status = link.status().map_err(store_err)?;
        if status != ConsentStatus::Valid {
            return Err(BridgeError::business_rule(format!("consent is {}", status)));
        }

        let kind = link.provider_kind().map_err(store_err)?;
        let provider = self.providers.get(kind).ok_or_else(|| {
            BridgeError::business_rule(format!("bank provider {} is not supported", kind))
        })?;

        provider
            .fetch_balance(&link.iban, &link.consent_id)
            .await
            .map_err(provider_err)
    }

    /// Flip lapsed consents to `expired`. Externally triggered; there is
    /// no scheduler in this engine.
    pub async fn expire_lapsed(&self) -> Result<u64, BridgeError> {
        let flipped = self
            .links
            .expire_lapsed(Utc::now())
            .await
            .map_err(store_err)?;
        if flipped > 0 {
            info!(flipped, "expired lapsed consents");
        }
        Ok(flipped)
    }
}
