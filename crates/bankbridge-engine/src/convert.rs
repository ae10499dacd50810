//! Error mapping at the engine boundary
//!
//! Provider transport failures and storage errors are re-wrapped into the
//! shared taxonomy here. No distinction is kept between "provider down"
//! and "provider rejected the request"; the underlying message rides along
//! for the caller's manual retry decision.

use bankbridge_db::DbError;
use bankbridge_provider::ProviderError;
use bankbridge_types::BridgeError;

/// Map a storage error into the taxonomy
pub(crate) fn store_err(e: DbError) -> BridgeError {
    match e {
        DbError::Duplicate(message) => BridgeError::conflict(message),
        DbError::NotFound(message) => BridgeError::not_found(message),
        other => BridgeError::business_rule(format!("storage error: {}", other)),
    }
}

/// Map a provider error into the taxonomy
pub(crate) fn provider_err(e: ProviderError) -> BridgeError {
    BridgeError::business_rule(format!("bank API error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = store_err(DbError::Duplicate("already linked".to_string()));
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_provider_error_maps_to_business_rule() {
        let err = provider_err(ProviderError::NoAccessibleAccount);
        assert_eq!(err.error_code(), "BUSINESS_RULE_VIOLATION");
        assert!(err.to_string().contains("no account"));
    }
}
