//! Error taxonomy for BankBridge operations
//!
//! Every failure surfaced by the engine falls into one of three buckets.
//! Provider transport failures are re-wrapped as business-rule violations
//! carrying the underlying message; no automatic retries happen anywhere,
//! the caller decides whether to retry.

use thiserror::Error;

/// Result type for BankBridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// BankBridge error taxonomy
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Duplicate link or duplicate consent
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Unsupported provider, invalid/expired consent, or a provider-side
    /// failure translated from a transport error
    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    /// Unknown or non-owned bank link
    #[error("Not found: {message}")]
    NotFound { message: String },
}

impl BridgeError {
    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a business rule error
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "CONFLICT",
            Self::BusinessRule { .. } => "BUSINESS_RULE_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = BridgeError::conflict("user already has a bank account linked");
        assert_eq!(err.error_code(), "CONFLICT");

        let err = BridgeError::business_rule("consent is expired");
        assert_eq!(err.error_code(), "BUSINESS_RULE_VIOLATION");

        let err = BridgeError::not_found("bank link not found");
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_display_carries_message() {
        let err = BridgeError::business_rule("bank API error: 503");
        assert!(err.to_string().contains("bank API error: 503"));
    }
}
