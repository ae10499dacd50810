//! Provider error types

use thiserror::Error;

/// Errors surfaced by bank adapters
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error status
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never completed (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Consent was created but grants access to no account - an unusable
    /// sandbox/consent combination, not worth retrying
    #[error("Consent grants access to no account")]
    NoAccessibleAccount,

    /// A field the contract requires was missing from the response
    #[error("Provider response missing field: {field}")]
    MissingField { field: String },

    /// The response body did not parse
    #[error("Invalid provider response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_carries_status_and_body() {
        let err = ProviderError::Http {
            status: 403,
            body: "consent invalid".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("consent invalid"));
    }
}
