//! Provider configuration

use serde::{Deserialize, Serialize};

/// Configuration for outbound bank provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider's PSD2 API
    pub base_url: String,
    /// TPP redirect URI sent on every call
    pub redirect_uri: String,
    /// PSU IP address forwarded to the provider
    pub psu_ip_address: String,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://developer.vpbank.com/psd2/berlin-group/v1".to_string(),
            redirect_uri: "https://www.google.ch".to_string(),
            psu_ip_address: "192.0.0.12".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables, falling back to the
    /// sandbox defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("BANK_PROVIDER_BASE_URL").unwrap_or(defaults.base_url),
            redirect_uri: std::env::var("BANK_TPP_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            psu_ip_address: std::env::var("BANK_PSU_IP_ADDRESS").unwrap_or(defaults.psu_ip_address),
            timeout_secs: std::env::var("BANK_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_sandbox() {
        let config = ProviderConfig::default();
        assert!(config.base_url.contains("berlin-group"));
        assert_eq!(config.timeout_secs, 30);
    }
}
