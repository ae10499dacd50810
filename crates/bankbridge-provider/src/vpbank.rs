//! VPBank adapter - Berlin Group PSD2 sandbox integration
//!
//! The sandbox is non-standard in places: the cleanup and mock-deposit
//! endpoints are educated guesses at common sandbox patterns, and the
//! provider rejects those calls when a `Consent-ID` header is present.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bankbridge_types::Balance;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::request_id::{
    correlation_id, DIGIT_BALANCE, DIGIT_CONSENT_CREATE, DIGIT_PAYMENT_MOCK_SUCCESS,
    DIGIT_SANDBOX_DELETE, DIGIT_SANDBOX_DEPOSIT, DIGIT_STATUS_LOOKUP, DIGIT_TRANSACTIONS,
};
use crate::wire::{wire_date, ConsentGrant, TransactionFeed, WireAccount, WireAmount};
use crate::BankProvider;

/// Static sandbox recipient for payment initiation
pub const CREDITOR_ACCOUNT_IBAN: &str = "DE89370400440532013000";
/// Static sandbox recipient BIC
pub const CREDITOR_BIC: &str = "COBADEFF";
/// BIC of the debtor institution in the sandbox
pub const DEBTOR_BIC: &str = "VPBPLI22";

/// Provider-fixed consent validity window in days
pub const CONSENT_VALIDITY_DAYS: i64 = 90;

/// Typed carrier for a completed HTTP exchange
///
/// Error statuses are data here so callers branch on them explicitly; the
/// 404-as-"endpoint absent" case on sandbox calls is a branch, not a caught
/// exception.
struct ApiOutcome {
    status: StatusCode,
    body: String,
}

impl ApiOutcome {
    fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn json<T: DeserializeOwned>(&self) -> ProviderResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    fn into_http_error(self) -> ProviderError {
        ProviderError::Http {
            status: self.status.as_u16(),
            body: self.body,
        }
    }
}

/// Concrete adapter for the VPBank Berlin Group API
pub struct VpBank {
    http: Client,
    config: ProviderConfig,
}

impl VpBank {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Build the header set for one call. Constructed fresh every time;
    /// `Consent-ID` is attached only when the endpoint requires it.
    fn headers(&self, request_id: &str, consent_id: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert("X-Request-ID", value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.config.redirect_uri) {
            headers.insert("TPP-Redirect-URI", value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.config.psu_ip_address) {
            headers.insert("PSU-IP-Address", value);
        }
        if let Some(consent_id) = consent_id {
            if let Ok(value) = HeaderValue::from_str(consent_id) {
                headers.insert("Consent-ID", value);
            }
        }
        headers
    }

    async fn send(&self, request: RequestBuilder) -> ProviderResult<ApiOutcome> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "provider responded");
        Ok(ApiOutcome { status, body })
    }
}

#[async_trait]
impl BankProvider for VpBank {
    async fn create_consent(&self) -> ProviderResult<ConsentGrant> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ConsentRequest {
            access: Vec<&'static str>,
            recurring_indicator: bool,
            valid_until: String,
            frequency_per_day: u32,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ConsentCreated {
            consent_id: Option<String>,
        }

        let valid_until = Utc::now() + Duration::days(CONSENT_VALIDITY_DAYS);
        let payload = ConsentRequest {
            access: vec!["accounts", "balances", "transactions", "confirmationOfFunds"],
            recurring_indicator: true,
            valid_until: wire_date(valid_until.date_naive()),
            frequency_per_day: 4,
        };

        info!("creating consent");
        let outcome = self
            .send(
                self.http
                    .post(self.url("/consents"))
                    .headers(self.headers(&correlation_id(DIGIT_CONSENT_CREATE), None))
                    .json(&payload),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let created: ConsentCreated = outcome.json()?;
        let consent_id = created.consent_id.ok_or(ProviderError::MissingField {
            field: "consentId".to_string(),
        })?;

        // The consent status response lists which accounts the consent
        // actually covers; that list is the only way to discover a usable
        // identifier in this sandbox.
        #[derive(Deserialize, Default)]
        struct ConsentAccess {
            #[serde(default)]
            transactions: Vec<String>,
        }

        #[derive(Deserialize)]
        struct ConsentStatus {
            #[serde(default)]
            access: Option<ConsentAccess>,
        }

        info!(consent_id = %consent_id, "discovering account identifier via consent status");
        let outcome = self
            .send(
                self.http
                    .get(self.url(&format!("/consents/{}", consent_id)))
                    .headers(self.headers(&correlation_id(DIGIT_STATUS_LOOKUP), Some(&consent_id))),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let status: ConsentStatus = outcome.json()?;
        let iban = status
            .access
            .unwrap_or_default()
            .transactions
            .into_iter()
            .next()
            .ok_or(ProviderError::NoAccessibleAccount)?;

        info!(iban = %iban, "consent created and identifier discovered");
        Ok(ConsentGrant {
            consent_id,
            iban,
            valid_until,
        })
    }

    async fn fetch_balance(&self, iban: &str, consent_id: &str) -> ProviderResult<Balance> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct BalanceEntry {
            balance_amount: Option<WireAmount>,
        }

        #[derive(Deserialize)]
        struct Balances {
            #[serde(default)]
            balances: Vec<BalanceEntry>,
        }

        let outcome = self
            .send(
                self.http
                    .get(self.url(&format!("/accounts/{}/balances", iban)))
                    .headers(self.headers(&correlation_id(DIGIT_BALANCE), Some(consent_id))),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let balances: Balances = outcome.json()?;
        let amount = balances
            .balances
            .into_iter()
            .next()
            .and_then(|entry| entry.balance_amount)
            .ok_or(ProviderError::MissingField {
                field: "balances[0].balanceAmount".to_string(),
            })?;

        let value: Decimal = amount.amount.parse().map_err(|_| ProviderError::MissingField {
            field: "balanceAmount.amount".to_string(),
        })?;
        Ok(Balance {
            amount: value,
            currency: amount.currency,
        })
    }

    async fn fetch_transactions(
        &self,
        iban: &str,
        consent_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> ProviderResult<TransactionFeed> {
        let outcome = self
            .send(
                self.http
                    .get(self.url(&format!("/accounts/{}/transactions", iban)))
                    .query(&[
                        ("dateFrom", wire_date(date_from)),
                        ("dateTo", wire_date(date_to)),
                        ("bookingStatus", "all".to_string()),
                    ])
                    .headers(self.headers(&correlation_id(DIGIT_TRANSACTIONS), Some(consent_id))),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let feed: TransactionFeed = outcome.json()?;
        info!(
            booked = feed.booked.len(),
            pending = feed.pending.len(),
            "fetched transaction feed"
        );
        Ok(feed)
    }

    async fn transaction_count(
        &self,
        iban: &str,
        consent_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> ProviderResult<usize> {
        let feed = self
            .fetch_transactions(iban, consent_id, date_from, date_to)
            .await?;
        Ok(feed.total())
    }

    async fn initiate_payment(
        &self,
        debtor_iban: &str,
        amount: Decimal,
        creditor_iban: &str,
        creditor_bic: &str,
    ) -> ProviderResult<String> {
        #[derive(Serialize)]
        struct PaymentAccount<'a> {
            iban: &'a str,
            bic: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PaymentRequest<'a> {
            debtor_account: PaymentAccount<'a>,
            instructed_amount: WireAmount,
            creditor_account: PaymentAccount<'a>,
            creditor_name: &'a str,
            remittance_information_unstructured: &'a str,
            requested_execution_date: String,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PaymentCreated {
            payment_id: Option<String>,
        }

        let payload = PaymentRequest {
            debtor_account: PaymentAccount {
                iban: debtor_iban,
                bic: DEBTOR_BIC,
            },
            instructed_amount: WireAmount {
                currency: "EUR".to_string(),
                amount: amount.to_string(),
            },
            creditor_account: PaymentAccount {
                iban: creditor_iban,
                bic: creditor_bic,
            },
            creditor_name: "Test Recipient GmbH",
            remittance_information_unstructured: "Payment for services rendered",
            requested_execution_date: wire_date((Utc::now() + Duration::days(1)).date_naive()),
        };

        info!(debtor = %debtor_iban, %amount, "initiating SEPA credit transfer");
        let outcome = self
            .send(
                self.http
                    .post(self.url("/payments/sepa-credit-transfers"))
                    .headers(self.headers(&correlation_id(DIGIT_PAYMENT_MOCK_SUCCESS), None))
                    .json(&payload),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let created: PaymentCreated = outcome.json()?;
        created.payment_id.ok_or(ProviderError::MissingField {
            field: "paymentId".to_string(),
        })
    }

    async fn check_payment_status(&self, payment_id: &str) -> ProviderResult<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PaymentStatus {
            transaction_status: Option<String>,
        }

        let outcome = self
            .send(
                self.http
                    .get(self.url(&format!("/payments/{}/status", payment_id)))
                    .headers(self.headers(&correlation_id(DIGIT_STATUS_LOOKUP), None)),
            )
            .await?;
        if !outcome.is_success() {
            return Err(outcome.into_http_error());
        }
        let status: PaymentStatus = outcome.json()?;
        status.transaction_status.ok_or(ProviderError::MissingField {
            field: "transactionStatus".to_string(),
        })
    }

    async fn delete_all_transactions(&self, iban: &str) -> ProviderResult<bool> {
        // Non-standard cleanup endpoint; the sandbox rejects it when a
        // Consent-ID header is attached.
        let outcome = self
            .send(
                self.http
                    .delete(self.url(&format!("/sandbox/accounts/{}/transactions", iban)))
                    .headers(self.headers(&correlation_id(DIGIT_SANDBOX_DELETE), None)),
            )
            .await?;
        match outcome.status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => {
                warn!(iban = %iban, "sandbox cleanup endpoint absent (404)");
                Ok(false)
            }
            _ => Err(outcome.into_http_error()),
        }
    }

    async fn create_mock_deposit(&self, iban: &str, amount: Decimal) -> ProviderResult<bool> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct MockDeposit<'a> {
            transaction_amount: WireAmount,
            booking_date: String,
            value_date: String,
            creditor_account: WireAccount,
            debtor_name: &'a str,
            debtor_account: WireAccount,
            remittance_information_unstructured: &'a str,
        }

        let today = wire_date(Utc::now().date_naive());
        let payload = MockDeposit {
            transaction_amount: WireAmount {
                currency: "EUR".to_string(),
                amount: amount.to_string(),
            },
            booking_date: today.clone(),
            value_date: today,
            creditor_account: WireAccount {
                iban: Some(iban.to_string()),
            },
            debtor_name: "MockDeposit Source",
            debtor_account: WireAccount {
                iban: Some("DE99111111112222222233".to_string()),
            },
            remittance_information_unstructured: "Sandbox Deposit",
        };

        // Same non-standard path as cleanup; POST is assumed to create a
        // mock transaction resource. Consent-ID must not be sent.
        let outcome = self
            .send(
                self.http
                    .post(self.url(&format!("/sandbox/accounts/{}/transactions", iban)))
                    .headers(self.headers(&correlation_id(DIGIT_SANDBOX_DEPOSIT), None))
                    .json(&payload),
            )
            .await?;
        match outcome.status {
            StatusCode::CREATED => Ok(true),
            StatusCode::NOT_FOUND => {
                warn!(iban = %iban, "sandbox mock deposit endpoint absent (404)");
                Ok(false)
            }
            _ => Err(outcome.into_http_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_omit_consent_when_not_supplied() {
        let bank = VpBank::new(ProviderConfig::default()).unwrap();
        let headers = bank.headers("req-1", None);
        assert!(headers.get("Consent-ID").is_none());
        assert_eq!(headers.get("X-Request-ID").unwrap(), "req-1");
        assert!(headers.get("TPP-Redirect-URI").is_some());
        assert!(headers.get("PSU-IP-Address").is_some());
    }

    #[test]
    fn test_headers_attach_consent_when_supplied() {
        let bank = VpBank::new(ProviderConfig::default()).unwrap();
        let headers = bank.headers("req-2", Some("consent-abc"));
        assert_eq!(headers.get("Consent-ID").unwrap(), "consent-abc");
    }

    #[test]
    fn test_url_join() {
        let bank = VpBank::new(ProviderConfig::default()).unwrap();
        assert!(bank.url("/consents").ends_with("/v1/consents"));
    }
}
