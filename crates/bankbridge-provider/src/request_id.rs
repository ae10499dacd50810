//! Request correlation identifiers
//!
//! Every outbound call carries an `X-Request-ID`. The sandbox interprets
//! the trailing character of the id as a directive to simulate a specific
//! outcome (e.g. `'8'` forces a mock-success payment status). This is
//! provider-specific sandbox behavior, not a protocol feature; against a
//! real provider the trailing digit is an inert convention.

use uuid::Uuid;

/// Trailing digit for consent creation calls
pub const DIGIT_CONSENT_CREATE: char = '1';
/// Trailing digit for status lookups (consent status, payment status)
pub const DIGIT_STATUS_LOOKUP: char = '2';
/// Trailing digit for balance calls
pub const DIGIT_BALANCE: char = '4';
/// Trailing digit for sandbox transaction cleanup
pub const DIGIT_SANDBOX_DELETE: char = '5';
/// Trailing digit for sandbox mock deposits
pub const DIGIT_SANDBOX_DEPOSIT: char = '6';
/// Trailing digit forcing a mock-success payment status
pub const DIGIT_PAYMENT_MOCK_SUCCESS: char = '8';
/// Trailing digit for transaction listing calls
pub const DIGIT_TRANSACTIONS: char = '9';

/// Generate a correlation id: a random UUIDv4 with its final character
/// overwritten by the supplied digit.
pub fn correlation_id(trailing: char) -> String {
    let mut id = Uuid::new_v4().to_string();
    id.pop();
    id.push(trailing);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_is_uuid_shaped() {
        let id = correlation_id(DIGIT_CONSENT_CREATE);
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn test_trailing_digit_is_forced() {
        for digit in ['1', '2', '4', '5', '6', '8', '9'] {
            let id = correlation_id(digit);
            assert!(id.ends_with(digit));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let a = correlation_id(DIGIT_BALANCE);
        let b = correlation_id(DIGIT_BALANCE);
        assert_ne!(a, b);
    }
}
