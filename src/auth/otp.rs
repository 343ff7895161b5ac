// In-memory one-time password store for password resets
//
// Codes live in process memory with a short TTL, so resets only work
// against the instance that issued the code. Single-instance deployments
// only; a multi-instance deployment would need shared storage.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

/// Stores pending password-reset codes keyed by lowercase email
///
/// Issuing a new code replaces any previous one for the same email, and
/// a successful verification consumes the code.
#[derive(Debug, Default)]
pub struct OtpStore {
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh 6-digit code for an email, valid for 10 minutes
    pub fn issue(&self, email: &str) -> String {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let entry = OtpEntry {
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(email.to_lowercase(), entry);
        debug!("Issued OTP for {}", email);

        code
    }

    /// Verify a code and consume it on success
    ///
    /// Expired entries are removed whether or not the code matched.
    pub fn verify_and_consume(&self, email: &str, code: &str) -> bool {
        let key = email.to_lowercase();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(&key) {
            Some(entry) if entry.expires_at <= Utc::now() => {
                entries.remove(&key);
                false
            }
            Some(entry) if entry.code == code => {
                entries.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_code_verifies_once() {
        let store = OtpStore::new();
        let code = store.issue("user@example.com");

        assert!(store.verify_and_consume("user@example.com", &code));
        // Consumed on first use
        assert!(!store.verify_and_consume("user@example.com", &code));
    }

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let store = OtpStore::new();
        let code = store.issue("User@Example.com");

        assert!(store.verify_and_consume("user@example.com", &code));
    }

    #[test]
    fn test_wrong_code_is_rejected_without_consuming() {
        let store = OtpStore::new();
        let code = store.issue("user@example.com");

        assert!(!store.verify_and_consume("user@example.com", "000000x"));
        assert!(store.verify_and_consume("user@example.com", &code));
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let store = OtpStore::new();
        let first = store.issue("user@example.com");
        let second = store.issue("user@example.com");

        if first != second {
            assert!(!store.verify_and_consume("user@example.com", &first));
        }
        assert!(store.verify_and_consume("user@example.com", &second));
    }

    #[test]
    fn test_code_is_six_digits() {
        let store = OtpStore::new();
        let code = store.issue("user@example.com");

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unknown_email_is_rejected() {
        let store = OtpStore::new();
        assert!(!store.verify_and_consume("nobody@example.com", "123456"));
    }
}
