use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TTL_SECS: i64 = 300;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const CODE_LENGTH: usize = 6;

/// Lifetime and attempt budget applied to every new challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpPolicy {
    pub ttl_secs: i64,
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A live one-time challenge for a single subject.
///
/// At most one exists per subject; issuing a new one replaces the old.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub subject_id: String,
    /// Six numeric digits.
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub ttl_secs: i64,
}

impl OtpChallenge {
    pub fn issue(
        subject_id: impl Into<String>,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            code: code.into(),
            issued_at,
            attempts_used: 0,
            max_attempts: policy.max_attempts,
            ttl_secs: policy.ttl_secs,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.ttl_secs)
    }

    /// Expired once strictly more than `ttl_secs` have passed since issue.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::seconds(self.ttl_secs)
    }

    pub fn is_locked(&self) -> bool {
        self.attempts_used >= self.max_attempts
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_used)
    }

    /// Compares in time independent of where the first mismatch is.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.code.as_bytes();
        let given = candidate.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Counts a wrong guess and returns the attempts left.
    pub fn record_failure(&mut self) -> u32 {
        self.attempts_used = (self.attempts_used + 1).min(self.max_attempts);
        self.remaining_attempts()
    }
}

/// Result of checking a candidate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum VerifyOutcome {
    Verified,
    Invalid { remaining_attempts: u32 },
    Expired,
    /// No challenge, or the attempt budget is exhausted.
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> OtpChallenge {
        let issued_at = DateTime::parse_from_rfc3339("2026-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        OtpChallenge::issue("cust_1", "482913", issued_at, OtpPolicy::default())
    }

    #[test]
    fn test_expiry_boundary() {
        let c = challenge();
        assert!(!c.is_expired(c.issued_at + Duration::seconds(299)));
        assert!(!c.is_expired(c.issued_at + Duration::seconds(300)));
        assert!(c.is_expired(c.issued_at + Duration::seconds(301)));
        assert_eq!(c.expires_at(), c.issued_at + Duration::seconds(300));
    }

    #[test]
    fn test_code_matching() {
        let c = challenge();
        assert!(c.matches("482913"));
        assert!(!c.matches("482914"));
        assert!(!c.matches("48291"));
        assert!(!c.matches(""));
    }

    #[test]
    fn test_attempt_accounting() {
        let mut c = challenge();
        assert_eq!(c.remaining_attempts(), 3);
        assert_eq!(c.record_failure(), 2);
        assert_eq!(c.record_failure(), 1);
        assert!(!c.is_locked());
        assert_eq!(c.record_failure(), 0);
        assert!(c.is_locked());
        assert_eq!(c.record_failure(), 0);
        assert_eq!(c.attempts_used, c.max_attempts);
    }
}
