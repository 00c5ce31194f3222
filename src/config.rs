//! Runtime configuration.
//!
//! Every field has a default matching the reference deployment, so an empty
//! TOML file (or none at all) yields a working assistant.

use crate::domain::otp::OtpPolicy;
use crate::domain::transfer::{DEFAULT_FALLBACK_AMOUNT, DEFAULT_OTP_THRESHOLD};
use crate::error::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Locale used when a turn does not carry one.
    pub default_locale: String,
    /// Subject used when a turn has neither a user id nor a session id.
    pub default_subject: String,
    pub otp: OtpPolicy,
    pub transfer: TransferConfig,
    pub defaults: AccountDefaults,
    pub backend: BackendConfig,
    pub speech: SpeechConfig,
    /// JSON file whose entries override the built-in templates.
    pub templates_path: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_locale: "hi".to_string(),
            default_subject: "cust_demo".to_string(),
            otp: OtpPolicy::default(),
            transfer: TransferConfig::default(),
            defaults: AccountDefaults::default(),
            backend: BackendConfig::default(),
            speech: SpeechConfig::default(),
            templates_path: None,
        }
    }
}

impl AssistantConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub otp_threshold: Decimal,
    pub fallback_amount: Decimal,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            otp_threshold: DEFAULT_OTP_THRESHOLD,
            fallback_amount: DEFAULT_FALLBACK_AMOUNT,
        }
    }
}

/// Values used when the dialogue engine leaves a slot empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountDefaults {
    pub account_id: String,
    pub from_account: String,
    pub to_account: String,
    pub currency: String,
    pub bill_amount: Decimal,
    pub biller_id: String,
    pub transfer_note: String,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self {
            account_id: "acct_savings_1".to_string(),
            from_account: "acct_savings_1".to_string(),
            to_account: "acct_friend_riya".to_string(),
            currency: "INR".to_string(),
            bill_amount: dec!(500),
            biller_id: "demo_electricity_board".to_string(),
            transfer_note: "voice_upi_transfer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Banking API root. Without one the CLI runs against the simulated bank.
    pub base_url: Option<String>,
    /// Budget for read-only lookups (balance).
    pub read_timeout_ms: u64,
    /// Budget for money-moving and listing calls.
    pub write_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            read_timeout_ms: 5_000,
            write_timeout_ms: 8_000,
        }
    }
}

impl BackendConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub service_url: Option<String>,
    pub output_dir: PathBuf,
    /// Past this budget a reply goes out as text only.
    pub timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            output_dir: PathBuf::from("tts_responses"),
            timeout_ms: 4_000,
        }
    }
}

impl SpeechConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = AssistantConfig::from_toml_str("").unwrap();
        assert_eq!(config, AssistantConfig::default());
        assert_eq!(config.transfer.otp_threshold, dec!(5000));
        assert_eq!(config.otp.ttl_secs, 300);
        assert_eq!(config.otp.max_attempts, 3);
        assert_eq!(config.backend.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.write_timeout(), Duration::from_secs(8));
        assert_eq!(config.speech.timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_partial_override() {
        let raw = r#"
            default_locale = "en"

            [transfer]
            otp_threshold = 10000

            [otp]
            max_attempts = 5

            [backend]
            base_url = "https://bank.internal"

            [speech]
            timeout_ms = 1500
        "#;
        let config = AssistantConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.transfer.otp_threshold, dec!(10000));
        assert_eq!(config.transfer.fallback_amount, dec!(500));
        assert_eq!(config.otp.max_attempts, 5);
        assert_eq!(config.otp.ttl_secs, 300);
        assert_eq!(config.backend.base_url.as_deref(), Some("https://bank.internal"));
        assert_eq!(config.backend.write_timeout_ms, 8_000);
        assert_eq!(config.speech.timeout(), Duration::from_millis(1500));
        assert_eq!(config.speech.output_dir, PathBuf::from("tts_responses"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(AssistantConfig::from_toml_str("otp = 3").is_err());
    }
}
