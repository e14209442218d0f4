//! Terminal configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | BREW_API_URL | http://localhost:8080 | Backend base URL |
//! | BREW_API_TOKEN | (empty) | Bearer credential of the operator |
//! | BREW_DATA_DIR | (unset) | Directory of the local redb file; unset keeps state in memory |
//! | BREW_TAX_PERCENT | 12 | VAT rate in percent |
//! | BREW_REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
//! | GCASH_POLL_INTERVAL_MS | 3000 | Payment status poll interval |
//! | GCASH_SESSION_TIMEOUT_SECS | (unset) | Expire abandoned GCash sessions; unset polls until closed |
//! | HOLD_SETTLE_DELAY_MS | 800 | Pause after a successful hold |
//! | LOG_LEVEL | info | Log filter |
//! | LOG_DIR | (unset) | Also write daily log files here |

use std::path::PathBuf;
use std::time::Duration;

use crate::pricing::DEFAULT_TAX_PERCENT;

/// Local database file name inside the data dir
pub const DATABASE_FILE: &str = "terminal.redb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcashConfig {
    pub poll_interval: Duration,
    /// `None`: poll until the operator closes the session
    pub session_timeout: Option<Duration>,
}

impl Default for GcashConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3000),
            session_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub api_url: String,
    pub api_token: String,
    pub data_dir: Option<PathBuf>,
    pub tax_percent: u32,
    pub request_timeout: Duration,
    pub gcash: GcashConfig,
    pub hold_settle_delay: Duration,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl CheckoutConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("BREW_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            api_token: std::env::var("BREW_API_TOKEN").unwrap_or_default(),
            data_dir: std::env::var("BREW_DATA_DIR").ok().map(PathBuf::from),
            tax_percent: std::env::var("BREW_TAX_PERCENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TAX_PERCENT),
            request_timeout: Duration::from_millis(
                std::env::var("BREW_REQUEST_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30000),
            ),
            gcash: GcashConfig {
                poll_interval: Duration::from_millis(
                    std::env::var("GCASH_POLL_INTERVAL_MS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(3000),
                ),
                session_timeout: std::env::var("GCASH_SESSION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .map(Duration::from_secs),
            },
            hold_settle_delay: Duration::from_millis(
                std::env::var("HOLD_SETTLE_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(800),
            ),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Path of the local database, if state is persisted
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DATABASE_FILE))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.gcash.poll_interval = interval;
        self
    }

    pub fn with_session_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.gcash.session_timeout = timeout;
        self
    }

    pub fn with_hold_settle_delay(mut self, delay: Duration) -> Self {
        self.hold_settle_delay = delay;
        self
    }

    pub fn with_tax_percent(mut self, tax_percent: u32) -> Self {
        self.tax_percent = tax_percent;
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = CheckoutConfig::from_env()
            .with_poll_interval(Duration::from_millis(10))
            .with_session_timeout(Some(Duration::from_secs(1)))
            .with_hold_settle_delay(Duration::ZERO)
            .with_tax_percent(0);
        assert_eq!(config.gcash.poll_interval, Duration::from_millis(10));
        assert_eq!(config.gcash.session_timeout, Some(Duration::from_secs(1)));
        assert!(config.hold_settle_delay.is_zero());
        assert_eq!(config.tax_percent, 0);
    }

    #[test]
    fn test_gcash_defaults_have_no_timeout() {
        let gcash = GcashConfig::default();
        assert_eq!(gcash.poll_interval, Duration::from_secs(3));
        assert!(gcash.session_timeout.is_none());
    }
}
