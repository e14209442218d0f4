//! Client configuration

use std::time::Duration;

/// Connection settings for the sales backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Operator bearer token
    pub token: Option<String>,

    /// Branch whose catalog is served; falls back to the token's claim
    pub branch_id: Option<i64>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            branch_id: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_branch(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://pos.example")
            .with_token("t")
            .with_branch(4)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "https://pos.example");
        assert_eq!(config.token.as_deref(), Some("t"));
        assert_eq!(config.branch_id, Some(4));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_points_at_localhost() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.token.is_none());
    }
}
