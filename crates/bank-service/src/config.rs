//! Service configuration.

use bank_core::DEFAULT_BANK_ID;

/// Banking service configuration.
///
/// ## Example
/// ```rust
/// use bank_service::ServiceConfig;
///
/// let config = ServiceConfig::default().max_issue_attempts(10);
/// assert_eq!(config.bank_id, "400000");
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bank identification number at the front of issued cards.
    /// Default: "400000"
    pub bank_id: String,

    /// Number draws card issuance may make before giving up.
    /// Default: 100
    pub max_issue_attempts: u32,
}

impl ServiceConfig {
    /// Creates a configuration with the given bank id.
    pub fn new(bank_id: impl Into<String>) -> Self {
        ServiceConfig {
            bank_id: bank_id.into(),
            max_issue_attempts: 100,
        }
    }

    /// Sets the issuance attempt budget (at least 1).
    pub fn max_issue_attempts(mut self, attempts: u32) -> Self {
        self.max_issue_attempts = attempts.max(1);
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig::new(DEFAULT_BANK_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.bank_id, "400000");
        assert_eq!(config.max_issue_attempts, 100);
    }

    #[test]
    fn test_attempts_floor() {
        assert_eq!(ServiceConfig::default().max_issue_attempts(0).max_issue_attempts, 1);
    }
}
