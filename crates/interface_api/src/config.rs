//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_fees::{BalanceCalculator, ChannelPolicy, RosterSettings, ZeroBalancePolicy};
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field has a default, so an empty environment yields a working
/// development configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub database_max_connections: u32,
    /// Apply migrations at startup
    pub run_migrations: bool,
    /// Log level
    pub log_level: String,
    /// Learners fetched at once when computing a roster
    pub max_concurrency: usize,
    /// Per-learner record fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
    pub zero_balance_policy: ZeroBalancePolicy,
    /// Refuse balances where a payment reference appears in both channels
    pub strict_channels: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let roster = RosterSettings::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/school_fees".to_string(),
            database_max_connections: 10,
            run_migrations: true,
            log_level: "info".to_string(),
            max_concurrency: roster.max_concurrency,
            fetch_timeout_ms: roster.fetch_timeout.as_millis() as u64,
            zero_balance_policy: ZeroBalancePolicy::default(),
            strict_channels: false,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url).max_connections(self.database_max_connections)
    }

    pub fn calculator(&self) -> BalanceCalculator {
        let channel_policy = if self.strict_channels {
            ChannelPolicy::RejectOverlap
        } else {
            ChannelPolicy::Additive
        };
        BalanceCalculator::new()
            .with_zero_balance_policy(self.zero_balance_policy)
            .with_channel_policy(channel_policy)
    }

    pub fn roster_settings(&self) -> RosterSettings {
        RosterSettings {
            max_concurrency: self.max_concurrency,
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            calculator: self.calculator(),
            ..RosterSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_roster_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.roster_settings(), RosterSettings::default());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_strict_channels_selects_reject_overlap() {
        let config = ApiConfig {
            strict_channels: true,
            zero_balance_policy: ZeroBalancePolicy::PendingWhenUnbilled,
            ..ApiConfig::default()
        };
        let calculator = config.calculator();
        assert_eq!(calculator.channel_policy, ChannelPolicy::RejectOverlap);
        assert_eq!(calculator.zero_balance_policy, ZeroBalancePolicy::PendingWhenUnbilled);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("max_concurrency", 3i64)
            .unwrap()
            .set_override("zero_balance_policy", "pending_when_unbilled")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.zero_balance_policy, ZeroBalancePolicy::PendingWhenUnbilled);
        assert_eq!(config.port, 8080);
    }
}
