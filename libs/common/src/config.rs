//! Service settings loaded from `NEUVIS_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

fn default_pass_issue_delay_ms() -> u64 {
    2000
}

/// Settings shared by the NEUVIS HTTP services
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Artificial latency before a visitor pass is issued
    #[serde(default = "default_pass_issue_delay_ms")]
    pub pass_issue_delay_ms: u64,
    /// Superadmin created at startup when no account uses this email
    pub bootstrap_superadmin_email: Option<String>,
    pub bootstrap_superadmin_password: Option<String>,
}

impl ServiceConfig {
    /// Load settings, falling back to `default_bind_address` when
    /// `NEUVIS_BIND_ADDRESS` is unset.
    pub fn from_env(default_bind_address: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", default_bind_address)?
            .add_source(Environment::with_prefix("NEUVIS").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        unsafe {
            std::env::remove_var("NEUVIS_BIND_ADDRESS");
            std::env::remove_var("NEUVIS_PASS_ISSUE_DELAY_MS");
        }

        let config = ServiceConfig::from_env("0.0.0.0:3001").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3001");
        assert_eq!(config.pass_issue_delay_ms, 2000);
        assert_eq!(config.bootstrap_superadmin_email, None);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        unsafe {
            std::env::set_var("NEUVIS_BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("NEUVIS_PASS_ISSUE_DELAY_MS", "250");
        }

        let config = ServiceConfig::from_env("0.0.0.0:3001").unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.pass_issue_delay_ms, 250);

        unsafe {
            std::env::remove_var("NEUVIS_BIND_ADDRESS");
            std::env::remove_var("NEUVIS_PASS_ISSUE_DELAY_MS");
        }
    }
}
