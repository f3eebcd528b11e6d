//! Configuration for the keeper

use ledger_core::AccountId;
use serde::{Deserialize, Serialize};

/// Keeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Privileged identity for manual performs and interval changes
    pub owner: AccountId,

    /// Minimum seconds between perform cycles; must be positive
    pub poll_interval_secs: u64,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::new("operator"),
            poll_interval_secs: 300, // 5 minutes between permitted performs
        }
    }
}

impl KeeperConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: KeeperConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = KeeperConfig::default();

        if let Ok(owner) = std::env::var("KEEPER_OWNER") {
            config.owner = AccountId::new(owner);
        }

        if let Ok(interval) = std::env::var("KEEPER_POLL_INTERVAL_SECS") {
            config.poll_interval_secs = interval.parse().map_err(|_| {
                crate::Error::Config(format!("Invalid KEEPER_POLL_INTERVAL_SECS: {}", interval))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check configuration invariants
    pub fn validate(&self) -> crate::Result<()> {
        if self.owner.is_null() {
            return Err(crate::Error::Config(
                "owner cannot be the null identity".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::InvalidInterval(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = KeeperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval_secs, 300);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = KeeperConfig::default();
        config.poll_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_parse_from_toml() {
        let config: KeeperConfig = toml::from_str(
            r#"
            owner = "ops"
            poll_interval_secs = 30
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.owner, AccountId::new("ops"));
        assert_eq!(config.poll_interval_secs, 30);
    }
}
