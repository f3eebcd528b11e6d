//! Configuration for the ledger

use crate::policy::SweepPolicy;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Privileged identity allowed to change policy, trigger manual sweeps
    /// and drain the pool in an emergency
    pub owner: AccountId,

    /// Sweep policy applied at construction
    pub sweep: SweepSettings,

    /// Lower bound enforced on later cooldown changes (seconds, 0 = none)
    pub cooldown_floor_secs: u64,
}

/// Initial sweep policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Pool level at or above which sweeps become eligible
    pub threshold: u64,

    /// Recipient of swept funds
    pub target: Option<AccountId>,

    /// Start with automatic sweeps on
    pub enabled: bool,

    /// Minimum amount worth sweeping
    pub minimum_amount: u64,

    /// Seconds between successful sweeps (0 disables the cooldown)
    pub cooldown_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::new("operator"),
            sweep: SweepSettings::default(),
            cooldown_floor_secs: 0,
        }
    }
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            threshold: 0,
            target: None,
            enabled: false, // armed explicitly once a target exists
            minimum_amount: 1,
            cooldown_secs: 0,
        }
    }
}

impl SweepSettings {
    /// Build the runtime policy these settings describe
    pub fn into_policy(self) -> SweepPolicy {
        SweepPolicy {
            threshold: self.threshold,
            target: self.target,
            enabled: self.enabled,
            minimum_amount: self.minimum_amount,
            cooldown_secs: self.cooldown_secs,
            last_sweep_time: 0,
        }
    }
}

impl LedgerConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: LedgerConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = LedgerConfig::default();

        if let Ok(owner) = std::env::var("LEDGER_OWNER") {
            config.owner = AccountId::new(owner);
        }

        if let Ok(target) = std::env::var("LEDGER_SWEEP_TARGET") {
            config.sweep.target = Some(AccountId::new(target));
        }

        if let Ok(threshold) = std::env::var("LEDGER_SWEEP_THRESHOLD") {
            config.sweep.threshold = parse_var("LEDGER_SWEEP_THRESHOLD", &threshold)?;
        }

        if let Ok(enabled) = std::env::var("LEDGER_SWEEP_ENABLED") {
            config.sweep.enabled = enabled
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid LEDGER_SWEEP_ENABLED: {}", enabled)))?;
        }

        if let Ok(minimum) = std::env::var("LEDGER_SWEEP_MINIMUM") {
            config.sweep.minimum_amount = parse_var("LEDGER_SWEEP_MINIMUM", &minimum)?;
        }

        if let Ok(cooldown) = std::env::var("LEDGER_SWEEP_COOLDOWN_SECS") {
            config.sweep.cooldown_secs = parse_var("LEDGER_SWEEP_COOLDOWN_SECS", &cooldown)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> crate::Result<()> {
        if self.owner.is_null() {
            return Err(crate::Error::Config(
                "owner cannot be the null identity".to_string(),
            ));
        }

        if self.sweep.minimum_amount == 0 {
            return Err(crate::Error::Config(
                "minimum sweep amount must be positive".to_string(),
            ));
        }

        match &self.sweep.target {
            Some(target) if target.is_null() => {
                return Err(crate::Error::Config(
                    "sweep target cannot be the null identity".to_string(),
                ));
            }
            None if self.sweep.enabled => {
                return Err(crate::Error::Config(
                    "sweeps cannot be enabled without a target".to_string(),
                ));
            }
            _ => {}
        }

        if self.sweep.cooldown_secs < self.cooldown_floor_secs {
            return Err(crate::Error::Config(format!(
                "cooldown {}s below the {}s floor",
                self.sweep.cooldown_secs, self.cooldown_floor_secs
            )));
        }

        Ok(())
    }
}

fn parse_var(name: &str, value: &str) -> crate::Result<u64> {
    value
        .parse()
        .map_err(|_| crate::Error::Config(format!("Invalid {}: {}", name, value)))
}
