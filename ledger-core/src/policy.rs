//! Sweep policy and trigger gating
//!
//! [`SweepPolicy`] owns the configuration half of the automatic sweep and
//! answers the pure question "would a sweep fire right now, and for how
//! much". The mutation half lives in [`crate::ledger::Ledger`]; the keeper
//! re-derives its own due predicates from the same gate ladder.

use crate::types::{AccountId, SkipReason};
use serde::{Deserialize, Serialize};

/// Sweep trigger configuration plus the last successful sweep time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPolicy {
    /// Pool level at or above which a sweep becomes eligible
    pub threshold: u64,

    /// Recipient of swept funds; `None` until configured
    pub target: Option<AccountId>,

    /// Master enable flag
    pub enabled: bool,

    /// Minimum amount worth moving; smaller computed sweeps are skipped
    pub minimum_amount: u64,

    /// Seconds that must elapse between successful sweeps (0 disables)
    pub cooldown_secs: u64,

    /// Unix seconds of the last successful sweep
    pub last_sweep_time: u64,
}

/// Result of evaluating the gate ladder at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepDecision {
    /// All gates passed; a sweep of `amount` should be attempted
    Eligible {
        /// Half the pool, floor-divided
        amount: u64,
        /// Configured recipient
        target: AccountId,
    },
    /// A gate failed; nothing to do
    Skip(SkipReason),
}

impl SweepPolicy {
    /// Policy with sweeping off and no target
    pub fn disabled() -> Self {
        Self {
            threshold: 0,
            target: None,
            enabled: false,
            minimum_amount: 1,
            cooldown_secs: 0,
            last_sweep_time: 0,
        }
    }

    /// Whether the cooldown window has elapsed at `now`
    pub fn cooldown_elapsed(&self, now: u64) -> bool {
        self.cooldown_secs == 0 || now >= self.last_sweep_time.saturating_add(self.cooldown_secs)
    }

    /// Amount a sweep would move out of a pool of `pooled`: half, floored.
    ///
    /// Halving leaves a decaying remainder in the pool instead of draining
    /// it to zero; this is intended product behavior.
    pub fn sweep_amount(pooled: u64) -> u64 {
        pooled / 2
    }

    /// Run the gate ladder: target/enabled, cooldown, threshold, minimum
    pub fn evaluate(&self, now: u64, pooled: u64) -> SweepDecision {
        let target = match (&self.target, self.enabled) {
            (Some(target), true) => target.clone(),
            _ => return SweepDecision::Skip(SkipReason::Disabled),
        };
        if !self.cooldown_elapsed(now) {
            return SweepDecision::Skip(SkipReason::Cooldown);
        }
        if pooled < self.threshold {
            return SweepDecision::Skip(SkipReason::BelowThreshold);
        }
        let amount = Self::sweep_amount(pooled);
        if amount < self.minimum_amount {
            return SweepDecision::Skip(SkipReason::BelowMinimum);
        }
        SweepDecision::Eligible { amount, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed_policy(threshold: u64, cooldown_secs: u64) -> SweepPolicy {
        SweepPolicy {
            threshold,
            target: Some(AccountId::new("treasury")),
            enabled: true,
            minimum_amount: 1,
            cooldown_secs,
            last_sweep_time: 0,
        }
    }

    #[test]
    fn test_disabled_wins_over_every_other_gate() {
        let mut policy = armed_policy(100, 0);
        policy.enabled = false;

        // Pool far above threshold; still skipped as disabled.
        assert_eq!(
            policy.evaluate(1_000, 10_000),
            SweepDecision::Skip(SkipReason::Disabled)
        );
    }

    #[test]
    fn test_unset_target_reads_as_disabled() {
        let mut policy = armed_policy(100, 0);
        policy.target = None;

        assert_eq!(
            policy.evaluate(1_000, 10_000),
            SweepDecision::Skip(SkipReason::Disabled)
        );
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut policy = armed_policy(100, 60);
        policy.last_sweep_time = 1_000;

        assert_eq!(
            policy.evaluate(1_059, 200),
            SweepDecision::Skip(SkipReason::Cooldown)
        );
        // Exactly at the boundary the cooldown has elapsed.
        assert!(matches!(
            policy.evaluate(1_060, 200),
            SweepDecision::Eligible { amount: 100, .. }
        ));
    }

    #[test]
    fn test_threshold_boundary() {
        let policy = armed_policy(100, 0);

        assert_eq!(
            policy.evaluate(1_000, 99),
            SweepDecision::Skip(SkipReason::BelowThreshold)
        );
        assert!(matches!(
            policy.evaluate(1_000, 100),
            SweepDecision::Eligible { amount: 50, .. }
        ));
    }

    #[test]
    fn test_minimum_floor_gates_halved_amount() {
        let mut policy = armed_policy(0, 0);
        policy.minimum_amount = 100;

        // Pool of 199 halves to 99, below the floor.
        assert_eq!(
            policy.evaluate(1_000, 199),
            SweepDecision::Skip(SkipReason::BelowMinimum)
        );
        assert!(matches!(
            policy.evaluate(1_000, 200),
            SweepDecision::Eligible { amount: 100, .. }
        ));
    }

    #[test]
    fn test_sweep_amount_floors() {
        assert_eq!(SweepPolicy::sweep_amount(0), 0);
        assert_eq!(SweepPolicy::sweep_amount(1), 0);
        assert_eq!(SweepPolicy::sweep_amount(195), 97);
    }
}
