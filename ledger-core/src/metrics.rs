//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_deposits_total` - Accepted deposits
//! - `ledger_withdrawals_total` - Paid-out withdrawals
//! - `ledger_transfers_total` - Internal transfers
//! - `ledger_sweeps_total` - Successful sweeps
//! - `ledger_sweep_skips_total` - Sweep attempts skipped by the gate ladder
//! - `ledger_sweep_failures_total` - Sweep attempts refused by the payout sink
//! - `ledger_pooled_funds` - Current pooled funds (smallest units)

use crate::types::SweepOutcome;
use prometheus::{IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Accepted deposits
    pub deposits_total: IntCounter,

    /// Paid-out withdrawals
    pub withdrawals_total: IntCounter,

    /// Internal transfers
    pub transfers_total: IntCounter,

    /// Successful sweeps
    pub sweeps_total: IntCounter,

    /// Sweep attempts skipped by the gate ladder
    pub sweep_skips_total: IntCounter,

    /// Sweep attempts refused by the payout sink
    pub sweep_failures_total: IntCounter,

    /// Current pooled funds (smallest units)
    pub pooled_funds: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with an owned registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let deposits_total =
            IntCounter::with_opts(Opts::new("ledger_deposits_total", "Accepted deposits"))?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total = IntCounter::with_opts(Opts::new(
            "ledger_withdrawals_total",
            "Paid-out withdrawals",
        ))?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let transfers_total =
            IntCounter::with_opts(Opts::new("ledger_transfers_total", "Internal transfers"))?;
        registry.register(Box::new(transfers_total.clone()))?;

        let sweeps_total =
            IntCounter::with_opts(Opts::new("ledger_sweeps_total", "Successful sweeps"))?;
        registry.register(Box::new(sweeps_total.clone()))?;

        let sweep_skips_total = IntCounter::with_opts(Opts::new(
            "ledger_sweep_skips_total",
            "Sweep attempts skipped by the gate ladder",
        ))?;
        registry.register(Box::new(sweep_skips_total.clone()))?;

        let sweep_failures_total = IntCounter::with_opts(Opts::new(
            "ledger_sweep_failures_total",
            "Sweep attempts refused by the payout sink",
        ))?;
        registry.register(Box::new(sweep_failures_total.clone()))?;

        let pooled_funds = IntGauge::with_opts(Opts::new(
            "ledger_pooled_funds",
            "Current pooled funds (smallest units)",
        ))?;
        registry.register(Box::new(pooled_funds.clone()))?;

        Ok(Self {
            deposits_total,
            withdrawals_total,
            transfers_total,
            sweeps_total,
            sweep_skips_total,
            sweep_failures_total,
            pooled_funds,
            registry,
        })
    }

    /// Record an accepted deposit
    pub fn record_deposit(&self) {
        self.deposits_total.inc();
    }

    /// Record a paid-out withdrawal
    pub fn record_withdrawal(&self) {
        self.withdrawals_total.inc();
    }

    /// Record an internal transfer
    pub fn record_transfer(&self) {
        self.transfers_total.inc();
    }

    /// Record one sweep outcome
    pub fn record_sweep_outcome(&self, outcome: &SweepOutcome) {
        match outcome {
            SweepOutcome::Swept { .. } => self.sweeps_total.inc(),
            SweepOutcome::Skipped(_) => self.sweep_skips_total.inc(),
            SweepOutcome::Failed { .. } => self.sweep_failures_total.inc(),
        }
    }

    /// Update the pooled funds gauge
    pub fn set_pooled_funds(&self, pooled: u64) {
        self.pooled_funds.set(pooled.min(i64::MAX as u64) as i64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkipReason;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.deposits_total.get(), 0);
        assert_eq!(metrics.sweeps_total.get(), 0);
    }

    #[test]
    fn test_record_operations() {
        let metrics = Metrics::new().unwrap();
        metrics.record_deposit();
        metrics.record_deposit();
        metrics.record_withdrawal();
        metrics.record_transfer();

        assert_eq!(metrics.deposits_total.get(), 2);
        assert_eq!(metrics.withdrawals_total.get(), 1);
        assert_eq!(metrics.transfers_total.get(), 1);
    }

    #[test]
    fn test_record_sweep_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_sweep_outcome(&SweepOutcome::Swept { amount: 100 });
        metrics.record_sweep_outcome(&SweepOutcome::Skipped(SkipReason::Cooldown));
        metrics.record_sweep_outcome(&SweepOutcome::Failed {
            amount: 50,
            reason: "refused".to_string(),
        });

        assert_eq!(metrics.sweeps_total.get(), 1);
        assert_eq!(metrics.sweep_skips_total.get(), 1);
        assert_eq!(metrics.sweep_failures_total.get(), 1);
    }

    #[test]
    fn test_pooled_funds_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_pooled_funds(1_000);
        assert_eq!(metrics.pooled_funds.get(), 1_000);

        metrics.set_pooled_funds(65);
        assert_eq!(metrics.pooled_funds.get(), 65);
    }
}
