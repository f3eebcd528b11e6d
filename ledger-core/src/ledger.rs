//! Pooled-funds ledger with policy-driven automatic sweeps
//!
//! This module ties together the sweep policy, payout sink, and clock
//! components into the ledger's public mutation API.
//!
//! # Ordering discipline
//!
//! Every path that moves value out (withdraw, sweep, emergency withdraw)
//! debits ledger state BEFORE invoking the payout sink and restores it if
//! the sink refuses. A retried or re-entered caller therefore only ever
//! observes fully-consistent, already-debited state and can extract no more
//! than it is entitled to.
//!
//! # Example
//!
//! ```
//! use ledger_core::{AccountId, Ledger, LedgerConfig, RecordingSink, SystemClock};
//! use std::sync::Arc;
//!
//! fn main() -> ledger_core::Result<()> {
//!     let config = LedgerConfig::default();
//!     let sink = Arc::new(RecordingSink::new());
//!     let mut ledger = Ledger::new(config, sink, Arc::new(SystemClock))?;
//!
//!     ledger.deposit(&AccountId::new("alice"), 500)?;
//!     assert_eq!(ledger.pooled_funds(), 500);
//!
//!     Ok(())
//! }
//! ```

use crate::{
    clock::Clock,
    config::LedgerConfig,
    error::{Error, Result},
    metrics::Metrics,
    payout::PayoutSink,
    policy::{SweepDecision, SweepPolicy},
    types::{AccountId, SweepEvent, SweepOutcome},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Shared single-writer handle: one mutex per ledger instance
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Pooled-funds account ledger
///
/// Accounts are claims on the pool, not a partition of it: deposits raise
/// both the depositor's claim and the pool, while sweeps lower only the
/// pool. Accounts are created implicitly on first deposit and zeroed but
/// never removed.
pub struct Ledger {
    /// Per-account claims on the pool
    accounts: HashMap<AccountId, u64>,

    /// Total custodied balance
    pooled_funds: u64,

    /// Privileged identity for policy changes and manual sweeps
    owner: AccountId,

    /// Sweep trigger configuration
    policy: SweepPolicy,

    /// Lower bound enforced on cooldown changes (0 = unconstrained)
    cooldown_floor_secs: u64,

    /// External payout primitive
    sink: Arc<dyn PayoutSink>,

    /// Time source for cooldown arithmetic and event stamps
    clock: Arc<dyn Clock>,

    /// Prometheus instrumentation
    metrics: Metrics,
}

impl Ledger {
    /// Create a ledger from configuration plus injected collaborators
    pub fn new(
        config: LedgerConfig,
        sink: Arc<dyn PayoutSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("metrics registration failed: {}", e)))?;

        Ok(Self {
            accounts: HashMap::new(),
            pooled_funds: 0,
            owner: config.owner,
            policy: config.sweep.into_policy(),
            cooldown_floor_secs: config.cooldown_floor_secs,
            sink,
            clock,
            metrics,
        })
    }

    /// Wrap the ledger in its shared single-writer handle
    pub fn into_shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }

    /// Privileged owner identity
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Current custodied total
    pub fn pooled_funds(&self) -> u64 {
        self.pooled_funds
    }

    /// Claim balance of `account` (0 if never seen)
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Number of accounts ever credited
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Snapshot of the sweep policy
    pub fn policy(&self) -> &SweepPolicy {
        &self.policy
    }

    /// Prometheus metrics for this ledger
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Credit `account` and the pool, then run the automatic sweep check.
    ///
    /// Deposits are the sole automatic trigger path; other mutations never
    /// self-trigger. The returned sweep outcome is advisory: a skipped or
    /// failed sweep never unwinds the deposit itself.
    pub fn deposit(&mut self, account: &AccountId, amount: u64) -> Result<SweepOutcome> {
        if account.is_null() {
            return Err(Error::InvalidRecipient(
                "cannot deposit to the null identity".to_string(),
            ));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "deposit amount must be positive".to_string(),
            ));
        }

        let balance = self.balance_of(account);
        let new_balance = balance.checked_add(amount).ok_or_else(|| {
            Error::InvalidAmount("deposit would overflow account balance".to_string())
        })?;
        let new_pool = self.pooled_funds.checked_add(amount).ok_or_else(|| {
            Error::InvalidAmount("deposit would overflow pooled funds".to_string())
        })?;

        self.accounts.insert(account.clone(), new_balance);
        self.pooled_funds = new_pool;
        self.metrics.record_deposit();
        self.metrics.set_pooled_funds(self.pooled_funds);
        tracing::info!(
            account = %account,
            amount,
            pooled = self.pooled_funds,
            "deposit accepted"
        );

        Ok(self.auto_sweep())
    }

    /// Debit `account` and pay the amount out through the sink.
    ///
    /// All-or-nothing: a refused payout restores the balance and pool and
    /// surfaces [`Error::TransferFailed`].
    pub fn withdraw(&mut self, account: &AccountId, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "withdrawal amount must be positive".to_string(),
            ));
        }
        let balance = self.balance_of(account);
        if amount > balance {
            return Err(Error::InsufficientFunds(format!(
                "balance {} cannot cover withdrawal of {}",
                balance, amount
            )));
        }
        // Sweeps shrink custody without shrinking claims, so a claim can
        // outgrow the pool.
        if amount > self.pooled_funds {
            return Err(Error::InsufficientFunds(format!(
                "pooled funds {} cannot cover withdrawal of {}",
                self.pooled_funds, amount
            )));
        }

        // Debit first; the sink must only ever observe post-debit state.
        self.accounts.insert(account.clone(), balance - amount);
        self.pooled_funds -= amount;

        if let Err(err) = self.sink.pay(account, amount) {
            self.accounts.insert(account.clone(), balance);
            self.pooled_funds += amount;
            tracing::warn!(account = %account, amount, %err, "withdrawal payout refused; state restored");
            return Err(Error::TransferFailed(err.to_string()));
        }

        self.metrics.record_withdrawal();
        self.metrics.set_pooled_funds(self.pooled_funds);
        tracing::info!(
            account = %account,
            amount,
            pooled = self.pooled_funds,
            "withdrawal paid out"
        );
        Ok(())
    }

    /// Move `amount` from one claim to another.
    ///
    /// Purely internal bookkeeping: the pool is untouched, no external value
    /// moves, and no sweep check runs.
    pub fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u64) -> Result<()> {
        if to.is_null() {
            return Err(Error::InvalidRecipient(
                "transfer recipient is the null identity".to_string(),
            ));
        }
        if to == from {
            return Err(Error::SelfTransfer(format!(
                "{} cannot transfer to itself",
                from
            )));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "transfer amount must be positive".to_string(),
            ));
        }
        let from_balance = self.balance_of(from);
        if amount > from_balance {
            return Err(Error::InsufficientFunds(format!(
                "balance {} cannot cover transfer of {}",
                from_balance, amount
            )));
        }
        let to_balance = self.balance_of(to);
        let new_to = to_balance.checked_add(amount).ok_or_else(|| {
            Error::InvalidAmount("transfer would overflow recipient balance".to_string())
        })?;

        self.accounts.insert(from.clone(), from_balance - amount);
        self.accounts.insert(to.clone(), new_to);
        self.metrics.record_transfer();
        tracing::info!(from = %from, to = %to, amount, "transfer booked");
        Ok(())
    }

    /// Run the sweep check. Callable by anyone; a sweep whose conditions do
    /// not hold is a safe no-op, not an error.
    pub fn trigger_sweep(&mut self) -> SweepOutcome {
        self.auto_sweep()
    }

    /// Owner-gated alias for [`Ledger::trigger_sweep`]
    pub fn manual_sweep(&mut self, caller: &AccountId) -> Result<SweepOutcome> {
        self.ensure_owner(caller)?;
        Ok(self.auto_sweep())
    }

    /// Update the trigger threshold
    pub fn set_threshold(&mut self, caller: &AccountId, threshold: u64) -> Result<()> {
        self.ensure_owner(caller)?;
        self.policy.threshold = threshold;
        tracing::info!(threshold, "sweep threshold updated");
        Ok(())
    }

    /// Update the sweep recipient; the null identity is rejected
    pub fn set_target(&mut self, caller: &AccountId, target: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        if target.is_null() {
            return Err(Error::InvalidRecipient(
                "sweep target cannot be the null identity".to_string(),
            ));
        }
        tracing::info!(target = %target, "sweep target updated");
        self.policy.target = Some(target);
        Ok(())
    }

    /// Enable or disable automatic sweeps.
    ///
    /// Enabling requires a configured target, keeping the
    /// target-set-whenever-enabled invariant.
    pub fn set_enabled(&mut self, caller: &AccountId, enabled: bool) -> Result<()> {
        self.ensure_owner(caller)?;
        if enabled && self.policy.target.is_none() {
            return Err(Error::Config(
                "sweeps cannot be enabled without a target".to_string(),
            ));
        }
        self.policy.enabled = enabled;
        tracing::info!(enabled, "sweep enable flag updated");
        Ok(())
    }

    /// Update the minimum transfer floor; must be positive
    pub fn set_minimum_amount(&mut self, caller: &AccountId, minimum: u64) -> Result<()> {
        self.ensure_owner(caller)?;
        if minimum == 0 {
            return Err(Error::InvalidAmount(
                "minimum sweep amount must be positive".to_string(),
            ));
        }
        self.policy.minimum_amount = minimum;
        tracing::info!(minimum, "minimum sweep amount updated");
        Ok(())
    }

    /// Update the cooldown; rejected below the configured floor
    pub fn set_cooldown(&mut self, caller: &AccountId, cooldown_secs: u64) -> Result<()> {
        self.ensure_owner(caller)?;
        if cooldown_secs < self.cooldown_floor_secs {
            return Err(Error::Config(format!(
                "cooldown {}s below the {}s floor",
                cooldown_secs, self.cooldown_floor_secs
            )));
        }
        self.policy.cooldown_secs = cooldown_secs;
        tracing::info!(cooldown_secs, "sweep cooldown updated");
        Ok(())
    }

    /// Sweep the entire pool to the owner, bypassing all policy checks.
    ///
    /// Returns the amount moved. Individual claims are left as they are;
    /// `last_sweep_time` is not touched, since no policy sweep ran.
    pub fn emergency_withdraw(&mut self, caller: &AccountId) -> Result<u64> {
        self.ensure_owner(caller)?;
        if self.pooled_funds == 0 {
            return Err(Error::NoFunds("pool is empty".to_string()));
        }

        let amount = self.pooled_funds;
        self.pooled_funds = 0;

        if let Err(err) = self.sink.pay(&self.owner, amount) {
            self.pooled_funds = amount;
            tracing::warn!(amount, %err, "emergency payout refused; pool restored");
            return Err(Error::TransferFailed(err.to_string()));
        }

        self.metrics.set_pooled_funds(0);
        tracing::info!(amount, owner = %self.owner, "emergency withdrawal paid out");
        Ok(amount)
    }

    /// One sweep pass: evaluate the gate ladder and, when eligible, debit
    /// the pool and attempt the payout.
    ///
    /// A refused payout restores the pool and degrades to a diagnostic
    /// event; it never unwinds the caller's own state changes, so a failed
    /// sweep cannot undo the deposit that triggered it. `last_sweep_time`
    /// only advances on success.
    fn auto_sweep(&mut self) -> SweepOutcome {
        let now = self.clock.now();
        let outcome = match self.policy.evaluate(now, self.pooled_funds) {
            SweepDecision::Skip(reason) => SweepOutcome::Skipped(reason),
            SweepDecision::Eligible { amount, target } => {
                self.pooled_funds -= amount;
                match self.sink.pay(&target, amount) {
                    Ok(()) => {
                        self.policy.last_sweep_time = now;
                        SweepOutcome::Swept { amount }
                    }
                    Err(err) => {
                        self.pooled_funds += amount;
                        SweepOutcome::Failed {
                            amount,
                            reason: err.to_string(),
                        }
                    }
                }
            }
        };
        self.emit_sweep_event(now, &outcome);
        outcome
    }

    fn emit_sweep_event(&self, now: u64, outcome: &SweepOutcome) {
        self.metrics.record_sweep_outcome(outcome);
        self.metrics.set_pooled_funds(self.pooled_funds);

        match outcome {
            SweepOutcome::Swept { amount } => {
                tracing::info!(amount, pooled = self.pooled_funds, "sweep executed");
            }
            SweepOutcome::Skipped(reason) => {
                tracing::debug!(reason = %reason, pooled = self.pooled_funds, "sweep skipped");
            }
            SweepOutcome::Failed { amount, reason } => {
                tracing::warn!(amount, %reason, "sweep payout refused; pool restored");
            }
        }

        let event = SweepEvent {
            event_id: Uuid::new_v4(),
            timestamp: now,
            recipient: self.policy.target.clone(),
            outcome: outcome.clone(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            tracing::debug!(target: "sweeprail::events", %json, "sweep event");
        }
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(Error::Unauthorized(format!(
                "caller {} is not the ledger owner",
                caller
            )));
        }
        Ok(())
    }
}
