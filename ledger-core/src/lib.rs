//! SweepRail Ledger Core
//!
//! Pooled-funds account ledger with policy-driven automatic sweeps.
//!
//! # Architecture
//!
//! - **Single Writer**: one mutex per ledger; every operation runs to completion
//!   before another may observe state
//! - **State Before Payout**: balances are debited before the external sink is
//!   invoked, and restored if the sink refuses
//! - **Halving Sweeps**: each sweep moves half of the pool, floor-divided, so the
//!   remainder decays instead of draining
//!
//! # Invariants
//!
//! - Claims lockstep: sum of account balances tracks pooled funds across
//!   deposit/withdraw/transfer; only sweeps decouple them
//! - `last_sweep_time` is monotonically non-decreasing
//! - Every rejected operation leaves state untouched

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod payout;
pub mod policy;
pub mod types;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LedgerConfig, SweepSettings};
pub use error::{Error, Result};
pub use ledger::{Ledger, SharedLedger};
pub use metrics::Metrics;
pub use payout::{PayoutError, PayoutSink, RecordedPayment, RecordingSink};
pub use policy::{SweepDecision, SweepPolicy};
pub use types::{AccountId, SkipReason, SweepEvent, SweepOutcome};
