//! Core types for the sweep ledger
//!
//! All types are designed for:
//! - Deterministic behavior (integer smallest-unit amounts)
//! - Memory safety (no unsafe code)
//! - Structured logging (serde on every emitted record)

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (opaque key)
///
/// The empty string is reserved as the null identity and is rejected as a
/// transfer recipient and as a sweep target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved null identity
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Whether this is the reserved null identity
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reason a sweep attempt was skipped without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Sweeping disabled or no target configured
    Disabled,
    /// Cooldown since the last successful sweep has not elapsed
    Cooldown,
    /// Pooled funds below the trigger threshold
    BelowThreshold,
    /// Computed sweep amount below the minimum transfer floor
    BelowMinimum,
}

impl SkipReason {
    /// Stable label used in events and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::Cooldown => "cooldown",
            SkipReason::BelowThreshold => "below threshold",
            SkipReason::BelowMinimum => "amount below minimum",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one sweep attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepOutcome {
    /// Payout succeeded; `amount` left the pool
    Swept {
        /// Amount moved to the sweep target
        amount: u64,
    },
    /// A trigger condition did not hold; nothing moved
    Skipped(SkipReason),
    /// Payout sink refused the transfer; nothing moved
    Failed {
        /// Amount that was attempted
        amount: u64,
        /// Sink-reported reason
        reason: String,
    },
}

impl SweepOutcome {
    /// Whether funds actually moved
    pub fn is_swept(&self) -> bool {
        matches!(self, SweepOutcome::Swept { .. })
    }
}

/// Structured record of one sweep attempt
///
/// Emitted for external logging only; never stored and never consulted by
/// control logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEvent {
    /// Unique event ID
    pub event_id: Uuid,

    /// Clock reading when the attempt ran (unix seconds)
    pub timestamp: u64,

    /// Sweep target configured at the time of the attempt
    pub recipient: Option<AccountId>,

    /// Outcome of the attempt
    pub outcome: SweepOutcome,
}
