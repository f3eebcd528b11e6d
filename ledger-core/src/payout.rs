//! External payout sink
//!
//! The ledger depends on a "move value to recipient" primitive abstracted
//! behind [`PayoutSink`]. The contract is all-or-nothing: the sink either
//! transfers the full amount and returns `Ok`, or transfers nothing and
//! returns an error. Partial transfers do not exist.
//!
//! Sinks resolve synchronously and receive no handle back into the ledger;
//! callers still debit state before invoking a sink (see
//! [`crate::ledger::Ledger`]) so retried and partially-failed paths can only
//! ever observe already-debited balances.

use crate::types::AccountId;
use parking_lot::Mutex;
use thiserror::Error;

/// Payout failure reported by a sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Payout rejected: {message}")]
pub struct PayoutError {
    /// Sink-reported reason
    pub message: String,
}

impl PayoutError {
    /// Create a payout error with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// All-or-nothing external value transfer
pub trait PayoutSink: Send + Sync {
    /// Transfer `amount` to `recipient`, fully or not at all
    fn pay(&self, recipient: &AccountId, amount: u64) -> std::result::Result<(), PayoutError>;
}

/// One payment accepted by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPayment {
    /// Recipient of the payment
    pub recipient: AccountId,

    /// Amount transferred
    pub amount: u64,
}

/// In-memory sink that records accepted payments
///
/// Failures are scripted rather than random: [`RecordingSink::fail_next`]
/// refuses exactly one payment, [`RecordingSink::fail_always`] refuses all of
/// them, so rollback paths can be exercised deterministically.
#[derive(Debug, Default)]
pub struct RecordingSink {
    inner: Mutex<RecordingState>,
}

#[derive(Debug, Default)]
struct RecordingState {
    payments: Vec<RecordedPayment>,
    fail_next: bool,
    fail_always: bool,
}

impl RecordingSink {
    /// Create an empty sink that accepts every payment
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next payment, then resume accepting
    pub fn fail_next(&self) {
        self.inner.lock().fail_next = true;
    }

    /// Refuse every payment while set
    pub fn fail_always(&self, fail: bool) {
        self.inner.lock().fail_always = fail;
    }

    /// All payments accepted so far, in order
    pub fn payments(&self) -> Vec<RecordedPayment> {
        self.inner.lock().payments.clone()
    }

    /// Total amount paid to `recipient`
    pub fn total_paid_to(&self, recipient: &AccountId) -> u64 {
        self.inner
            .lock()
            .payments
            .iter()
            .filter(|p| &p.recipient == recipient)
            .map(|p| p.amount)
            .sum()
    }
}

impl PayoutSink for RecordingSink {
    fn pay(&self, recipient: &AccountId, amount: u64) -> std::result::Result<(), PayoutError> {
        let mut state = self.inner.lock();
        if state.fail_always || std::mem::take(&mut state.fail_next) {
            return Err(PayoutError::new("simulated sink failure"));
        }
        state.payments.push(RecordedPayment {
            recipient: recipient.clone(),
            amount,
        });
        Ok(())
    }
}
