//! Polling runner
//!
//! Drives the keeper on a fixed cadence the way an external scheduler
//! would: check, perform when due, log the outcome, carry on when a cycle
//! fails. The loop itself never breaks on a failed cycle; partial failure
//! is expected and recoverable on the next poll.

use crate::controller::SweepKeeper;
use crate::error::Error;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Shared keeper handle used by the runner
pub type SharedKeeper = Arc<Mutex<SweepKeeper>>;

/// Poll `keeper` every `tick_secs` until `stop` flips to true.
///
/// An [`Error::UpkeepNotDue`] between the check and the perform is an
/// expected race (another caller may have fired first) and is logged at
/// debug level, not treated as a fault.
pub async fn run(keeper: SharedKeeper, tick_secs: u64, mut stop: watch::Receiver<bool>) {
    info!(tick_secs, "keeper runner started");
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(tick_secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = keeper.lock().check_due();
                if !report.due {
                    debug!(
                        pooled = report.pooled_funds,
                        threshold = report.threshold,
                        potential = report.potential_amount,
                        "not due"
                    );
                    continue;
                }
                match keeper.lock().perform() {
                    Ok(record) => {
                        info!(moved = record.moved, "perform cycle completed");
                    }
                    Err(Error::UpkeepNotDue(reason)) => {
                        debug!(%reason, "lost the race to another caller");
                    }
                    Err(err) => {
                        warn!(%err, "perform cycle failed");
                    }
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    info!("keeper runner stopped");
}
