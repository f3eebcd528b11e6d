//! Keeper daemon binary
//!
//! Wires a ledger and keeper from configuration and drives the polling
//! runner until interrupted.

use anyhow::Context;
use keeper::{runner, KeeperConfig, SweepKeeper};
use ledger_core::{LedgerConfig, RecordingSink, SystemClock};
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting SweepRail keeper daemon");

    // Load configuration
    let ledger_config = match std::env::var("LEDGER_CONFIG") {
        Ok(path) => LedgerConfig::from_file(path).context("loading ledger config file")?,
        Err(_) => LedgerConfig::from_env().context("reading ledger environment")?,
    };
    let keeper_config = match std::env::var("KEEPER_CONFIG") {
        Ok(path) => KeeperConfig::from_file(path).context("loading keeper config file")?,
        Err(_) => KeeperConfig::from_env().context("reading keeper environment")?,
    };
    let tick_secs = keeper_config.poll_interval_secs;

    let clock = Arc::new(SystemClock);
    let sink = Arc::new(RecordingSink::new());
    let (_ledger, keeper) =
        SweepKeeper::bootstrap(ledger_config, keeper_config, sink, clock)?;
    let keeper = Arc::new(Mutex::new(keeper));
    tracing::info!("Keeper bound to ledger");

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let runner = tokio::spawn(runner::run(keeper, tick_secs, stop_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down keeper daemon");
    stop_tx.send(true)?;
    runner.await?;

    Ok(())
}
