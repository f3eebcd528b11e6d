//! SweepRail Keeper
//!
//! Automation controller that polls a [`ledger_core::Ledger`] and fires
//! eligible sweeps.
//!
//! # Architecture
//!
//! - **Pure due-check**: five predicates re-derived from live ledger state
//!   on every call, nothing cached
//! - **Own rate limit**: the keeper's poll clock advances before the ledger
//!   is asked to sweep, independently of the ledger's cooldown
//! - **Contained failure**: a ledger-side sweep failure becomes a diagnostic
//!   record; the poll cycle still counts as completed

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod controller;
pub mod error;
pub mod runner;

// Re-exports
pub use config::KeeperConfig;
pub use controller::{CheckReport, PerformRecord, SweepKeeper};
pub use error::{Error, Result};
pub use runner::SharedKeeper;
