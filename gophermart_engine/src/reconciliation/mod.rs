//! The order accrual reconciliation pipeline.
//!
//! [`AccrualWorker`] ticks on a fixed interval and asks the [`Reconciler`] to run one cycle per tick. The reconciler
//! claims pending orders, asks the accrual service about them, and settles the answers in the ledger.
mod reconciler;
mod worker;

pub use reconciler::{CycleReport, OrderOutcome, ReconciliationError, Reconciler, DEFAULT_BATCH_SIZE};
pub use worker::{AccrualWorker, DEFAULT_POLL_INTERVAL};
