use std::{panic::AssertUnwindSafe, time::Duration};

use futures_util::FutureExt;
use log::*;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
    accrual::AccrualClient,
    db::traits::OrderManagement,
    reconciliation::{CycleReport, Reconciler},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the [`Reconciler`] on a fixed schedule.
pub struct AccrualWorker<B, C> {
    reconciler: Reconciler<B, C>,
    interval: Duration,
}

impl<B, C> AccrualWorker<B, C>
where
    B: OrderManagement,
    C: AccrualClient,
{
    pub fn new(reconciler: Reconciler<B, C>, interval: Duration) -> Self {
        Self { reconciler, interval }
    }

    pub fn reconciler(&self) -> &Reconciler<B, C> {
        &self.reconciler
    }

    /// Runs a reconciliation cycle on every tick until `shutdown` is cancelled.
    ///
    /// Each cycle gets its own cancellation token, so a shutdown never interrupts a cycle that has already started.
    /// It only stops new cycles from starting. If a cycle takes longer than the interval, the next tick is delayed
    /// rather than fired in a burst. Failed and panicking cycles are logged and the schedule carries on.
    ///
    /// Returns the number of cycles that ran.
    pub async fn run(&self, shutdown: CancellationToken) -> usize {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Accrual worker started. Reconciling every {:?}", self.interval);
        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {},
            }
            let cycle_token = CancellationToken::new();
            match AssertUnwindSafe(self.reconciler.run_cycle(&cycle_token)).catch_unwind().await {
                Ok(Ok(report)) => log_report(&report),
                Ok(Err(e)) => error!("🕰️ Reconciliation cycle failed: {e}"),
                Err(_) => error!("🕰️ Reconciliation cycle panicked"),
            }
            cycles += 1;
        }
        info!("🕰️ Accrual worker stopped after {cycles} cycles");
        cycles
    }
}

fn log_report(report: &CycleReport) {
    if report.selected == 0 {
        trace!("🕰️ Nothing to reconcile");
    } else {
        info!("🕰️ Reconciliation cycle complete: {report}");
    }
}
