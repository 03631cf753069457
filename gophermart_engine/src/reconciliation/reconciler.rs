use std::{fmt::Display, panic::AssertUnwindSafe};

use futures_util::{future::join_all, FutureExt};
use log::*;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    accrual::{AccrualClient, AccrualStatus},
    db::traits::OrderManagement,
    db_types::{Money, OrderId, OrderStatusType},
};

/// The number of orders claimed per cycle unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Could not select orders for reconciliation: {0}")]
    BatchSelectionFailed(String),
}

/// What happened to a single order during a reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Another worker claimed the order first, or it is no longer `New`.
    Skipped,
    /// The order is now `Processed` and the accrual has been credited.
    Processed(Money),
    /// The order is now `Invalid`.
    Invalid,
    /// The accrual service has no final answer yet. The order went back to `New`.
    Pending(AccrualStatus),
    /// The accrual service could not be reached, or did not answer sensibly. The order went back to `New`.
    FetchFailed,
    /// A storage operation failed. If the order was claimed, it went back to `New`.
    StorageError,
    /// The reconciliation of this order panicked. The order went back to `New`.
    Panicked,
}

impl OrderOutcome {
    /// `true` if the order reached a terminal status in this cycle.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Processed(_) | Self::Invalid)
    }
}

/// Tally of the outcomes of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub selected: usize,
    pub skipped: usize,
    pub processed: usize,
    pub invalid: usize,
    pub pending: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: OrderOutcome) {
        match outcome {
            OrderOutcome::Skipped => self.skipped += 1,
            OrderOutcome::Processed(_) => self.processed += 1,
            OrderOutcome::Invalid => self.invalid += 1,
            OrderOutcome::Pending(_) => self.pending += 1,
            OrderOutcome::FetchFailed | OrderOutcome::StorageError | OrderOutcome::Panicked => self.failed += 1,
        }
    }
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} selected, {} skipped, {} processed, {} invalid, {} pending, {} failed",
            self.selected, self.skipped, self.processed, self.invalid, self.pending, self.failed
        )
    }
}

/// `Reconciler` moves submitted orders towards a terminal status by asking the accrual service about them.
///
/// One cycle
/// 1. selects up to `batch_size` of the oldest `New` orders,
/// 2. claims each of them by moving it from `New` to `Processing`. Only one worker can win this compare-and-set, so
///    an order is never in flight twice,
/// 3. fetches the accrual status of every claimed order concurrently, and
/// 4. applies the result: `INVALID` and `PROCESSED` are final and are written to the database (a `PROCESSED` order
///    credits its owner in the same transaction). Anything else moves the order back to `New`, so that a later cycle
///    picks it up again.
///
/// Errors in one order never affect the others. Every claimed order that does not reach a terminal status is
/// reverted to `New`, including when its reconciliation panics.
pub struct Reconciler<B, C> {
    db: B,
    client: C,
    batch_size: usize,
}

impl<B, C> Reconciler<B, C>
where
    B: OrderManagement,
    C: AccrualClient,
{
    pub fn new(db: B, client: C) -> Self {
        Self { db, client, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs a single reconciliation cycle and waits for every order in it to finish.
    ///
    /// `cancel` is handed to the accrual client. Cancelling it makes orders that are still waiting for the rate
    /// limiter give up (and revert to `New`). It never interrupts a request that is already in flight.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleReport, ReconciliationError> {
        let order_ids = self
            .db
            .fetch_order_ids_with_status(OrderStatusType::New, self.batch_size)
            .await
            .map_err(|e| ReconciliationError::BatchSelectionFailed(e.to_string()))?;
        let mut report = CycleReport { selected: order_ids.len(), ..Default::default() };
        if order_ids.is_empty() {
            trace!("🔄️ No orders to reconcile");
            return Ok(report);
        }
        debug!("🔄️ Reconciling {} orders", order_ids.len());
        let tasks = order_ids.iter().map(|order_id| self.reconcile_order(order_id, cancel));
        let outcomes = join_all(tasks).await;
        outcomes.into_iter().for_each(|o| report.record(o));
        Ok(report)
    }

    /// Claims, settles and (if necessary) reverts a single order.
    ///
    /// A panic while claiming leaves it unclear whether the claim was written, so the order is released just as if
    /// it had been claimed.
    pub async fn reconcile_order(&self, order_id: &OrderId, cancel: &CancellationToken) -> OrderOutcome {
        let claim = self.db.update_order_status(order_id, OrderStatusType::New, OrderStatusType::Processing);
        match AssertUnwindSafe(claim).catch_unwind().await {
            Ok(Ok(true)) => trace!("🔄️ Claimed order {order_id}"),
            Ok(Ok(false)) => {
                debug!("🔄️ Order {order_id} was claimed elsewhere. Skipping");
                return OrderOutcome::Skipped;
            },
            Ok(Err(e)) => {
                error!("🔄️ Could not claim order {order_id}: {e}");
                return OrderOutcome::StorageError;
            },
            Err(_) => {
                error!("🔄️ Claiming order {order_id} panicked. Releasing it");
                self.revert(order_id).await;
                return OrderOutcome::Panicked;
            },
        }
        let outcome = match AssertUnwindSafe(self.settle(order_id, cancel)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("🔄️ Reconciliation of order {order_id} panicked");
                OrderOutcome::Panicked
            },
        };
        if !outcome.is_settled() {
            self.revert(order_id).await;
        }
        outcome
    }

    /// Fetches the accrual status of a claimed order and writes terminal results.
    async fn settle(&self, order_id: &OrderId, cancel: &CancellationToken) -> OrderOutcome {
        let response = match self.client.fetch_status(order_id, cancel).await {
            Ok(r) => r,
            Err(e) => {
                warn!("🔄️ Could not fetch the accrual status of order {order_id}: {e}");
                return OrderOutcome::FetchFailed;
            },
        };
        if &response.order != order_id {
            warn!("🔄️ Asked the accrual service about {order_id}, but the answer is for {}", response.order);
            return OrderOutcome::FetchFailed;
        }
        match response.status {
            AccrualStatus::Invalid => {
                let update =
                    self.db.update_order_status(order_id, OrderStatusType::Processing, OrderStatusType::Invalid);
                match update.await {
                    Ok(true) => {
                        info!("🔄️ Order {order_id} is invalid");
                        OrderOutcome::Invalid
                    },
                    Ok(false) => {
                        error!("🔄️ Order {order_id} was no longer Processing when marking it invalid");
                        OrderOutcome::StorageError
                    },
                    Err(e) => {
                        error!("🔄️ Could not mark order {order_id} as invalid: {e}");
                        OrderOutcome::StorageError
                    },
                }
            },
            AccrualStatus::Processed => {
                let accrual = response.accrual.unwrap_or(Money::ZERO);
                if accrual.is_negative() {
                    warn!("🔄️ The accrual service reported a negative accrual for {order_id}: {accrual}");
                    return OrderOutcome::FetchFailed;
                }
                match self.db.add_accrual(order_id, accrual).await {
                    Ok(order) => {
                        info!("🔄️ Order {order_id} processed. User {} earned {accrual} points", order.user_id);
                        OrderOutcome::Processed(accrual)
                    },
                    Err(e) => {
                        error!("🔄️ Could not credit the accrual for order {order_id}: {e}");
                        OrderOutcome::StorageError
                    },
                }
            },
            status @ (AccrualStatus::Registered | AccrualStatus::Processing | AccrualStatus::Unknown) => {
                debug!("🔄️ Order {order_id} is {status} at the accrual service. Will check again later");
                OrderOutcome::Pending(status)
            },
        }
    }

    async fn revert(&self, order_id: &OrderId) {
        let revert = self.db.update_order_status(order_id, OrderStatusType::Processing, OrderStatusType::New);
        match AssertUnwindSafe(revert).catch_unwind().await {
            Ok(Ok(true)) => trace!("🔄️ Order {order_id} is New again"),
            Ok(Ok(false)) => warn!("🔄️ Order {order_id} was not Processing when reverting it"),
            Ok(Err(e)) => error!("🔄️ Could not revert order {order_id} to New. It will stay Processing: {e}"),
            Err(_) => error!("🔄️ Reverting order {order_id} to New panicked. It will stay Processing"),
        }
    }
}
