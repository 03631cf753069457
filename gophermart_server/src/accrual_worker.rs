use gophermart_engine::{
    accrual::HttpAccrualClient,
    reconciliation::{AccrualWorker, Reconciler},
    SqliteDatabase,
};
use log::*;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AccrualConfig;

/// Starts the accrual worker in the background. It keeps reconciling orders until `shutdown` is cancelled, after
/// which the returned handle resolves to the number of cycles that ran.
pub fn start_accrual_worker(
    db: SqliteDatabase,
    client: HttpAccrualClient,
    config: &AccrualConfig,
    shutdown: CancellationToken,
) -> JoinHandle<usize> {
    let reconciler = Reconciler::new(db, client).with_batch_size(config.batch_size);
    let worker = AccrualWorker::new(reconciler, config.poll_interval);
    info!(
        "🕰️ Accrual worker configured for {} (batch size {}, every {:?})",
        config.address, config.batch_size, config.poll_interval
    );
    tokio::spawn(async move { worker.run(shutdown).await })
}
