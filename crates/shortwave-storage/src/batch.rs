//! Concurrent soft delete against the SQLite backend.
//!
//! The batch fans out into a fixed pool of worker tasks that validate
//! ids off a shared queue, and fans back in through a single writer task
//! that exclusively owns the transaction. The writer applies the UPDATEs
//! sequentially and decides commit or rollback exactly once, so no task
//! can ever execute against an already-rolled-back transaction. On the
//! first error the writer hangs up its channel, which cancels the
//! remaining work.
//!
//! The whole batch is all-or-nothing: either every id was attempted and
//! the transaction committed, or it was rolled back and the first error
//! seen is reported. No retries; resubmission is the caller's call.

use std::sync::Arc;

use shortwave_core::{Result, StoreError};
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::debug;

use crate::sqlite::{map_sqlx_error, map_tx_error, DELETED_FLAG};

const WORKER_COUNT: usize = 3;

pub(crate) async fn soft_delete(pool: &SqlitePool, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(StoreError::EmptyBatch);
    }

    let tx = pool.begin().await.map_err(map_tx_error)?;

    // Shared work queue sized to the batch, so enqueueing never blocks.
    let (work_tx, work_rx) = mpsc::channel(ids.len());
    for id in ids {
        work_tx
            .send(id.clone())
            .await
            .map_err(|_| StoreError::Transaction("delete work queue closed".to_owned()))?;
    }
    drop(work_tx);
    let work_rx = Arc::new(Mutex::new(work_rx));

    // Validated ids funnel into the writer owning the transaction.
    let (update_tx, update_rx) = mpsc::channel(ids.len());

    let mut workers = JoinSet::new();
    for _ in 0..WORKER_COUNT {
        workers.spawn(validate_worker(Arc::clone(&work_rx), update_tx.clone()));
    }
    drop(update_tx);

    let writer = tokio::spawn(apply_updates(tx, update_rx));

    // Barrier: every worker has finished before the result is decided.
    let mut worker_failure = None;
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            worker_failure.get_or_insert(StoreError::Transaction(format!(
                "delete worker panicked: {err}"
            )));
        }
    }

    let written = writer
        .await
        .map_err(|err| StoreError::Transaction(format!("delete writer panicked: {err}")))?;

    match worker_failure {
        Some(err) => Err(err),
        None => written,
    }
}

/// Pulls ids off the shared queue until it is drained, forwarding each
/// validated unit of work to the writer. Stops early when validation
/// fails (the error itself is forwarded) or when the writer hangs up.
async fn validate_worker(
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    updates: mpsc::Sender<Result<String>>,
) {
    loop {
        let id = { queue.lock().await.recv().await };
        let Some(id) = id else { break };

        let validated = validate(id);
        let failed = validated.is_err();
        if updates.send(validated).await.is_err() || failed {
            break;
        }
    }
}

fn validate(id: String) -> Result<String> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidId("blank id in delete batch".to_owned()));
    }
    Ok(id)
}

/// The single owner of the transaction. Executes one UPDATE per
/// forwarded id, records the first error, and commits or rolls back
/// exactly once after all dispatched work has been attempted or
/// cancelled.
async fn apply_updates(
    mut tx: Transaction<'static, Sqlite>,
    mut updates: mpsc::Receiver<Result<String>>,
) -> Result<()> {
    let mut first_err = None;
    let mut applied = 0usize;

    while let Some(update) = updates.recv().await {
        let executed = match update {
            Ok(id) => sqlx::query("UPDATE links SET is_deleted = ? WHERE hash_url = ?")
                .bind(DELETED_FLAG)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map(drop)
                .map_err(map_sqlx_error),
            Err(err) => Err(err),
        };

        match executed {
            Ok(()) => applied += 1,
            Err(err) => {
                first_err = Some(err);
                break;
            }
        }
    }

    // Hanging up stops the workers from queueing more work; nothing can
    // touch the transaction past this point but this task.
    drop(updates);

    match first_err {
        None => {
            tx.commit().await.map_err(map_tx_error)?;
            debug!(applied, "batch delete committed");
            Ok(())
        }
        Some(err) => {
            tx.rollback().await.map_err(map_tx_error)?;
            debug!(applied, "batch delete rolled back");
            Err(err)
        }
    }
}
