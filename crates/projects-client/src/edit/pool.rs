//! Fan item numbers out across a bounded set of workers.
//!
//! Workers share one queue and one cancellation token. The first worker to
//! fail records its error and cancels the token; every worker checks the token
//! before taking the next number, so no new item is started after a failure.
//! Calls already in flight are left to finish, and items added before the
//! failure stay on the board.

use super::item::{ItemContext, WorkUnit};
use super::{Board, FieldMap, ItemRef};
use crate::error::{ClientError, Result};
use crate::graphql::GraphQlClient;
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

struct Worker {
    id: usize,
    client: Arc<dyn GraphQlClient>,
    board: Arc<Board>,
    fields: Arc<FieldMap>,
    queue: Arc<Mutex<mpsc::Receiver<u64>>>,
    cancel: CancellationToken,
    first_error: Arc<OnceLock<ClientError>>,
}

impl Worker {
    async fn run(self) -> Vec<ItemRef> {
        trace!(worker = self.id, "Worker started");
        let ctx = ItemContext {
            client: self.client.as_ref(),
            repository: &self.board.repository,
            board_id: &self.board.id,
            fields: &self.fields,
        };

        let mut added = Vec::new();
        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                number = async { self.queue.lock().await.recv().await } => number,
            };

            // Cancellation may have raced with the receive.
            let Some(number) = next.filter(|_| !self.cancel.is_cancelled()) else {
                break;
            };

            match WorkUnit::new(number).run(ctx).await {
                Ok(item) => added.push(item),
                Err(err) => {
                    debug!(worker = self.id, number, error = %err, "Cancelling remaining items");
                    // Only the first error is kept.
                    let _ = self.first_error.set(err);
                    self.cancel.cancel();
                    break;
                }
            }
        }

        trace!(worker = self.id, added = added.len(), "Worker stopped");
        added
    }
}

/// Gather a finished worker's items; a panicked worker fails the whole batch.
fn collect(
    joined: std::result::Result<Vec<ItemRef>, JoinError>,
    added: &mut Vec<ItemRef>,
    first_error: &OnceLock<ClientError>,
    cancel: &CancellationToken,
) {
    match joined {
        Ok(items) => added.extend(items),
        Err(err) => {
            debug!(error = %err, "Worker failed");
            let _ = first_error.set(ClientError::WorkerFailed(err.to_string()));
            cancel.cancel();
        }
    }
}

/// Add `numbers` to the board using up to `worker_count` concurrent workers.
///
/// Each number goes through reference resolution, attachment, and field
/// updates in that order. Numbers are queued in the order given but may be
/// completed in any order; the returned items follow the order given.
///
/// # Errors
/// Returns the first error any worker hit. Items added before it are not
/// removed again.
pub async fn add_items(
    client: Arc<dyn GraphQlClient>,
    board: Arc<Board>,
    numbers: &[u64],
    fields: Arc<FieldMap>,
    worker_count: usize,
) -> Result<Vec<ItemRef>> {
    if numbers.is_empty() {
        return Ok(Vec::new());
    }

    let workers = worker_count.clamp(1, numbers.len());
    debug!(items = numbers.len(), workers, "Adding items");

    let (tx, rx) = mpsc::channel::<u64>(1);
    let queue = Arc::new(Mutex::new(rx));
    let cancel = CancellationToken::new();
    let first_error = Arc::new(OnceLock::new());

    let mut tasks = JoinSet::new();
    for id in 0..workers {
        let worker = Worker {
            id,
            client: Arc::clone(&client),
            board: Arc::clone(&board),
            fields: Arc::clone(&fields),
            queue: Arc::clone(&queue),
            cancel: cancel.clone(),
            first_error: Arc::clone(&first_error),
        };
        tasks.spawn(worker.run());
    }
    // Only workers hold the receiver, so sends fail once they are all gone.
    drop(queue);

    let mut added = Vec::with_capacity(numbers.len());
    let mut pending = numbers.iter().copied().peekable();
    while let Some(&number) = pending.peek() {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(joined) = tasks.join_next() => {
                collect(joined, &mut added, &first_error, &cancel);
            }
            sent = tx.send(number) => {
                if sent.is_err() {
                    break;
                }
                pending.next();
            }
        }
    }
    drop(tx);

    while let Some(joined) = tasks.join_next().await {
        collect(joined, &mut added, &first_error, &cancel);
    }

    if let Some(err) = Arc::into_inner(first_error).and_then(OnceLock::into_inner) {
        return Err(err);
    }

    added.sort_by_key(|item| numbers.iter().position(|n| *n == item.number));
    Ok(added)
}
