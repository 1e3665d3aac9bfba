use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;
use zmove_protocol::Operation;

/// Progress snapshot emitted after each sub-operation finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch_id: Uuid,
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
    pub at: DateTime<Utc>,
}

/// Combined result of one batch: per-item outcomes in submission order.
/// The aggregate fails if any sub-operation failed, but only after all of
/// them finished; completed siblings keep their effects either way.
#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub total: usize,
    pub outcomes: Vec<(usize, OpsResult<()>)>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, result)| result.is_ok())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, result)| result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &OpsError)> {
        self.outcomes
            .iter()
            .filter_map(|(index, result)| result.as_ref().err().map(|err| (*index, err)))
    }
}

/// Executes prepared sub-operations concurrently with a bounded in-flight
/// set, one shared cancellation token and `completed/total` progress
/// reporting. No completion order is guaranteed; callers rely only on the
/// combined outcome. A sub-operation's failure never cancels siblings
/// already in flight; items not yet started when the token fires finish as
/// cancelled.
pub async fn run_batch(
    engine: &DataOpsEngine,
    operations: Vec<Operation>,
    token: &CancellationToken,
    progress: Option<mpsc::UnboundedSender<BatchProgress>>,
) -> BatchOutcome {
    let batch_id = Uuid::new_v4();
    let total = operations.len();
    let limit = engine.config().max_concurrent_operations.max(1);
    info!("running batch {} of {} operations", batch_id, total);

    let mut in_flight = stream::iter(operations.into_iter().enumerate().map(
        |(index, operation)| {
            let token = token.clone();
            async move {
                if token.is_cancelled() {
                    return (index, Err(OpsError::Cancelled));
                }
                let result = engine.perform(&operation, &token).await;
                (index, result)
            }
        },
    ))
    .buffer_unordered(limit);

    let mut outcomes: Vec<(usize, OpsResult<()>)> = Vec::with_capacity(total);
    let mut failed = 0;
    while let Some((index, result)) = in_flight.next().await {
        if result.is_err() {
            failed += 1;
        }
        outcomes.push((index, result));
        if let Some(sender) = &progress {
            let _ = sender.send(BatchProgress {
                batch_id,
                completed: outcomes.len(),
                total,
                failed,
                at: Utc::now(),
            });
        }
    }

    outcomes.sort_by_key(|(index, _)| *index);
    if failed > 0 {
        info!("batch {} finished with {} of {} failed", batch_id, failed, total);
    } else {
        info!("batch {} finished successfully", batch_id);
    }
    BatchOutcome {
        batch_id,
        total,
        outcomes,
    }
}
