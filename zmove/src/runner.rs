use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use zmove_protocol::Operation;

/// One strategy in the dispatch chain. Runners are held in a fixed
/// registration order and the first whose `can_run` answers true executes
/// the operation; ordering is the only tie-break mechanism.
#[async_trait]
pub trait OperationRunner: Send + Sync {
    /// Stable name used in logs and the registration-order test.
    fn name(&self) -> &'static str;

    /// Pure predicate over the operation's handles and attribute snapshots.
    /// Must never perform I/O.
    fn can_run(&self, operation: &Operation) -> bool;

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()>;
}

/// Cooperative cancellation check, called immediately before each network
/// call and between iterations of multi-step loops.
pub(crate) fn check_cancelled(token: &CancellationToken) -> OpsResult<()> {
    if token.is_cancelled() {
        Err(OpsError::Cancelled)
    } else {
        Ok(())
    }
}
