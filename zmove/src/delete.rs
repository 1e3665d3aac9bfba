use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{FileAttributes, Operation, RemoteResponse, Requester};

/// Deletes a dataset, member or USS object. The object may be reachable
/// through several connections; each requester is tried in order and the
/// first success wins. The last error surfaces only when every requester
/// failed.
pub struct DeleteRunner;

async fn try_requesters<'a, F, Fut>(
    requesters: &'a [Requester],
    token: &CancellationToken,
    call: F,
) -> OpsResult<()>
where
    F: Fn(&'a Requester) -> Fut,
    Fut: std::future::Future<Output = OpsResult<RemoteResponse>>,
{
    let mut last_error: Option<OpsError> = None;
    for requester in requesters {
        check_cancelled(token)?;
        match call(requester).await {
            Ok(response) if response.is_success() => return Ok(()),
            Ok(response) => {
                last_error = Some(OpsError::RemoteCallFailed {
                    call: format!("delete '{}'", requester.remote_name),
                    connection: requester.connection.name.clone(),
                    status: response.status,
                    body: response.body,
                });
            }
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or_else(|| OpsError::MissingCollaborator {
        collaborator: "connection".to_string(),
        file: "<unknown>".to_string(),
    }))
}

#[async_trait]
impl OperationRunner for DeleteRunner {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        matches!(operation, Operation::Delete(_))
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let Operation::Delete(op) = operation else {
            unreachable!("guarded by can_run");
        };
        info!("Deleting '{}'", op.file.path);

        match &op.attributes {
            FileAttributes::Dataset(attrs) => {
                try_requesters(&attrs.requesters, token, |requester| async move {
                    engine
                        .client()
                        .delete_dataset(&requester.connection, &attrs.name)
                        .await
                })
                .await?;
            }
            FileAttributes::Member(attrs) => {
                try_requesters(&attrs.library.requesters, token, |requester| async move {
                    engine
                        .client()
                        .delete_dataset_member(&requester.connection, &attrs.library.name, &attrs.name)
                        .await
                })
                .await?;
            }
            FileAttributes::Uss(attrs) => {
                try_requesters(&attrs.requesters, token, |requester| async move {
                    engine
                        .client()
                        .delete_uss_item(&requester.connection, &attrs.path, true)
                        .await
                })
                .await?;
            }
        }

        engine.store().apply_deleted(&op.file);
        Ok(())
    }
}
