use super::{as_move_copy, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zmove_protocol::{
    ConnectionConfig, CopyDatasetToUss, CreateUssItem, DatasetAttributes, FileAttributes,
    FileHandle, FileMode, MoveCopyOperation, Operation, RemoteResponse, Requester, UssAttributes,
    UssItemKind,
};

/// Shared multi-member protocol: refresh the member listing, prepare the
/// destination directory, copy every member, and undo the directory when
/// the loop fails partway through. The per-member copy step is the only
/// part that differs between the same-system and cross-system variants.
///
/// The post-move deletion of the source dataset is best-effort: once every
/// member landed, a failing cleanup is logged but never overturns the
/// transfer.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn proceed_pds_transfer<F, Fut>(
    engine: &DataOpsEngine,
    op: &MoveCopyOperation,
    library: &DatasetAttributes,
    destination: &UssAttributes,
    listing_connection: ConnectionConfig,
    destination_connection: ConnectionConfig,
    token: &CancellationToken,
    copy_member: F,
) -> OpsResult<()>
where
    F: Fn(ConnectionConfig, String, String) -> Fut,
    Fut: Future<Output = OpsResult<RemoteResponse>>,
{
    // The copy set must be current, never a cached listing.
    check_cancelled(token)?;
    let members = engine
        .client()
        .list_members(&listing_connection, &library.name)
        .await?;

    let destination_path = format!(
        "{}/{}",
        destination.path.trim_end_matches('/'),
        op.effective_name()
    );

    if op.force_overwriting {
        check_cancelled(token)?;
        let response = engine
            .client()
            .delete_uss_item(&destination_connection, &destination_path, true)
            .await?;
        if !response.is_success() && response.status != 404 {
            return Err(OpsError::RemoteCallFailed {
                call: format!("overwrite directory '{}'", destination_path),
                connection: destination_connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
    }

    check_cancelled(token)?;
    let response = engine
        .client()
        .create_uss_item(
            &destination_connection,
            &destination_path,
            &CreateUssItem {
                kind: UssItemKind::Directory,
                mode: destination.file_mode.unwrap_or(FileMode::ALL),
            },
        )
        .await?;
    if !response.is_success() {
        return Err(OpsError::RemoteCallFailed {
            call: format!("create directory '{}'", destination_path),
            connection: destination_connection.name.clone(),
            status: response.status,
            body: response.body,
        });
    }

    let created_dir = FileHandle::remote(&destination_path, true);
    engine.store().register(
        &created_dir,
        FileAttributes::Uss(UssAttributes {
            path: destination_path.clone(),
            is_directory: true,
            symlink_target: None,
            file_mode: destination.file_mode,
            requesters: vec![Requester::new(
                destination_connection.clone(),
                destination_path.clone(),
            )],
        }),
    );

    for member in &members {
        if token.is_cancelled() {
            return Err(rollback(
                engine,
                &destination_connection,
                &destination_path,
                OpsError::Cancelled,
            )
            .await);
        }
        let outcome = copy_member(
            destination_connection.clone(),
            member.clone(),
            destination_path.clone(),
        )
        .await;
        let cause = match outcome {
            Ok(response) if response.is_success() => continue,
            Ok(response) => OpsError::RemoteCallFailed {
                call: format!(
                    "{} '{}({})' to '{}'",
                    op.verb(),
                    library.name,
                    member,
                    destination_path
                ),
                connection: destination_connection.name.clone(),
                status: response.status,
                body: response.body,
            },
            Err(err) => err,
        };
        return Err(rollback(engine, &destination_connection, &destination_path, cause).await);
    }

    if op.is_move {
        match engine
            .client()
            .delete_dataset(&listing_connection, &library.name)
            .await
        {
            Ok(response) if response.is_success() => {
                engine.store().apply_deleted(&op.source);
            }
            Ok(response) => {
                warn!(
                    "could not delete source dataset '{}' after move: status {}",
                    library.name, response.status
                );
            }
            Err(err) => {
                warn!(
                    "could not delete source dataset '{}' after move: {}",
                    library.name, err
                );
            }
        }
    }

    Ok(())
}

/// Deletes the partially populated destination directory and folds the
/// rollback outcome into the surfaced error. Cancellation with a clean
/// rollback surfaces as plain `Cancelled`.
async fn rollback(
    engine: &DataOpsEngine,
    connection: &ConnectionConfig,
    destination_path: &str,
    cause: OpsError,
) -> OpsError {
    info!("attempting rollback of '{}'", destination_path);
    let rollback_ok = match engine
        .client()
        .delete_uss_item(connection, destination_path, true)
        .await
    {
        Ok(response) => response.is_success(),
        Err(err) => {
            warn!("rollback delete of '{}' failed: {}", destination_path, err);
            false
        }
    };
    if rollback_ok {
        engine
            .store()
            .apply_deleted(&FileHandle::remote(destination_path, true));
    }
    match cause {
        OpsError::Cancelled if rollback_ok => OpsError::Cancelled,
        cause => cause.with_rollback_outcome(rollback_ok),
    }
}

/// Copies a whole partitioned dataset into a USS directory on the same
/// system, one copy-to-USS call per member.
pub struct PdsToUssFolderMover;

#[async_trait]
impl OperationRunner for PdsToUssFolderMover {
    fn name(&self) -> &'static str {
        "pds-to-uss-folder"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        matches!(
            &op.source_attributes,
            Some(FileAttributes::Dataset(attrs)) if attrs.is_library()
        ) && op.source.is_directory
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
            && !op.common_connections().is_empty()
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let Some(FileAttributes::Dataset(library)) = &op.source_attributes else {
            unreachable!("guarded by can_run");
        };
        let Some(FileAttributes::Uss(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            info!(
                "Trying to {} PDS '{}' to USS folder '{}' on {}",
                op.verb(),
                library.name,
                destination.path,
                connection
            );
            proceed_pds_transfer(
                engine,
                op,
                library,
                destination,
                connection.clone(),
                connection,
                token,
                |conn, member, destination_path| async move {
                    engine
                        .client()
                        .copy_to_uss(
                            &conn,
                            &destination_path,
                            &CopyDatasetToUss {
                                dataset: library.name.clone(),
                                member: Some(member.to_uppercase()),
                            },
                        )
                        .await
                },
            )
            .await
        })
        .await
    }
}
