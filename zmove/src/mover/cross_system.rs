use super::{
    as_move_copy, derive_member_name, expect_success, first_connection, pds_to_uss,
    reject_symlink,
};
use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use crate::sync::{detect_content_type, normalize_text_records, StagedContent};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zmove_protocol::{
    ContentType, CreateUssItem, DeleteOperation, FileAttributes, FileHandle, FileMode,
    FileOrigin, MoveCopyOperation, Operation, Requester, UssAttributes, UssItemKind,
    TRUNCATION_MESSAGE,
};

/// Pulls the source's current bytes into the local representation via the
/// content synchronizer, or straight from disk for plain local files.
/// Fails fast, before any network call, when no synchronizer accepts a
/// file that needs staging.
async fn stage_source(
    engine: &DataOpsEngine,
    op: &MoveCopyOperation,
    token: &CancellationToken,
) -> OpsResult<StagedContent> {
    if op.source.origin == FileOrigin::Local {
        let bytes = tokio::fs::read(&op.source.path).await?;
        let content_type = detect_content_type(&bytes);
        return Ok(StagedContent { bytes, content_type });
    }
    if !engine.synchronizer().accepts(&op.source) {
        return Err(OpsError::MissingCollaborator {
            collaborator: "content synchronizer".to_string(),
            file: op.source.name.clone(),
        });
    }
    engine.synchronizer().fetch(&op.source, token).await
}

/// Deletes the source after a successful cross-system upload. Remote
/// sources go back through the dispatcher so the right delete runner
/// applies; local sources are removed from disk.
async fn delete_source(
    engine: &DataOpsEngine,
    op: &MoveCopyOperation,
    token: &CancellationToken,
) -> OpsResult<()> {
    if op.source.origin == FileOrigin::Local {
        if op.source.is_directory {
            tokio::fs::remove_dir_all(&op.source.path).await?;
        } else {
            tokio::fs::remove_file(&op.source.path).await?;
        }
        return Ok(());
    }
    let attributes = op
        .source_attributes
        .clone()
        .expect("remote source carries attributes");
    engine
        .perform(
            &Operation::Delete(DeleteOperation {
                file: op.source.clone(),
                attributes,
            }),
            token,
        )
        .await
}

/// Moves or copies a member, sequential dataset or USS file into a USS
/// directory on a system that shares no connection with the source: stage
/// the bytes locally, then upload them through the destination connection.
pub struct CrossSystemFileToUssDirMover;

#[async_trait]
impl OperationRunner for CrossSystemFileToUssDirMover {
    fn name(&self) -> &'static str {
        "cross-system-file-to-uss-dir"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        !op.source.is_directory
            && op.destination.is_directory
            && matches!(
                op.source_attributes,
                Some(FileAttributes::Member(_))
                    | Some(FileAttributes::Uss(_))
                    | Some(FileAttributes::Dataset(_))
            )
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
            && op.source.origin == FileOrigin::Remote
            && op.destination.origin == FileOrigin::Remote
            && op.common_connections().is_empty()
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let destination_attributes = op
            .destination_attributes
            .as_ref()
            .expect("guarded by can_run");
        let FileAttributes::Uss(destination) = destination_attributes else {
            unreachable!("guarded by can_run");
        };

        reject_symlink(op.source_attributes.as_ref())?;
        let staged = stage_source(engine, op, token).await?;

        let connection = first_connection(destination_attributes)?;
        let to_path = format!(
            "{}/{}",
            destination.path.trim_end_matches('/'),
            op.effective_name()
        );
        info!("Uploading staged '{}' to '{}'", op.source.path, to_path);

        check_cancelled(token)?;
        let response = engine
            .client()
            .write_uss_file(&connection, &to_path, staged.bytes, staged.content_type)
            .await?;
        expect_success(
            response,
            &[],
            format!("upload '{}' to '{}'", op.source.path, to_path),
            &connection,
        )?;

        if op.is_move {
            delete_source(engine, op, token).await?;
        }
        Ok(())
    }
}

/// Moves or copies a USS file or dataset member into a partitioned dataset
/// on a system that shares no connection with the source. Text content is
/// normalized to LF records with a trailing newline before upload.
pub struct CrossSystemFileToPdsMover;

#[async_trait]
impl OperationRunner for CrossSystemFileToPdsMover {
    fn name(&self) -> &'static str {
        "cross-system-file-to-pds"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        let source_matches = match &op.source_attributes {
            None => op.source.origin == FileOrigin::Local,
            Some(FileAttributes::Member(_)) => op.common_connections().is_empty(),
            Some(FileAttributes::Uss(attrs)) => {
                !attrs.is_directory && op.common_connections().is_empty()
            }
            Some(FileAttributes::Dataset(_)) => false,
        };
        source_matches
            && !op.source.is_directory
            && op.destination.is_directory
            && op.destination.origin == FileOrigin::Remote
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Dataset(attrs)) if attrs.is_library()
            )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let destination_attributes = op
            .destination_attributes
            .as_ref()
            .expect("guarded by can_run");
        let FileAttributes::Dataset(destination) = destination_attributes else {
            unreachable!("guarded by can_run");
        };

        reject_symlink(op.source_attributes.as_ref())?;
        let staged = stage_source(engine, op, token).await?;

        let connection = first_connection(destination_attributes)?;
        let member_name = derive_member_name(&op.source.name, op.new_name.as_deref());
        let content = match staged.content_type {
            ContentType::Text => normalize_text_records(staged.bytes),
            ContentType::Binary => staged.bytes,
        };
        let call = format!(
            "upload '{}' to '{}({})'",
            op.source.path, destination.name, member_name
        );

        check_cancelled(token)?;
        let response = engine
            .client()
            .write_dataset_member(
                &connection,
                &destination.name,
                &member_name,
                content,
                staged.content_type,
            )
            .await?;
        expect_success(response, &[TRUNCATION_MESSAGE], call, &connection)?;

        if op.is_move {
            if let Err(delete_error) = delete_source(engine, op, token).await {
                warn!("can't delete source '{}' after move", op.source.path);
                // Undo the upload so the failed move does not leave a copy.
                let rollback_ok = match engine
                    .client()
                    .delete_dataset_member(&connection, &destination.name, &member_name)
                    .await
                {
                    Ok(response) => response.is_success(),
                    Err(_) => false,
                };
                return Err(delete_error.with_rollback_outcome(rollback_ok));
            }
        }
        Ok(())
    }
}

/// Copies a USS directory tree to a USS directory on a system that shares
/// no connection with the source: create the destination directory, then
/// re-dispatch one operation per listed child so each takes its own
/// cross-system mover (files stage, nested directories recurse).
pub struct CrossSystemUssDirMover;

#[async_trait]
impl OperationRunner for CrossSystemUssDirMover {
    fn name(&self) -> &'static str {
        "cross-system-uss-dir"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        op.source.is_directory
            && matches!(
                &op.source_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
            && op.destination.is_directory
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
            && op.source.origin == FileOrigin::Remote
            && op.destination.origin == FileOrigin::Remote
            && op.common_connections().is_empty()
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let source_attributes = op.source_attributes.as_ref().expect("guarded by can_run");
        let destination_attributes = op
            .destination_attributes
            .as_ref()
            .expect("guarded by can_run");
        let (FileAttributes::Uss(source), FileAttributes::Uss(destination)) =
            (source_attributes, destination_attributes)
        else {
            unreachable!("guarded by can_run");
        };

        let source_connection = first_connection(source_attributes)?;
        let connection = first_connection(destination_attributes)?;
        let directory_path = format!(
            "{}/{}",
            destination.path.trim_end_matches('/'),
            op.effective_name()
        );
        info!(
            "Trying to {} USS directory '{}' to '{}'",
            op.verb(),
            source.path,
            directory_path
        );

        if op.force_overwriting {
            check_cancelled(token)?;
            let response = engine
                .client()
                .delete_uss_item(&connection, &directory_path, true)
                .await?;
            if !response.is_success() && response.status != 404 {
                return Err(OpsError::RemoteCallFailed {
                    call: format!("overwrite directory '{}'", directory_path),
                    connection: connection.name.clone(),
                    status: response.status,
                    body: response.body,
                });
            }
        }

        check_cancelled(token)?;
        let response = engine
            .client()
            .create_uss_item(
                &connection,
                &directory_path,
                &CreateUssItem {
                    kind: UssItemKind::Directory,
                    mode: FileMode::ALL,
                },
            )
            .await?;
        expect_success(
            response,
            &[],
            format!("create directory '{}'", directory_path),
            &connection,
        )?;

        let created_attributes = UssAttributes {
            path: directory_path.clone(),
            is_directory: true,
            symlink_target: None,
            file_mode: Some(FileMode::ALL),
            requesters: vec![Requester::new(connection.clone(), directory_path.clone())],
        };
        let created_dir = FileHandle::remote(&directory_path, true);
        engine
            .store()
            .register(&created_dir, FileAttributes::Uss(created_attributes.clone()));

        check_cancelled(token)?;
        let children = engine
            .client()
            .list_uss_children(&source_connection, &source.path)
            .await?;
        for child in children {
            check_cancelled(token)?;
            let child_path = format!("{}/{}", source.path.trim_end_matches('/'), child.name);
            let child_operation = Operation::MoveCopy(MoveCopyOperation {
                source: FileHandle::remote(&child_path, child.is_directory),
                source_attributes: Some(FileAttributes::Uss(UssAttributes {
                    path: child_path.clone(),
                    is_directory: child.is_directory,
                    symlink_target: child.symlink_target.clone(),
                    file_mode: None,
                    requesters: source
                        .requesters
                        .iter()
                        .map(|r| Requester::new(r.connection.clone(), child_path.clone()))
                        .collect(),
                })),
                destination: created_dir.clone(),
                destination_attributes: Some(FileAttributes::Uss(created_attributes.clone())),
                is_move: false,
                force_overwriting: false,
                new_name: None,
                unit: op.unit.clone(),
            });
            engine.perform(&child_operation, token).await?;
        }

        if op.is_move {
            delete_source(engine, op, token).await?;
        }
        Ok(())
    }
}

/// Copies a whole partitioned dataset into a USS directory on a system
/// that shares no connection with the source. Reuses the multi-member
/// protocol with rollback; the per-member step stages the member content
/// and uploads it through the destination connection.
pub struct CrossSystemPdsToUssDirMover;

#[async_trait]
impl OperationRunner for CrossSystemPdsToUssDirMover {
    fn name(&self) -> &'static str {
        "cross-system-pds-to-uss-dir"
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
            && op.source.origin == FileOrigin::Remote
            && op.destination.origin == FileOrigin::Remote
            && op.common_connections().is_empty()
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let source_attributes = op.source_attributes.as_ref().expect("guarded by can_run");
        let destination_attributes = op
            .destination_attributes
            .as_ref()
            .expect("guarded by can_run");
        let (FileAttributes::Dataset(library), FileAttributes::Uss(destination)) =
            (source_attributes, destination_attributes)
        else {
            unreachable!("guarded by can_run");
        };

        if !engine.synchronizer().accepts(&op.source) {
            return Err(OpsError::MissingCollaborator {
                collaborator: "content synchronizer".to_string(),
                file: op.source.name.clone(),
            });
        }

        let listing_connection = first_connection(source_attributes)?;
        let destination_connection = first_connection(destination_attributes)?;

        pds_to_uss::proceed_pds_transfer(
            engine,
            op,
            library,
            destination,
            listing_connection,
            destination_connection,
            token,
            |conn, member, destination_path| async move {
                let member_handle =
                    FileHandle::remote(format!("{}({})", library.name, member), false);
                let staged = engine.synchronizer().fetch(&member_handle, token).await?;
                engine
                    .client()
                    .write_uss_file(
                        &conn,
                        &format!("{}/{}", destination_path, member),
                        staged.bytes,
                        staged.content_type,
                    )
                    .await
            },
        )
        .await
    }
}
