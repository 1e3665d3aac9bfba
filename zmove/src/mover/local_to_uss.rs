use super::{as_move_copy, expect_success, first_connection};
use crate::engine::DataOpsEngine;
use crate::error::OpsResult;
use crate::runner::{check_cancelled, OperationRunner};
use crate::sync::detect_content_type;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{
    CreateUssItem, FileAttributes, FileHandle, FileMode, FileOrigin, MoveCopyOperation, Operation,
    Requester, UssAttributes, UssItemKind,
};

/// Uploads a single workstation file into a remote USS directory. Local
/// files carry no attribute snapshot, so the upload goes through the
/// destination's first requester connection.
pub struct LocalFileToUssDirMover;

#[async_trait]
impl OperationRunner for LocalFileToUssDirMover {
    fn name(&self) -> &'static str {
        "local-file-to-uss-dir"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        op.source.origin == FileOrigin::Local
            && !op.source.is_directory
            && op.destination.origin == FileOrigin::Remote
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let Some(destination_attributes @ FileAttributes::Uss(destination)) =
            &op.destination_attributes
        else {
            unreachable!("guarded by can_run");
        };
        let connection = first_connection(destination_attributes)?;

        let content = tokio::fs::read(&op.source.path).await?;
        let content_type = detect_content_type(&content);
        let to_path = format!(
            "{}/{}",
            destination.path.trim_end_matches('/'),
            op.effective_name()
        );
        info!("Uploading local file '{}' to '{}'", op.source.path, to_path);

        check_cancelled(token)?;
        let response = engine
            .client()
            .write_uss_file(&connection, &to_path, content, content_type)
            .await?;
        expect_success(
            response,
            &[],
            format!("upload '{}' to '{}'", op.source.path, to_path),
            &connection,
        )?;

        if op.is_move {
            tokio::fs::remove_file(&op.source.path).await?;
        }
        Ok(())
    }
}

/// Uploads a workstation directory tree into a remote USS directory:
/// creates the remote directory, then re-dispatches one operation per
/// entry so files and nested directories take their own movers.
pub struct LocalDirToUssDirMover;

#[async_trait]
impl OperationRunner for LocalDirToUssDirMover {
    fn name(&self) -> &'static str {
        "local-dir-to-uss-dir"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        op.source.origin == FileOrigin::Local
            && op.source.is_directory
            && op.destination.origin == FileOrigin::Remote
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let Some(destination_attributes @ FileAttributes::Uss(destination)) =
            &op.destination_attributes
        else {
            unreachable!("guarded by can_run");
        };
        let connection = first_connection(destination_attributes)?;

        let directory_path = format!(
            "{}/{}",
            destination.path.trim_end_matches('/'),
            op.effective_name()
        );
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

        let mut entries = tokio::fs::read_dir(&op.source.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            check_cancelled(token)?;
            let metadata = entry.metadata().await?;
            let child_path = entry.path().to_string_lossy().to_string();
            let child = Operation::MoveCopy(MoveCopyOperation {
                source: FileHandle::local(child_path, metadata.is_dir()),
                source_attributes: None,
                destination: created_dir.clone(),
                destination_attributes: Some(FileAttributes::Uss(created_attributes.clone())),
                is_move: false,
                force_overwriting: false,
                new_name: None,
                unit: op.unit.clone(),
            });
            engine.perform(&child, token).await?;
        }

        if op.is_move {
            tokio::fs::remove_dir_all(&op.source.path).await?;
        }
        Ok(())
    }
}
