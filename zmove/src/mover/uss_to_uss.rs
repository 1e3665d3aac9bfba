use super::{as_move_copy, expect_success, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::OpsResult;
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{CopyFromUss, FileAttributes, MoveCopyOperation, MoveUss, Operation, UssAttributes};

/// Moves or copies a USS file or directory into a USS directory on the
/// same system. Directory recursion happens remotely, so this stays a
/// single call either way.
pub struct UssToUssMover;

#[async_trait]
impl OperationRunner for UssToUssMover {
    fn name(&self) -> &'static str {
        "uss-to-uss"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        matches!(op.source_attributes, Some(FileAttributes::Uss(_)))
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Uss(attrs)) if attrs.is_directory
            )
            && !op.common_connections().is_empty()
            && !op.source.is_ancestor_of(&op.destination)
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let Some(FileAttributes::Uss(source)) = &op.source_attributes else {
            unreachable!("guarded by can_run");
        };
        let Some(FileAttributes::Uss(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            let to_path = destination_path(op, source, destination);
            let call = format!("{} '{}' to '{}'", op.verb(), source.path, to_path);
            info!("Trying to {} on {}", call, connection);

            check_cancelled(token)?;
            let response = if op.is_move {
                engine
                    .client()
                    .move_uss_item(
                        &connection,
                        &to_path,
                        &MoveUss {
                            from: source.path.clone(),
                        },
                    )
                    .await?
            } else {
                engine
                    .client()
                    .copy_uss_item(
                        &connection,
                        &to_path,
                        &CopyFromUss {
                            from: source.path.clone(),
                            overwrite: op.force_overwriting,
                            recursive: true,
                        },
                    )
                    .await?
            };
            expect_success(response, &[], call, &connection)?;

            if op.is_move {
                engine.store().apply_deleted(&op.source);
            }
            Ok(())
        })
        .await
    }
}

/// Directory-to-directory transfers land under the destination root (with
/// the new name appended when one was chosen); single files always land as
/// `<root>/<effective name>`.
fn destination_path(
    op: &MoveCopyOperation,
    source: &UssAttributes,
    destination: &UssAttributes,
) -> String {
    let root = destination.path.trim_end_matches('/');
    if source.is_directory && op.destination.is_directory {
        match &op.new_name {
            Some(new_name) => format!("{}/{}", root, new_name),
            None => root.to_string(),
        }
    } else {
        format!("{}/{}", root, op.effective_name())
    }
}
