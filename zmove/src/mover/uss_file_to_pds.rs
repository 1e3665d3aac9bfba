use super::{as_move_copy, derive_member_name, expect_success, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use zmove_protocol::{
    ContentType, CopyFromUssFile, FileAttributes, Operation, TRUNCATION_MESSAGE,
};

/// Copies a USS file into a partitioned dataset on the same system. Records
/// longer than the target record length are truncated by the remote side;
/// that condition is reported as success.
pub struct UssFileToPdsMover;

#[async_trait]
impl OperationRunner for UssFileToPdsMover {
    fn name(&self) -> &'static str {
        "uss-file-to-pds"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        matches!(
            &op.source_attributes,
            Some(FileAttributes::Uss(attrs)) if !attrs.is_directory
        ) && matches!(
            &op.destination_attributes,
            Some(FileAttributes::Dataset(attrs)) if attrs.is_library()
        ) && op.destination.is_directory
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
        let Some(FileAttributes::Dataset(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            let member_name = derive_member_name(source.name(), op.new_name.as_deref());
            let call = format!(
                "{} '{}' to '{}({})'",
                op.verb(),
                source.path,
                destination.name,
                member_name
            );

            check_cancelled(token)?;
            let response = engine
                .client()
                .copy_uss_to_dataset_member(
                    &connection,
                    &destination.name,
                    &member_name,
                    &CopyFromUssFile {
                        path: source.path.clone(),
                        copy_type: ContentType::Text,
                        replace: true,
                    },
                )
                .await?;
            expect_success(response, &[TRUNCATION_MESSAGE], call.clone(), &connection)?;

            if op.is_move {
                check_cancelled(token)?;
                let delete = engine
                    .client()
                    .delete_uss_item(&connection, &source.path, true)
                    .await?;
                if !delete.is_success() {
                    // The copy stands but the source survived; undo the copy
                    // so a failed move leaves nothing behind.
                    let rollback_ok = match engine
                        .client()
                        .delete_dataset_member(&connection, &destination.name, &member_name)
                        .await
                    {
                        Ok(response) => response.is_success(),
                        Err(err) => {
                            warn!("rollback of '{}({})' failed: {}", destination.name, member_name, err);
                            false
                        }
                    };
                    return Err(OpsError::RemoteCallFailed {
                        call,
                        connection: connection.name.clone(),
                        status: delete.status,
                        body: delete.body,
                    }
                    .with_rollback_outcome(rollback_ok));
                }
                engine.store().apply_deleted(&op.source);
            }
            Ok(())
        })
        .await
    }
}
