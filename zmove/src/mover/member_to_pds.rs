use super::{as_move_copy, expect_success, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::OpsResult;
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{CopyFromDataset, FileAttributes, Operation};

/// Copies a dataset member into another partitioned dataset on the same
/// system: one copy-member call, then a member delete when moving.
pub struct MemberToPdsMover;

#[async_trait]
impl OperationRunner for MemberToPdsMover {
    fn name(&self) -> &'static str {
        "member-to-pds"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        matches!(op.source_attributes, Some(FileAttributes::Member(_)))
            && matches!(
                &op.destination_attributes,
                Some(FileAttributes::Dataset(attrs)) if attrs.is_library()
            )
            && !op.source.is_directory
            && op.destination.is_directory
            && !op.common_connections().is_empty()
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let op = as_move_copy(operation);
        let Some(FileAttributes::Member(source)) = &op.source_attributes else {
            unreachable!("guarded by can_run");
        };
        let Some(FileAttributes::Dataset(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            let member_name = op
                .new_name
                .as_deref()
                .unwrap_or(&source.name)
                .to_uppercase();
            let call = format!(
                "{} {}({}) to {}({})",
                op.verb(),
                source.library.name,
                source.name,
                destination.name,
                member_name
            );
            info!("Trying to {} on {}", call, connection);

            check_cancelled(token)?;
            let response = engine
                .client()
                .copy_to_dataset_member(
                    &connection,
                    &destination.name,
                    &member_name,
                    &CopyFromDataset {
                        dataset: source.library.name.clone(),
                        member: Some(source.name.clone()),
                        replace: op.force_overwriting,
                    },
                )
                .await?;
            expect_success(response, &[], call, &connection)?;

            if op.is_move {
                check_cancelled(token)?;
                let response = engine
                    .client()
                    .delete_dataset_member(&connection, &source.library.name, &source.name)
                    .await?;
                expect_success(
                    response,
                    &[],
                    format!("delete source member {}({})", source.library.name, source.name),
                    &connection,
                )?;
                engine.store().apply_deleted(&op.source);
            }
            Ok(())
        })
        .await
    }
}
