use super::{as_move_copy, expect_success, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::OpsResult;
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use zmove_protocol::{CopyFromDataset, FileAttributes, Operation, EMPTY_DATASET_MESSAGE};

/// Copies a sequential dataset into a partitioned dataset on the same
/// system. The whole dataset becomes one member; the member name defaults
/// to the last qualifier of the dataset name.
pub struct SequentialToPdsMover;

#[async_trait]
impl OperationRunner for SequentialToPdsMover {
    fn name(&self) -> &'static str {
        "sequential-to-pds"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        matches!(
            &op.destination_attributes,
            Some(FileAttributes::Dataset(attrs)) if attrs.is_library()
        ) && op.destination.is_directory
            && !op.source.is_directory
            && matches!(
                &op.source_attributes,
                Some(FileAttributes::Dataset(attrs)) if !attrs.is_library()
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
        let Some(FileAttributes::Dataset(source)) = &op.source_attributes else {
            unreachable!("guarded by can_run");
        };
        let Some(FileAttributes::Dataset(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            let member_name = op
                .new_name
                .clone()
                .unwrap_or_else(|| last_qualifier(&source.name).to_uppercase());

            check_cancelled(token)?;
            let response = engine
                .client()
                .copy_to_dataset_member(
                    &connection,
                    &destination.name,
                    &member_name,
                    &CopyFromDataset {
                        dataset: source.name.clone(),
                        member: None,
                        replace: op.force_overwriting,
                    },
                )
                .await?;
            // An empty sequential dataset has nothing to copy; the remote
            // reports it as an error but the transfer is complete.
            expect_success(
                response,
                &[EMPTY_DATASET_MESSAGE],
                format!(
                    "{} dataset '{}' to '{}({})'",
                    op.verb(),
                    source.name,
                    destination.name,
                    member_name
                ),
                &connection,
            )?;

            if op.is_move {
                check_cancelled(token)?;
                let response = engine.client().delete_dataset(&connection, &source.name).await?;
                expect_success(
                    response,
                    &[],
                    format!("delete source dataset '{}'", source.name),
                    &connection,
                )?;
                engine.store().apply_deleted(&op.source);
            }
            Ok(())
        })
        .await
    }
}

fn last_qualifier(dataset_name: &str) -> &str {
    dataset_name.rsplit('.').next().unwrap_or(dataset_name)
}
