use super::{as_move_copy, expect_success, try_common_connections};
use crate::engine::DataOpsEngine;
use crate::error::OpsResult;
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use zmove_protocol::{CopyDatasetToUss, FileAttributes, MoveCopyOperation, Operation};

/// Copies a dataset member or a sequential dataset into a USS directory on
/// the same system with one copy-to-USS call.
pub struct DatasetToUssMover;

/// (dataset, member) pair the copy call reads from.
fn source_coordinates(op: &MoveCopyOperation) -> (String, Option<String>) {
    match op.source_attributes.as_ref() {
        Some(FileAttributes::Member(attrs)) => {
            (attrs.library.name.clone(), Some(attrs.name.to_uppercase()))
        }
        Some(FileAttributes::Dataset(attrs)) => (attrs.name.clone(), None),
        _ => unreachable!("guarded by can_run"),
    }
}

#[async_trait]
impl OperationRunner for DatasetToUssMover {
    fn name(&self) -> &'static str {
        "dataset-to-uss"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        let Operation::MoveCopy(op) = operation else {
            return false;
        };
        let source_matches = match &op.source_attributes {
            Some(FileAttributes::Member(_)) => true,
            Some(FileAttributes::Dataset(attrs)) => !attrs.is_library(),
            _ => false,
        };
        source_matches
            && !op.source.is_directory
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
        let Some(FileAttributes::Uss(destination)) = &op.destination_attributes else {
            unreachable!("guarded by can_run");
        };

        try_common_connections(op, |connection| async move {
            let (dataset_name, member_name) = source_coordinates(op);
            let to_path = format!(
                "{}/{}",
                destination.path.trim_end_matches('/'),
                op.effective_name()
            );
            let source_label = match &member_name {
                Some(member) => format!("{}({})", dataset_name, member),
                None => dataset_name.clone(),
            };

            check_cancelled(token)?;
            let response = engine
                .client()
                .copy_to_uss(
                    &connection,
                    &to_path,
                    &CopyDatasetToUss {
                        dataset: dataset_name.clone(),
                        member: member_name.clone(),
                    },
                )
                .await?;
            expect_success(
                response,
                &[],
                format!("{} '{}' to '{}'", op.verb(), source_label, to_path),
                &connection,
            )?;

            if op.is_move {
                check_cancelled(token)?;
                let delete = match &member_name {
                    Some(member) => {
                        engine
                            .client()
                            .delete_dataset_member(&connection, &dataset_name, member)
                            .await?
                    }
                    None => engine.client().delete_dataset(&connection, &dataset_name).await?,
                };
                expect_success(
                    delete,
                    &[],
                    format!("delete source '{}'", source_label),
                    &connection,
                )?;
                engine.store().apply_deleted(&op.source);
            }
            Ok(())
        })
        .await
    }
}
