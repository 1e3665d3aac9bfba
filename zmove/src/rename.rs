use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{FileAttributes, MoveUss, Operation, RenameData};

/// Renames a dataset, member or USS object in place. Datasets and members
/// go through the rename call; USS objects are renamed with a move to a
/// sibling path. Requesters are tried in order, first success wins.
pub struct RenameRunner;

#[async_trait]
impl OperationRunner for RenameRunner {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        matches!(operation, Operation::Rename(_))
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let Operation::Rename(op) = operation else {
            unreachable!("guarded by can_run");
        };
        info!("Renaming '{}' to '{}'", op.file.path, op.new_name);

        let mut last_error: Option<OpsError> = None;
        for requester in op.attributes.requesters() {
            check_cancelled(token)?;
            let connection = &requester.connection;
            let outcome = match &op.attributes {
                FileAttributes::Dataset(attrs) => {
                    engine
                        .client()
                        .rename_dataset(
                            connection,
                            &op.new_name,
                            &RenameData {
                                dataset: attrs.name.clone(),
                                member: None,
                            },
                        )
                        .await
                }
                FileAttributes::Member(attrs) => {
                    engine
                        .client()
                        .rename_dataset_member(
                            connection,
                            &attrs.library.name,
                            &op.new_name.to_uppercase(),
                            &RenameData {
                                dataset: attrs.library.name.clone(),
                                member: Some(attrs.name.clone()),
                            },
                        )
                        .await
                }
                FileAttributes::Uss(attrs) => {
                    let to_path = format!(
                        "{}/{}",
                        attrs.parent_dir_path().trim_end_matches('/'),
                        op.new_name
                    );
                    engine
                        .client()
                        .move_uss_item(
                            connection,
                            &to_path,
                            &MoveUss {
                                from: attrs.path.clone(),
                            },
                        )
                        .await
                }
            };
            match outcome {
                Ok(response) if response.is_success() => {
                    engine.store().apply_renamed(&op.file, &op.new_name);
                    return Ok(());
                }
                Ok(response) => {
                    last_error = Some(OpsError::RemoteCallFailed {
                        call: format!("rename '{}' to '{}'", op.file.path, op.new_name),
                        connection: connection.name.clone(),
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or_else(|| OpsError::MissingCollaborator {
            collaborator: "connection".to_string(),
            file: op.file.name.clone(),
        }))
    }
}
