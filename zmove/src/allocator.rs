use crate::engine::DataOpsEngine;
use crate::error::{OpsError, OpsResult};
use crate::runner::{check_cancelled, OperationRunner};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zmove_protocol::{AllocationParams, ContentType, CreateUssItem, Operation};

/// Dataset names: one to 44 characters of dot-separated levels, each level
/// one to eight characters starting alphabetic or national.
pub(crate) fn validate_dataset_name(name: &str) -> OpsResult<()> {
    if name.is_empty() || name.len() > 44 {
        return Err(OpsError::InvalidName {
            name: name.to_string(),
            reason: "dataset names are 1 to 44 characters".to_string(),
        });
    }
    for level in name.split('.') {
        validate_level(name, level, "qualifier")?;
    }
    Ok(())
}

pub(crate) fn validate_member_name(name: &str) -> OpsResult<()> {
    validate_level(name, name, "member name")
}

fn validate_level(full: &str, level: &str, what: &str) -> OpsResult<()> {
    let ok_first = |c: char| c.is_ascii_alphabetic() || matches!(c, '$' | '#' | '@');
    let ok_rest = |c: char| c.is_ascii_alphanumeric() || matches!(c, '$' | '#' | '@' | '-');
    let valid = !level.is_empty()
        && level.len() <= 8
        && level.chars().next().is_some_and(ok_first)
        && level.chars().skip(1).all(ok_rest);
    if valid {
        Ok(())
    } else {
        Err(OpsError::InvalidName {
            name: full.to_string(),
            reason: format!(
                "each {} is 1 to 8 characters, starting alphabetic or national",
                what
            ),
        })
    }
}

/// Allocates a new dataset: one create call against the operation's
/// connection, no rollback needed because nothing exists on failure.
pub struct DatasetAllocator;

#[async_trait]
impl OperationRunner for DatasetAllocator {
    fn name(&self) -> &'static str {
        "allocate-dataset"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        matches!(
            operation,
            Operation::Allocate(op) if matches!(op.params, AllocationParams::Dataset(_))
        )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let Operation::Allocate(op) = operation else {
            unreachable!("guarded by can_run");
        };
        let AllocationParams::Dataset(params) = &op.params else {
            unreachable!("guarded by can_run");
        };
        validate_dataset_name(&params.name)?;
        info!("Allocating dataset '{}' on {}", params.name, op.connection);

        check_cancelled(token)?;
        let response = engine
            .client()
            .create_dataset(&op.connection, &params.name, params)
            .await?;
        if !response.is_success() {
            return Err(OpsError::RemoteCallFailed {
                call: format!("allocate dataset '{}'", params.name),
                connection: op.connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

/// Allocates a USS file or directory with the requested permission bits.
pub struct UssAllocator;

#[async_trait]
impl OperationRunner for UssAllocator {
    fn name(&self) -> &'static str {
        "allocate-uss"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        matches!(
            operation,
            Operation::Allocate(op) if matches!(op.params, AllocationParams::Uss(_))
        )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let Operation::Allocate(op) = operation else {
            unreachable!("guarded by can_run");
        };
        let AllocationParams::Uss(params) = &op.params else {
            unreachable!("guarded by can_run");
        };
        info!(
            "Allocating USS {} '{}' on {}",
            params.kind, params.path, op.connection
        );

        check_cancelled(token)?;
        let response = engine
            .client()
            .create_uss_item(
                &op.connection,
                &params.path,
                &CreateUssItem {
                    kind: params.kind,
                    mode: params.mode,
                },
            )
            .await?;
        if !response.is_success() {
            return Err(OpsError::RemoteCallFailed {
                call: format!("allocate {} '{}'", params.kind, params.path),
                connection: op.connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

/// Allocates an empty member inside an existing partitioned dataset by
/// writing zero bytes into it.
pub struct MemberAllocator;

#[async_trait]
impl OperationRunner for MemberAllocator {
    fn name(&self) -> &'static str {
        "allocate-member"
    }

    fn can_run(&self, operation: &Operation) -> bool {
        matches!(
            operation,
            Operation::Allocate(op) if matches!(op.params, AllocationParams::Member(_))
        )
    }

    async fn run(
        &self,
        operation: &Operation,
        engine: &DataOpsEngine,
        token: &CancellationToken,
    ) -> OpsResult<()> {
        let Operation::Allocate(op) = operation else {
            unreachable!("guarded by can_run");
        };
        let AllocationParams::Member(params) = &op.params else {
            unreachable!("guarded by can_run");
        };
        validate_dataset_name(&params.dataset)?;
        validate_member_name(&params.member)?;
        let member = params.member.to_uppercase();
        info!(
            "Allocating member '{}({})' on {}",
            params.dataset, member, op.connection
        );

        check_cancelled(token)?;
        let response = engine
            .client()
            .write_dataset_member(
                &op.connection,
                &params.dataset,
                &member,
                Vec::new(),
                ContentType::Text,
            )
            .await?;
        if !response.is_success() {
            return Err(OpsError::RemoteCallFailed {
                call: format!("allocate member '{}({})'", params.dataset, member),
                connection: op.connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}
