//! Move/copy strategies. Same-system movers translate one user gesture into
//! the one narrow remote call that exists for the (source, destination)
//! pair; directory movers add the multi-member protocol with rollback;
//! cross-system movers stage content locally because the two remote systems
//! cannot exchange bytes directly.

mod cross_system;
mod dataset_to_uss;
mod local_to_uss;
mod member_to_pds;
mod pds_to_uss;
mod seq_to_pds;
mod uss_file_to_pds;
mod uss_to_uss;

pub use cross_system::{
    CrossSystemFileToPdsMover, CrossSystemFileToUssDirMover, CrossSystemPdsToUssDirMover,
    CrossSystemUssDirMover,
};
pub use dataset_to_uss::DatasetToUssMover;
pub use local_to_uss::{LocalDirToUssDirMover, LocalFileToUssDirMover};
pub use member_to_pds::MemberToPdsMover;
pub use pds_to_uss::PdsToUssFolderMover;
pub use seq_to_pds::SequentialToPdsMover;
pub use uss_file_to_pds::UssFileToPdsMover;
pub use uss_to_uss::UssToUssMover;

use crate::error::{OpsError, OpsResult};
use std::future::Future;
use zmove_protocol::{
    ConnectionConfig, FileAttributes, MoveCopyOperation, Operation, RemoteResponse,
};

/// Every mover's `run` is only reachable through its own `can_run`, which
/// already established the operation shape.
pub(crate) fn as_move_copy(operation: &Operation) -> &MoveCopyOperation {
    match operation {
        Operation::MoveCopy(op) => op,
        _ => unreachable!("mover accepted a non-move/copy operation"),
    }
}

/// Shared protocol of every same-system mover: attempt the transfer once
/// per common connection, in requester order. A remote rejection is final;
/// only transport failures fall through to the next connection. The last
/// error surfaces when every connection failed.
pub(crate) async fn try_common_connections<F, Fut>(
    operation: &MoveCopyOperation,
    attempt: F,
) -> OpsResult<()>
where
    F: Fn(ConnectionConfig) -> Fut,
    Fut: Future<Output = OpsResult<()>>,
{
    let mut last_error: Option<OpsError> = None;
    for connection in operation.common_connections() {
        match attempt(connection).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_transport() => last_error = Some(err),
            Err(err) => return Err(err),
        }
    }
    Err(last_error.unwrap_or_else(|| OpsError::UnsupportedOperation {
        reason: format!(
            "no common connection between '{}' and '{}'",
            operation.source.path, operation.destination.path
        ),
    }))
}

/// Member name a transferred object gets inside a partitioned dataset:
/// the explicit new name when given, otherwise the source name stripped to
/// alphanumerics, truncated to eight characters and uppercased.
pub(crate) fn derive_member_name(source_name: &str, new_name: Option<&str>) -> String {
    if let Some(name) = new_name {
        return name.to_uppercase();
    }
    let cleaned: String = source_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect();
    if cleaned.is_empty() {
        "EMPTY".to_string()
    } else {
        cleaned.to_uppercase()
    }
}

/// Symbolic links cannot be staged; the user must operate on the link
/// target instead. Checked before any network call is issued.
pub(crate) fn reject_symlink(attributes: Option<&FileAttributes>) -> OpsResult<()> {
    if let Some(FileAttributes::Uss(attrs)) = attributes {
        if let Some(target) = &attrs.symlink_target {
            return Err(OpsError::UnsupportedOperation {
                reason: format!(
                    "'{}' is a symlink to '{}'; operate on '{}' directly",
                    attrs.path, target, target
                ),
            });
        }
    }
    Ok(())
}

/// First connection through which the destination is reachable. Cross-system
/// movers upload through it because no common route exists by definition.
pub(crate) fn first_connection(attributes: &FileAttributes) -> OpsResult<ConnectionConfig> {
    attributes
        .requesters()
        .first()
        .map(|r| r.connection.clone())
        .ok_or_else(|| OpsError::MissingCollaborator {
            collaborator: "connection".to_string(),
            file: attributes.name().to_string(),
        })
}

/// Maps a remote rejection into the surfaced error, tolerating the benign
/// body fragments some transfers are allowed to ignore.
pub(crate) fn expect_success(
    response: RemoteResponse,
    benign_fragments: &[&str],
    call: String,
    connection: &ConnectionConfig,
) -> OpsResult<()> {
    if response.is_success() || benign_fragments.iter().any(|f| response.body_contains(f)) {
        Ok(())
    } else {
        Err(OpsError::RemoteCallFailed {
            call,
            connection: connection.name.clone(),
            status: response.status,
            body: response.body,
        })
    }
}
