use crate::allocator::{DatasetAllocator, MemberAllocator, UssAllocator};
use crate::client::RemoteCallClient;
use crate::config::EngineConfig;
use crate::delete::DeleteRunner;
use crate::error::{OpsError, OpsResult};
use crate::mover::{
    CrossSystemFileToPdsMover, CrossSystemFileToUssDirMover, CrossSystemPdsToUssDirMover,
    CrossSystemUssDirMover, DatasetToUssMover, LocalDirToUssDirMover, LocalFileToUssDirMover,
    MemberToPdsMover, PdsToUssFolderMover, SequentialToPdsMover, UssFileToPdsMover, UssToUssMover,
};
use crate::rename::RenameRunner;
use crate::runner::OperationRunner;
use crate::store::AttributesStore;
use crate::sync::ContentSynchronizer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use zmove_protocol::{FileAttributes, FileHandle, FileOrigin, Operation};

/// The full runner chain in registration order. Ordering is the only
/// tie-break: same-system movers come first so they win whenever a common
/// connection exists, the deliberately broad cross-system movers follow,
/// and the kind-selected runners (delete, rename, allocators) close the
/// list. Built once at engine construction; there is no dynamic
/// registration.
pub fn standard_runners() -> Vec<Arc<dyn OperationRunner>> {
    vec![
        // Same-system movers, most specific first.
        Arc::new(MemberToPdsMover),
        Arc::new(SequentialToPdsMover),
        Arc::new(UssToUssMover),
        Arc::new(UssFileToPdsMover),
        Arc::new(DatasetToUssMover),
        Arc::new(PdsToUssFolderMover),
        // Workstation uploads.
        Arc::new(LocalFileToUssDirMover),
        Arc::new(LocalDirToUssDirMover),
        // Cross-system fallbacks, only reachable when no common connection
        // exists.
        Arc::new(CrossSystemFileToUssDirMover),
        Arc::new(CrossSystemFileToPdsMover),
        Arc::new(CrossSystemUssDirMover),
        Arc::new(CrossSystemPdsToUssDirMover),
        // Selected by operation kind, not by classification.
        Arc::new(DeleteRunner),
        Arc::new(RenameRunner),
        Arc::new(DatasetAllocator),
        Arc::new(UssAllocator),
        Arc::new(MemberAllocator),
    ]
}

/// Dispatch facade: owns the collaborator handles and the ordered runner
/// chain, and routes each operation to the first runner that accepts it.
pub struct DataOpsEngine {
    client: Arc<dyn RemoteCallClient>,
    store: Arc<dyn AttributesStore>,
    synchronizer: Arc<dyn ContentSynchronizer>,
    config: EngineConfig,
    runners: Vec<Arc<dyn OperationRunner>>,
}

impl DataOpsEngine {
    pub fn new(
        client: Arc<dyn RemoteCallClient>,
        store: Arc<dyn AttributesStore>,
        synchronizer: Arc<dyn ContentSynchronizer>,
        config: EngineConfig,
    ) -> Self {
        Self::with_runners(client, store, synchronizer, config, standard_runners())
    }

    /// Engine with a custom runner chain; ordering is taken as given.
    pub fn with_runners(
        client: Arc<dyn RemoteCallClient>,
        store: Arc<dyn AttributesStore>,
        synchronizer: Arc<dyn ContentSynchronizer>,
        config: EngineConfig,
        runners: Vec<Arc<dyn OperationRunner>>,
    ) -> Self {
        Self {
            client,
            store,
            synchronizer,
            config,
            runners,
        }
    }

    pub fn client(&self) -> &dyn RemoteCallClient {
        self.client.as_ref()
    }

    pub fn store(&self) -> &dyn AttributesStore {
        self.store.as_ref()
    }

    pub fn synchronizer(&self) -> &dyn ContentSynchronizer {
        self.synchronizer.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registration order, used by tests that pin the chain down.
    pub fn runner_names(&self) -> Vec<&'static str> {
        self.runners.iter().map(|r| r.name()).collect()
    }

    /// Name of the runner that would execute the operation, without running
    /// anything. `can_run` is pure, so this has no side effects.
    pub fn classify(&self, operation: &Operation) -> Option<&'static str> {
        self.runners
            .iter()
            .find(|r| r.can_run(operation))
            .map(|r| r.name())
    }

    /// Dispatches one operation: the first runner in registration order
    /// whose `can_run` accepts it executes it. No acceptor means the
    /// combination is not supported by this engine.
    pub async fn perform(&self, operation: &Operation, token: &CancellationToken) -> OpsResult<()> {
        for runner in &self.runners {
            if runner.can_run(operation) {
                debug!("dispatching {} to runner '{}'", operation.kind_name(), runner.name());
                return runner.run(operation, self, token).await;
            }
        }
        Err(no_handler(operation))
    }
}

fn no_handler(operation: &Operation) -> OpsError {
    let (source_kind, destination_kind) = match operation {
        Operation::MoveCopy(op) => (
            kind_of(&op.source, op.source_attributes.as_ref()),
            kind_of(&op.destination, op.destination_attributes.as_ref()),
        ),
        Operation::Delete(op) => (kind_of(&op.file, Some(&op.attributes)), "-".to_string()),
        Operation::Rename(op) => (kind_of(&op.file, Some(&op.attributes)), "-".to_string()),
        Operation::Allocate(op) => (op.params.target_name(), op.connection.name.clone()),
    };
    OpsError::NoHandlerFound {
        operation: operation.kind_name().to_string(),
        source_kind,
        destination_kind,
    }
}

fn kind_of(handle: &FileHandle, attributes: Option<&FileAttributes>) -> String {
    match attributes {
        Some(attrs) => attrs.kind_name().to_string(),
        None => match (handle.origin, handle.is_directory) {
            (FileOrigin::Local, true) => "local directory".to_string(),
            (FileOrigin::Local, false) => "local file".to_string(),
            (FileOrigin::Remote, true) => "unclassified remote directory".to_string(),
            (FileOrigin::Remote, false) => "unclassified remote file".to_string(),
        },
    }
}
