//! Shared fixtures: a recording mock of the remote call surface, a mock
//! content synchronizer, and builders for attributes and operations.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zmove::protocol::*;
use zmove::{
    AttributesStore, ContentSynchronizer, DataOpsEngine, EngineConfig, InMemoryAttributesStore,
    OpsResult, RemoteCallClient, StagedContent,
};

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub method: &'static str,
    pub connection: String,
    pub target: String,
    pub body: Option<Vec<u8>>,
}

/// Records every remote call and replays stubbed outcomes per method in
/// FIFO order; methods without stubs answer success.
#[derive(Default)]
pub struct MockClient {
    calls: Mutex<Vec<CallRecord>>,
    responses: Mutex<HashMap<&'static str, VecDeque<OpsResult<RemoteResponse>>>>,
    members: Mutex<HashMap<String, Vec<String>>>,
    uss_children: Mutex<HashMap<String, Vec<UssChild>>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stub(&self, method: &'static str, outcome: OpsResult<RemoteResponse>) {
        self.responses
            .lock()
            .entry(method)
            .or_default()
            .push_back(outcome);
    }

    pub fn stub_members(&self, dataset: &str, members: &[&str]) {
        self.members
            .lock()
            .insert(dataset.to_string(), members.iter().map(|m| m.to_string()).collect());
    }

    pub fn stub_uss_children(&self, path: &str, children: Vec<UssChild>) {
        self.uss_children.lock().insert(path.to_string(), children);
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, method: &str) -> Vec<CallRecord> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(
        &self,
        method: &'static str,
        connection: &ConnectionConfig,
        target: String,
        body: Option<Vec<u8>>,
    ) {
        self.calls.lock().push(CallRecord {
            method,
            connection: connection.name.clone(),
            target,
            body,
        });
    }

    fn next_response(&self, method: &'static str) -> OpsResult<RemoteResponse> {
        self.responses
            .lock()
            .get_mut(method)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Ok(RemoteResponse::ok()))
    }
}

#[async_trait]
impl RemoteCallClient for MockClient {
    async fn copy_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromDataset,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "copy_to_dataset_member",
            connection,
            format!(
                "{}({}) <- {}{}",
                to_dataset,
                to_member,
                body.dataset,
                body.member
                    .as_deref()
                    .map(|m| format!("({})", m))
                    .unwrap_or_default()
            ),
            None,
        );
        self.next_response("copy_to_dataset_member")
    }

    async fn copy_uss_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromUssFile,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "copy_uss_to_dataset_member",
            connection,
            format!("{}({}) <- {}", to_dataset, to_member, body.path),
            None,
        );
        self.next_response("copy_uss_to_dataset_member")
    }

    async fn copy_to_uss(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyDatasetToUss,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "copy_to_uss",
            connection,
            format!(
                "{} <- {}{}",
                to_path,
                body.dataset,
                body.member
                    .as_deref()
                    .map(|m| format!("({})", m))
                    .unwrap_or_default()
            ),
            None,
        );
        self.next_response("copy_to_uss")
    }

    async fn copy_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyFromUss,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "copy_uss_item",
            connection,
            format!("{} <- {}", to_path, body.from),
            None,
        );
        self.next_response("copy_uss_item")
    }

    async fn move_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &MoveUss,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "move_uss_item",
            connection,
            format!("{} <- {}", to_path, body.from),
            None,
        );
        self.next_response("move_uss_item")
    }

    async fn write_uss_file(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "write_uss_file",
            connection,
            format!("{} ({})", path, content_type),
            Some(content),
        );
        self.next_response("write_uss_file")
    }

    async fn write_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "write_dataset_member",
            connection,
            format!("{}({}) ({})", dataset, member, content_type),
            Some(content),
        );
        self.next_response("write_dataset_member")
    }

    async fn create_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        body: &CreateUssItem,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "create_uss_item",
            connection,
            format!("{} ({})", path, body.kind),
            None,
        );
        self.next_response("create_uss_item")
    }

    async fn create_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
        _body: &DatasetAllocationParams,
    ) -> OpsResult<RemoteResponse> {
        self.record("create_dataset", connection, name.to_string(), None);
        self.next_response("create_dataset")
    }

    async fn delete_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
    ) -> OpsResult<RemoteResponse> {
        self.record("delete_dataset", connection, name.to_string(), None);
        self.next_response("delete_dataset")
    }

    async fn delete_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "delete_dataset_member",
            connection,
            format!("{}({})", dataset, member),
            None,
        );
        self.next_response("delete_dataset_member")
    }

    async fn delete_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        recursive: bool,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "delete_uss_item",
            connection,
            format!("{} recursive={}", path, recursive),
            None,
        );
        self.next_response("delete_uss_item")
    }

    async fn rename_dataset(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "rename_dataset",
            connection,
            format!("{} <- {}", to_dataset, body.dataset),
            None,
        );
        self.next_response("rename_dataset")
    }

    async fn rename_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse> {
        self.record(
            "rename_dataset_member",
            connection,
            format!(
                "{}({}) <- {}",
                to_dataset,
                to_member,
                body.member.as_deref().unwrap_or("")
            ),
            None,
        );
        self.next_response("rename_dataset_member")
    }

    async fn list_members(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
    ) -> OpsResult<Vec<String>> {
        self.record("list_members", connection, dataset.to_string(), None);
        if let Some(outcome) = self
            .responses
            .lock()
            .get_mut("list_members")
            .and_then(|queue| queue.pop_front())
        {
            outcome?;
        }
        Ok(self
            .members
            .lock()
            .get(dataset)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_uss_children(
        &self,
        connection: &ConnectionConfig,
        path: &str,
    ) -> OpsResult<Vec<UssChild>> {
        self.record("list_uss_children", connection, path.to_string(), None);
        Ok(self
            .uss_children
            .lock()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

/// Synchronizer that accepts every remote file and serves canned content.
#[derive(Default)]
pub struct MockSynchronizer {
    fetches: Mutex<Vec<String>>,
    content: Mutex<HashMap<String, StagedContent>>,
}

impl MockSynchronizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stub_content(&self, path: &str, staged: StagedContent) {
        self.content.lock().insert(path.to_string(), staged);
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }
}

#[async_trait]
impl ContentSynchronizer for MockSynchronizer {
    fn accepts(&self, file: &FileHandle) -> bool {
        file.origin == FileOrigin::Remote
    }

    async fn fetch(
        &self,
        file: &FileHandle,
        _token: &CancellationToken,
    ) -> OpsResult<StagedContent> {
        self.fetches.lock().push(file.path.clone());
        Ok(self
            .content
            .lock()
            .get(&file.path)
            .cloned()
            .unwrap_or_else(|| StagedContent::text(b"staged content\n".to_vec())))
    }
}

/// Synchronizer that accepts nothing, for missing-collaborator paths.
pub struct NullSynchronizer;

#[async_trait]
impl ContentSynchronizer for NullSynchronizer {
    fn accepts(&self, _file: &FileHandle) -> bool {
        false
    }

    async fn fetch(
        &self,
        file: &FileHandle,
        _token: &CancellationToken,
    ) -> OpsResult<StagedContent> {
        panic!("fetch called on NullSynchronizer for {}", file.path);
    }
}

pub struct TestEngine {
    pub engine: DataOpsEngine,
    pub client: Arc<MockClient>,
    pub store: Arc<InMemoryAttributesStore>,
    pub synchronizer: Arc<MockSynchronizer>,
}

pub fn test_engine() -> TestEngine {
    let client = MockClient::new();
    let store = Arc::new(InMemoryAttributesStore::new());
    let synchronizer = MockSynchronizer::new();
    let engine = DataOpsEngine::new(
        client.clone(),
        store.clone() as Arc<dyn AttributesStore>,
        synchronizer.clone() as Arc<dyn ContentSynchronizer>,
        serial_config(),
    );
    TestEngine {
        engine,
        client,
        store,
        synchronizer,
    }
}

pub fn test_engine_without_synchronizer() -> TestEngine {
    let base = test_engine();
    let engine = DataOpsEngine::new(
        base.client.clone(),
        base.store.clone() as Arc<dyn AttributesStore>,
        Arc::new(NullSynchronizer),
        serial_config(),
    );
    TestEngine { engine, ..base }
}

/// One operation in flight at a time, so stubbed response queues replay in
/// submission order.
pub fn serial_config() -> EngineConfig {
    EngineConfig {
        max_concurrent_operations: 1,
        ..EngineConfig::default()
    }
}

pub fn connection(name: &str) -> ConnectionConfig {
    ConnectionConfig::new(name, format!("https://{name}.example:10443"), "Basic dXNlcg==")
}

pub fn dataset_attrs(name: &str, organization: DatasetOrganization, conns: &[&str]) -> DatasetAttributes {
    DatasetAttributes {
        name: name.to_string(),
        organization,
        volume: None,
        requesters: conns
            .iter()
            .map(|c| Requester::new(connection(c), name))
            .collect(),
    }
}

pub fn member_attrs(library: &str, member: &str, conns: &[&str]) -> FileAttributes {
    FileAttributes::Member(MemberAttributes {
        name: member.to_string(),
        library: dataset_attrs(library, DatasetOrganization::Po, conns),
    })
}

pub fn uss_attrs(path: &str, is_directory: bool, conns: &[&str]) -> FileAttributes {
    FileAttributes::Uss(UssAttributes {
        path: path.to_string(),
        is_directory,
        symlink_target: None,
        file_mode: None,
        requesters: conns
            .iter()
            .map(|c| Requester::new(connection(c), path))
            .collect(),
    })
}

pub fn symlink_attrs(path: &str, target: &str, conns: &[&str]) -> FileAttributes {
    match uss_attrs(path, false, conns) {
        FileAttributes::Uss(mut attrs) => {
            attrs.symlink_target = Some(target.to_string());
            FileAttributes::Uss(attrs)
        }
        _ => unreachable!(),
    }
}

pub fn handle_for(attributes: &FileAttributes) -> FileHandle {
    let path = match attributes {
        FileAttributes::Dataset(attrs) => attrs.name.clone(),
        FileAttributes::Member(attrs) => format!("{}({})", attrs.library.name, attrs.name),
        FileAttributes::Uss(attrs) => attrs.path.clone(),
    };
    FileHandle::remote(path, attributes.is_directory())
}

pub fn move_copy_op(
    source: FileAttributes,
    destination: FileAttributes,
    is_move: bool,
) -> Operation {
    Operation::MoveCopy(MoveCopyOperation {
        source: handle_for(&source),
        source_attributes: Some(source),
        destination: handle_for(&destination),
        destination_attributes: Some(destination),
        is_move,
        force_overwriting: false,
        new_name: None,
        unit: None,
    })
}
