use crate::error::OpsResult;
use async_trait::async_trait;
use zmove_protocol::{
    ConnectionConfig, ContentType, CopyDatasetToUss, CopyFromDataset, CopyFromUss, CopyFromUssFile,
    CreateUssItem, DatasetAllocationParams, MoveUss, RemoteResponse, RenameData, UssChild,
};

/// The narrow remote surface the engine is built from: one labeled call per
/// object-specific operation the remote system actually exposes. There is no
/// generic "move anything to anything" primitive; the movers compose these.
///
/// Every method runs against exactly one connection and returns either the
/// remote outcome (`RemoteResponse`, possibly a rejection) or
/// `OpsError::Transport` when the connection could not be reached at all.
/// That distinction drives the try-next-connection policy in the movers.
#[async_trait]
pub trait RemoteCallClient: Send + Sync {
    /// Copy a dataset or member into a member of `to_dataset`.
    async fn copy_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromDataset,
    ) -> OpsResult<RemoteResponse>;

    /// Copy a USS file into a member of `to_dataset` on the same system.
    async fn copy_uss_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromUssFile,
    ) -> OpsResult<RemoteResponse>;

    /// Copy a dataset or member onto a USS path.
    async fn copy_to_uss(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyDatasetToUss,
    ) -> OpsResult<RemoteResponse>;

    /// USS-to-USS copy on one system; the remote side recurses itself.
    async fn copy_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyFromUss,
    ) -> OpsResult<RemoteResponse>;

    /// USS-to-USS move; also the rename primitive for USS objects.
    async fn move_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &MoveUss,
    ) -> OpsResult<RemoteResponse>;

    async fn write_uss_file(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse>;

    async fn write_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse>;

    async fn create_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        body: &CreateUssItem,
    ) -> OpsResult<RemoteResponse>;

    async fn create_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
        body: &DatasetAllocationParams,
    ) -> OpsResult<RemoteResponse>;

    async fn delete_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
    ) -> OpsResult<RemoteResponse>;

    async fn delete_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
    ) -> OpsResult<RemoteResponse>;

    async fn delete_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        recursive: bool,
    ) -> OpsResult<RemoteResponse>;

    async fn rename_dataset(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse>;

    async fn rename_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse>;

    /// Current member names of a partitioned dataset. Always a fresh remote
    /// listing; directory movers rely on this never being served from cache.
    async fn list_members(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
    ) -> OpsResult<Vec<String>>;

    /// Immediate children of a USS directory.
    async fn list_uss_children(
        &self,
        connection: &ConnectionConfig,
        path: &str,
    ) -> OpsResult<Vec<UssChild>>;
}
