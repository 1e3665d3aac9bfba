use crate::client::RemoteCallClient;
use crate::config::EngineConfig;
use crate::error::{OpsError, OpsResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use zmove_protocol::{
    ConnectionConfig, ContentType, CopyDatasetToUss, CopyFromDataset, CopyFromUss, CopyFromUssFile,
    CreateUssItem, DatasetAllocationParams, MoveUss, RemoteResponse, RenameData, UssChild,
};

const CSRF_HEADER: &str = "X-CSRF-ZOSMF-HEADER";
const DATA_TYPE_HEADER: &str = "X-IBM-Data-Type";
const OPTION_HEADER: &str = "X-IBM-Option";

/// Production `RemoteCallClient` speaking the z/OSMF REST files API. Each
/// labeled engine call maps onto exactly one HTTP request; connections that
/// allow self-signed certificates get the lenient client.
pub struct ZosmfClient {
    strict: reqwest::Client,
    lenient: reqwest::Client,
}

impl ZosmfClient {
    pub fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let strict = reqwest::Client::builder().connect_timeout(timeout).build()?;
        let lenient = reqwest::Client::builder()
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { strict, lenient })
    }

    fn http(&self, connection: &ConnectionConfig) -> &reqwest::Client {
        if connection.allow_self_signed {
            &self.lenient
        } else {
            &self.strict
        }
    }

    fn dataset_url(connection: &ConnectionConfig, dataset: &str) -> String {
        format!(
            "{}/zosmf/restfiles/ds/{}",
            connection.url.trim_end_matches('/'),
            dataset
        )
    }

    fn member_url(connection: &ConnectionConfig, dataset: &str, member: &str) -> String {
        format!(
            "{}/zosmf/restfiles/ds/{}({})",
            connection.url.trim_end_matches('/'),
            dataset,
            member
        )
    }

    fn fs_url(connection: &ConnectionConfig, path: &str) -> String {
        format!(
            "{}/zosmf/restfiles/fs/{}",
            connection.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute(
        &self,
        connection: &ConnectionConfig,
        call: &str,
        request: reqwest::RequestBuilder,
    ) -> OpsResult<RemoteResponse> {
        let response = request
            .header(AUTHORIZATION, connection.auth_token.as_str())
            .header(CSRF_HEADER, "")
            .send()
            .await
            .map_err(|err| OpsError::Transport {
                call: call.to_string(),
                connection: connection.name.clone(),
                reason: err.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(RemoteResponse {
            status,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }

    fn content_header(content_type: ContentType) -> &'static str {
        match content_type {
            ContentType::Text => "text",
            ContentType::Binary => "binary",
        }
    }
}

#[derive(Deserialize)]
struct MemberList {
    #[serde(default)]
    items: Vec<MemberItem>,
}

#[derive(Deserialize)]
struct MemberItem {
    member: String,
}

#[derive(Deserialize)]
struct UssList {
    #[serde(default)]
    items: Vec<UssItem>,
}

#[derive(Deserialize)]
struct UssItem {
    name: String,
    mode: Option<String>,
    target: Option<String>,
}

#[async_trait]
impl RemoteCallClient for ZosmfClient {
    async fn copy_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromDataset,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::member_url(connection, to_dataset, to_member);
        let payload = json!({
            "request": "copy",
            "from-dataset": { "dsn": body.dataset, "member": body.member },
            "replace": body.replace,
        });
        self.execute(connection, "copy to dataset member", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn copy_uss_to_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &CopyFromUssFile,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::member_url(connection, to_dataset, to_member);
        let payload = json!({
            "request": "copy",
            "from-file": { "filename": body.path, "type": body.copy_type },
            "replace": body.replace,
        });
        self.execute(connection, "copy uss file to dataset member", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn copy_to_uss(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyDatasetToUss,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, to_path);
        let payload = json!({
            "request": "copy",
            "from-dataset": { "dsn": body.dataset, "member": body.member },
        });
        self.execute(connection, "copy dataset to uss", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn copy_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &CopyFromUss,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, to_path);
        let payload = json!({
            "request": "copy",
            "from": body.from,
            "overwrite": body.overwrite,
            "recursive": body.recursive,
        });
        self.execute(connection, "copy uss item", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn move_uss_item(
        &self,
        connection: &ConnectionConfig,
        to_path: &str,
        body: &MoveUss,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, to_path);
        let payload = json!({ "request": "move", "from": body.from });
        self.execute(connection, "move uss item", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn write_uss_file(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, path);
        let request = self
            .http(connection)
            .put(url)
            .header(DATA_TYPE_HEADER, Self::content_header(content_type))
            .body(content);
        self.execute(connection, "write uss file", request).await
    }

    async fn write_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
        content: Vec<u8>,
        content_type: ContentType,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::member_url(connection, dataset, member);
        let request = self
            .http(connection)
            .put(url)
            .header(DATA_TYPE_HEADER, Self::content_header(content_type))
            .body(content);
        self.execute(connection, "write dataset member", request).await
    }

    async fn create_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        body: &CreateUssItem,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, path);
        let payload = json!({ "type": body.kind, "mode": body.mode.to_string() });
        self.execute(connection, "create uss item", self.http(connection).post(url).json(&payload))
            .await
    }

    async fn create_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
        body: &DatasetAllocationParams,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::dataset_url(connection, name);
        self.execute(connection, "create dataset", self.http(connection).post(url).json(body))
            .await
    }

    async fn delete_dataset(
        &self,
        connection: &ConnectionConfig,
        name: &str,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::dataset_url(connection, name);
        self.execute(connection, "delete dataset", self.http(connection).delete(url))
            .await
    }

    async fn delete_dataset_member(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
        member: &str,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::member_url(connection, dataset, member);
        self.execute(connection, "delete dataset member", self.http(connection).delete(url))
            .await
    }

    async fn delete_uss_item(
        &self,
        connection: &ConnectionConfig,
        path: &str,
        recursive: bool,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::fs_url(connection, path);
        let mut request = self.http(connection).delete(url);
        if recursive {
            request = request.header(OPTION_HEADER, "recursive");
        }
        self.execute(connection, "delete uss item", request).await
    }

    async fn rename_dataset(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::dataset_url(connection, to_dataset);
        let payload = json!({
            "request": "rename",
            "from-dataset": { "dsn": body.dataset },
        });
        self.execute(connection, "rename dataset", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn rename_dataset_member(
        &self,
        connection: &ConnectionConfig,
        to_dataset: &str,
        to_member: &str,
        body: &RenameData,
    ) -> OpsResult<RemoteResponse> {
        let url = Self::member_url(connection, to_dataset, to_member);
        let payload = json!({
            "request": "rename",
            "from-dataset": { "dsn": body.dataset, "member": body.member },
        });
        self.execute(connection, "rename dataset member", self.http(connection).put(url).json(&payload))
            .await
    }

    async fn list_members(
        &self,
        connection: &ConnectionConfig,
        dataset: &str,
    ) -> OpsResult<Vec<String>> {
        let url = format!("{}/member", Self::dataset_url(connection, dataset));
        let response = self
            .execute(connection, "list members", self.http(connection).get(url))
            .await?;
        if !response.is_success() {
            return Err(OpsError::RemoteCallFailed {
                call: format!("list members of '{}'", dataset),
                connection: connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        let listing: MemberList = serde_json::from_str(response.body.as_deref().unwrap_or("{}"))
            .map_err(|err| OpsError::Transport {
                call: format!("list members of '{}'", dataset),
                connection: connection.name.clone(),
                reason: format!("invalid listing body: {}", err),
            })?;
        Ok(listing.items.into_iter().map(|item| item.member).collect())
    }

    async fn list_uss_children(
        &self,
        connection: &ConnectionConfig,
        path: &str,
    ) -> OpsResult<Vec<UssChild>> {
        let url = format!(
            "{}/zosmf/restfiles/fs?path={}",
            connection.url.trim_end_matches('/'),
            path
        );
        let response = self
            .execute(connection, "list uss children", self.http(connection).get(url))
            .await?;
        if !response.is_success() {
            return Err(OpsError::RemoteCallFailed {
                call: format!("list children of '{}'", path),
                connection: connection.name.clone(),
                status: response.status,
                body: response.body,
            });
        }
        let listing: UssList = serde_json::from_str(response.body.as_deref().unwrap_or("{}"))
            .map_err(|err| OpsError::Transport {
                call: format!("list children of '{}'", path),
                connection: connection.name.clone(),
                reason: format!("invalid listing body: {}", err),
            })?;
        Ok(listing
            .items
            .into_iter()
            .filter(|item| item.name != "." && item.name != "..")
            .map(|item| {
                let mode = item.mode.unwrap_or_default();
                UssChild {
                    name: item.name,
                    is_directory: mode.starts_with('d'),
                    symlink_target: if mode.starts_with('l') {
                        Some(item.target.unwrap_or_default())
                    } else {
                        None
                    },
                }
            })
            .collect())
    }
}
