use crate::attributes::FileMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error-body fragment the remote side emits when a record was truncated
/// while writing into a fixed-record-length target. The data landed; the
/// condition is reported as success to the caller.
pub const TRUNCATION_MESSAGE: &str = "Truncation of a record occurred during an I/O operation.";

/// Error-body fragment for copying out of an empty sequential dataset.
/// Nothing needed to be transferred, so the copy is treated as successful.
pub const EMPTY_DATASET_MESSAGE: &str = "data set is empty";

/// Outcome of one remote call that actually reached the remote system.
/// Transport-level failures never produce a `RemoteResponse`; they surface
/// as a dedicated error so callers can fall back to another connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl RemoteResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    pub fn failure(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_contains(&self, fragment: &str) -> bool {
        self.body.as_deref().is_some_and(|b| b.contains(fragment))
    }
}

/// Transfer mode for content writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Binary,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContentType::Text => write!(f, "text"),
            ContentType::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "binary" => Ok(ContentType::Binary),
            _ => Err(anyhow::anyhow!("Invalid content type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UssItemKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "directory")]
    Directory,
}

impl fmt::Display for UssItemKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UssItemKind::File => write!(f, "file"),
            UssItemKind::Directory => write!(f, "directory"),
        }
    }
}

/// One entry of a USS directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssChild {
    pub name: String,
    pub is_directory: bool,
    /// Present when the entry is a symbolic link.
    pub symlink_target: Option<String>,
}

/// Body of a copy into a dataset or member, sourced from another dataset
/// or member on the same system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFromDataset {
    #[serde(rename = "dsn")]
    pub dataset: String,
    #[serde(rename = "member", skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub replace: bool,
}

/// Body of a copy from a dataset or member onto a USS path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyDatasetToUss {
    #[serde(rename = "dsn")]
    pub dataset: String,
    #[serde(rename = "member", skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

/// Body of a USS-to-USS copy on one system. The remote side performs the
/// recursion itself, so directory copies are still a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFromUss {
    pub from: String,
    pub overwrite: bool,
    pub recursive: bool,
}

/// Body of a copy from a USS file into a dataset member on the same
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFromUssFile {
    #[serde(rename = "file")]
    pub path: String,
    #[serde(rename = "type")]
    pub copy_type: ContentType,
    pub replace: bool,
}

/// Body of a USS-to-USS move (also the rename primitive for USS objects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveUss {
    pub from: String,
}

/// Body of a USS file or directory creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUssItem {
    #[serde(rename = "type")]
    pub kind: UssItemKind,
    pub mode: FileMode,
}

/// Body of a dataset or member rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameData {
    #[serde(rename = "from-dataset")]
    pub dataset: String,
    #[serde(rename = "member", skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}
