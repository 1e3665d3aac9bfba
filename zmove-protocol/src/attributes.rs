use crate::connection::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (connection, remote identifier) pair through which an object is
/// reachable. The identifier is the dataset name or USS path as seen
/// through that particular connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub connection: ConnectionConfig,
    pub remote_name: String,
}

impl Requester {
    pub fn new(connection: ConnectionConfig, remote_name: impl Into<String>) -> Self {
        Self {
            connection,
            remote_name: remote_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetOrganization {
    /// Physical sequential.
    #[serde(rename = "PS")]
    Ps,
    /// Partitioned.
    #[serde(rename = "PO")]
    Po,
    /// Partitioned extended (PDS/E).
    #[serde(rename = "PO-E")]
    PoE,
}

impl DatasetOrganization {
    pub fn is_partitioned(self) -> bool {
        matches!(self, DatasetOrganization::Po | DatasetOrganization::PoE)
    }
}

impl fmt::Display for DatasetOrganization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatasetOrganization::Ps => write!(f, "PS"),
            DatasetOrganization::Po => write!(f, "PO"),
            DatasetOrganization::PoE => write!(f, "PO-E"),
        }
    }
}

impl FromStr for DatasetOrganization {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PS" => Ok(DatasetOrganization::Ps),
            "PO" => Ok(DatasetOrganization::Po),
            "PO-E" | "POE" => Ok(DatasetOrganization::PoE),
            _ => Err(anyhow::anyhow!("Invalid dataset organization: {}", s)),
        }
    }
}

/// Octal permission triple for USS files, `7,5,5` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMode {
    pub owner: u8,
    pub group: u8,
    pub other: u8,
}

impl FileMode {
    pub const ALL: FileMode = FileMode {
        owner: 7,
        group: 7,
        other: 7,
    };

    pub fn new(owner: u8, group: u8, other: u8) -> Self {
        Self { owner, group, other }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.owner, self.group, self.other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetAttributes {
    pub name: String,
    pub organization: DatasetOrganization,
    pub volume: Option<String>,
    pub requesters: Vec<Requester>,
}

impl DatasetAttributes {
    pub fn is_library(&self) -> bool {
        self.organization.is_partitioned()
    }
}

/// A partitioned-dataset member. Members are reachable through the
/// connections of their owning library, hence the back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAttributes {
    pub name: String,
    pub library: DatasetAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssAttributes {
    pub path: String,
    pub is_directory: bool,
    /// Target path when the object is a symbolic link.
    pub symlink_target: Option<String>,
    pub file_mode: Option<FileMode>,
    pub requesters: Vec<Requester>,
}

impl UssAttributes {
    pub fn name(&self) -> &str {
        self.path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(&self.path)
    }

    pub fn is_symlink(&self) -> bool {
        self.symlink_target.is_some()
    }

    /// Parent directory path, `/` for top-level objects.
    pub fn parent_dir_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.path[..idx],
        }
    }
}

/// Remote classification of a file handle. A closed set: every remote
/// object the engine can touch is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileAttributes {
    Dataset(DatasetAttributes),
    Member(MemberAttributes),
    Uss(UssAttributes),
}

impl FileAttributes {
    /// Requesters through which this object is reachable. For members this
    /// resolves to the owning library's requesters.
    pub fn requesters(&self) -> &[Requester] {
        match self {
            FileAttributes::Dataset(attrs) => &attrs.requesters,
            FileAttributes::Member(attrs) => &attrs.library.requesters,
            FileAttributes::Uss(attrs) => &attrs.requesters,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileAttributes::Dataset(attrs) => &attrs.name,
            FileAttributes::Member(attrs) => &attrs.name,
            FileAttributes::Uss(attrs) => attrs.name(),
        }
    }

    /// Whether the object behaves as a container: a partitioned dataset or
    /// a USS directory.
    pub fn is_directory(&self) -> bool {
        match self {
            FileAttributes::Dataset(attrs) => attrs.is_library(),
            FileAttributes::Member(_) => false,
            FileAttributes::Uss(attrs) => attrs.is_directory,
        }
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, FileAttributes::Uss(attrs) if attrs.is_symlink())
    }

    /// Short classification used in dispatch failures and log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FileAttributes::Dataset(attrs) if attrs.is_library() => "partitioned dataset",
            FileAttributes::Dataset(_) => "sequential dataset",
            FileAttributes::Member(_) => "dataset member",
            FileAttributes::Uss(attrs) if attrs.is_directory => "uss directory",
            FileAttributes::Uss(_) => "uss file",
        }
    }
}
