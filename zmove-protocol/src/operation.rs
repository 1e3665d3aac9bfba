use crate::attributes::{DatasetOrganization, FileAttributes, FileMode};
use crate::connection::ConnectionConfig;
use crate::handle::FileHandle;
use crate::calls::UssItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Immutable description of a move or copy. Carries everything needed to
/// dispatch it without further lookups: handles, attribute snapshots and the
/// requested options. The attribute snapshots, when present, are trusted to
/// match the handles' actual remote classification at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCopyOperation {
    pub source: FileHandle,
    /// None for plain local files, which have no remote classification.
    pub source_attributes: Option<FileAttributes>,
    pub destination: FileHandle,
    pub destination_attributes: Option<FileAttributes>,
    pub is_move: bool,
    pub force_overwriting: bool,
    pub new_name: Option<String>,
    /// Owning working-set name, carried for cache invalidation only.
    pub unit: Option<String>,
}

impl MoveCopyOperation {
    /// Connections through which both source and destination are reachable,
    /// in source-requester order. Members resolve through their owning
    /// library. Empty means there is no same-system route and the operation
    /// must be handled by a cross-system mover.
    pub fn common_connections(&self) -> Vec<ConnectionConfig> {
        let (Some(source), Some(dest)) = (&self.source_attributes, &self.destination_attributes)
        else {
            return Vec::new();
        };
        source
            .requesters()
            .iter()
            .map(|r| &r.connection)
            .filter(|conn| dest.requesters().iter().any(|r| &r.connection == *conn))
            .cloned()
            .collect()
    }

    /// Name the transferred object gets at the destination.
    pub fn effective_name(&self) -> &str {
        self.new_name.as_deref().unwrap_or(&self.source.name)
    }

    pub fn verb(&self) -> &'static str {
        if self.is_move {
            "move"
        } else {
            "copy"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOperation {
    pub file: FileHandle,
    pub attributes: FileAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOperation {
    pub file: FileHandle,
    pub attributes: FileAttributes,
    pub new_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationUnit {
    #[serde(rename = "TRK")]
    Trk,
    #[serde(rename = "CYL")]
    Cyl,
}

impl fmt::Display for AllocationUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocationUnit::Trk => write!(f, "TRK"),
            AllocationUnit::Cyl => write!(f, "CYL"),
        }
    }
}

impl FromStr for AllocationUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRK" => Ok(AllocationUnit::Trk),
            "CYL" => Ok(AllocationUnit::Cyl),
            _ => Err(anyhow::anyhow!("Invalid allocation unit: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordFormat {
    F,
    FB,
    V,
    VB,
    U,
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Parameters for allocating a new dataset, serialized as the create-call
/// body with the remote field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetAllocationParams {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "alcunit")]
    pub allocation_unit: AllocationUnit,
    #[serde(rename = "primary")]
    pub primary_allocation: u32,
    #[serde(rename = "secondary")]
    pub secondary_allocation: u32,
    #[serde(rename = "recfm")]
    pub record_format: RecordFormat,
    #[serde(rename = "dsorg")]
    pub organization: DatasetOrganization,
    #[serde(rename = "lrecl")]
    pub record_length: u32,
    #[serde(rename = "dirblk", skip_serializing_if = "Option::is_none")]
    pub directory_blocks: Option<u32>,
}

impl DatasetAllocationParams {
    pub fn sequential(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allocation_unit: AllocationUnit::Trk,
            primary_allocation: 1,
            secondary_allocation: 0,
            record_format: RecordFormat::FB,
            organization: DatasetOrganization::Ps,
            record_length: 80,
            directory_blocks: None,
        }
    }

    pub fn partitioned(name: impl Into<String>) -> Self {
        Self {
            organization: DatasetOrganization::Po,
            directory_blocks: Some(10),
            ..Self::sequential(name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssAllocationParams {
    pub path: String,
    pub kind: UssItemKind,
    pub mode: FileMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAllocationParams {
    pub dataset: String,
    pub member: String,
}

/// What to create, tagged by request type. Allocators are selected by this
/// tag alone, never by source/destination classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationParams {
    Dataset(DatasetAllocationParams),
    Uss(UssAllocationParams),
    Member(MemberAllocationParams),
}

impl AllocationParams {
    pub fn target_name(&self) -> String {
        match self {
            AllocationParams::Dataset(params) => params.name.clone(),
            AllocationParams::Uss(params) => params.path.clone(),
            AllocationParams::Member(params) => format!("{}({})", params.dataset, params.member),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOperation {
    pub connection: ConnectionConfig,
    pub params: AllocationParams,
}

/// The full operation vocabulary accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    MoveCopy(MoveCopyOperation),
    Delete(DeleteOperation),
    Rename(RenameOperation),
    Allocate(AllocationOperation),
}

impl Operation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::MoveCopy(op) if op.is_move => "move",
            Operation::MoveCopy(_) => "copy",
            Operation::Delete(_) => "delete",
            Operation::Rename(_) => "rename",
            Operation::Allocate(_) => "allocate",
        }
    }
}
