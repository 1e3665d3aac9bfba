//! Shared data model for the zmove engine: operations, remote attribute
//! snapshots, connection routes and the wire bodies of the narrow remote
//! calls the transfer engine is built from.

pub mod attributes;
pub mod calls;
pub mod connection;
pub mod handle;
pub mod operation;

pub use attributes::{
    DatasetAttributes, DatasetOrganization, FileAttributes, FileMode, MemberAttributes, Requester,
    UssAttributes,
};
pub use calls::{
    ContentType, CopyDatasetToUss, CopyFromDataset, CopyFromUss, CopyFromUssFile, CreateUssItem,
    MoveUss, RemoteResponse, RenameData, UssChild, UssItemKind, EMPTY_DATASET_MESSAGE,
    TRUNCATION_MESSAGE,
};
pub use connection::ConnectionConfig;
pub use handle::{FileHandle, FileOrigin};
pub use operation::{
    AllocationOperation, AllocationParams, AllocationUnit, DatasetAllocationParams,
    DeleteOperation, MemberAllocationParams, MoveCopyOperation, Operation, RecordFormat,
    RenameOperation, UssAllocationParams,
};
