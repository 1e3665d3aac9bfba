//! Operation-dispatch and file-transfer engine for remote mainframe
//! storage. A fixed, ordered chain of runners maps each move, copy,
//! allocate, delete or rename onto the narrow object-specific remote calls
//! the system actually exposes, staging content locally whenever the two
//! systems involved share no connection.

pub mod allocator;
pub mod batch;
pub mod client;
pub mod config;
pub mod delete;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mover;
pub mod rename;
pub mod runner;
pub mod store;
pub mod sync;
pub mod zosmf;

// Re-export commonly used types
pub use batch::{run_batch, BatchOutcome, BatchProgress};
pub use client::RemoteCallClient;
pub use config::EngineConfig;
pub use engine::{standard_runners, DataOpsEngine};
pub use error::{OpsError, OpsResult};
pub use runner::OperationRunner;
pub use store::{AttributesStore, InMemoryAttributesStore};
pub use sync::{ContentSynchronizer, StagedContent};
pub use zosmf::ZosmfClient;

// Expose the protocol crate directly for convenience (e.g.
// `zmove::protocol::MoveCopyOperation`).
pub use zmove_protocol as protocol;
