use crate::error::OpsResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use zmove_protocol::{ContentType, FileHandle};

/// Byte content staged on the workstation, ready for re-upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedContent {
    pub bytes: Vec<u8>,
    pub content_type: ContentType,
}

impl StagedContent {
    pub fn text(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: ContentType::Text,
        }
    }

    pub fn binary(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: ContentType::Binary,
        }
    }
}

/// External collaborator that keeps a file's local byte content in step
/// with its remote copy. Cross-system movers stage through it because the
/// two remote systems cannot exchange bytes directly.
#[async_trait]
pub trait ContentSynchronizer: Send + Sync {
    /// Whether this synchronizer manages the given file at all. Movers must
    /// fail fast with `MissingCollaborator` when no synchronizer accepts a
    /// file that needs staging.
    fn accepts(&self, file: &FileHandle) -> bool;

    /// Pulls the file's current remote bytes into the local representation
    /// and returns them together with the detected content type.
    async fn fetch(&self, file: &FileHandle, token: &CancellationToken) -> OpsResult<StagedContent>;
}

/// Content-type detection for files with no remote classification, e.g.
/// plain local files picked up from the workstation.
pub fn detect_content_type(bytes: &[u8]) -> ContentType {
    if bytes.contains(&0) || std::str::from_utf8(bytes).is_err() {
        ContentType::Binary
    } else {
        ContentType::Text
    }
}

/// Line discipline for text staged into fixed-record targets: record
/// separators become LF and the content always ends with one.
pub fn normalize_text_records(bytes: Vec<u8>) -> Vec<u8> {
    let text = String::from_utf8_lossy(&bytes).replace("\r\n", "\n");
    let mut out = text.into_bytes();
    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }
    out
}
