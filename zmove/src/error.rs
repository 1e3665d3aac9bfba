use thiserror::Error;

/// Error types surfaced by the dispatch and transfer engine.
///
/// Every surfaced error names the remote object(s) and the connection
/// involved; callers never see a bare transport backtrace.
#[derive(Error, Debug)]
pub enum OpsError {
    // Dispatch errors
    #[error("No runner accepts {operation} from {source_kind} to {destination_kind}")]
    NoHandlerFound {
        operation: String,
        source_kind: String,
        destination_kind: String,
    },

    // Remote call errors
    #[error("{call} failed on {connection}: status {status}{}", format_body(.body))]
    RemoteCallFailed {
        call: String,
        connection: String,
        status: u16,
        body: Option<String>,
    },

    #[error("Could not reach {connection} for {call}: {reason}")]
    Transport {
        call: String,
        connection: String,
        reason: String,
    },

    // Multi-step transfer errors
    #[error("{cause} Rollback {}.", rollback_text(.rollback_succeeded))]
    PartialFailureWithRollback {
        cause: String,
        rollback_succeeded: bool,
    },

    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },

    #[error("Missing {collaborator} for file '{file}'")]
    MissingCollaborator { collaborator: String, file: String },

    #[error("Operation cancelled")]
    Cancelled,

    // Allocation / naming errors
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),
}

fn format_body(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.is_empty() => format!(": {}", text),
        _ => String::new(),
    }
}

fn rollback_text(succeeded: &bool) -> &'static str {
    if *succeeded {
        "proceeded successfully"
    } else {
        "failed"
    }
}

impl OpsError {
    /// Transport failures are the only errors worth retrying against another
    /// common connection; a remote rejection would just repeat itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, OpsError::Transport { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OpsError::Cancelled)
    }

    /// Wraps a failed transfer error into the partial-failure shape after a
    /// rollback attempt, preserving the original cause text.
    pub fn with_rollback_outcome(self, rollback_succeeded: bool) -> OpsError {
        OpsError::PartialFailureWithRollback {
            cause: self.to_string(),
            rollback_succeeded,
        }
    }
}

/// Result type alias for engine operations.
pub type OpsResult<T> = Result<T, OpsError>;
