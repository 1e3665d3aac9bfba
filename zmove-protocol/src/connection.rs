use serde::{Deserialize, Serialize};
use std::fmt;

/// One configured route to a remote system.
///
/// The same remote object can be reachable through several connections, so
/// equality (used by common-connection resolution) compares the connection
/// identity, not the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Human-readable connection name, unique among configured connections.
    pub name: String,
    /// Base URL of the remote REST endpoint.
    pub url: String,
    /// Opaque per-connection credential, supplied by the embedder.
    pub auth_token: String,
    pub allow_self_signed: bool,
}

impl ConnectionConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            auth_token: auth_token.into(),
            allow_self_signed: false,
        }
    }
}

impl PartialEq for ConnectionConfig {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.url == other.url
    }
}

impl Eq for ConnectionConfig {}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The token must never end up in log output.
        write!(f, "{} ({})", self.name, self.url)
    }
}
