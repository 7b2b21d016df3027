use thiserror::Error;

/// Failures while encoding, decoding or restoring a [`Snapshot`](super::Snapshot).
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("could not encode snapshot: {0}")]
    Encode(String),

    #[error("could not decode snapshot: {0}")]
    Decode(String),

    /// The snapshot was written by a different format version.
    #[error("snapshot format {found} is not readable, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The snapshot names states, scopes, transitions or signals the target
    /// machine does not have. Nothing was restored.
    #[error("snapshot does not fit this machine: {}", .0.join("; "))]
    TopologyMismatch(Vec<String>),
}
