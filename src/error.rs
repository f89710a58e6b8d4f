//! Error type shared by every fallible terrain operation.

/// Errors produced while configuring or building terrain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A configuration value was rejected before any work started.
    #[error("invalid terrain configuration: {0}")]
    InvalidConfiguration(String),

    /// Classification selected a texture index the UV table does not contain.
    #[error("texture index {index} is missing from the UV table ({available} entries)")]
    MissingTexture { index: usize, available: usize },
}

impl TerrainError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
