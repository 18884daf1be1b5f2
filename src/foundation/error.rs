/// Convenience result type used across the crate.
pub type NebulaResult<T> = Result<T, NebulaError>;

/// Top-level error taxonomy used by the backdrop APIs.
#[derive(thiserror::Error, Debug)]
pub enum NebulaError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The rendering stage cannot accept work (suspended, lost or never attached).
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// A component buffer could not be allocated at mount.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A component was used after it was disposed.
    #[error("component disposed: {0}")]
    Disposed(String),

    /// Errors while rasterizing or encoding a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NebulaError {
    /// Build a [`NebulaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NebulaError::ContextUnavailable`] value.
    pub fn context_unavailable(msg: impl Into<String>) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    /// Build a [`NebulaError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`NebulaError::Disposed`] value.
    pub fn disposed(msg: impl Into<String>) -> Self {
        Self::Disposed(msg.into())
    }

    /// Build a [`NebulaError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`NebulaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures that should degrade the backdrop to its placeholder.
    pub fn is_mount_failure(&self) -> bool {
        matches!(self, Self::ContextUnavailable(_) | Self::Allocation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
