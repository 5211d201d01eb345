pub type NameplateResult<T> = Result<T, NameplateError>;

/// Top-level error taxonomy used by all nameplate APIs.
#[derive(thiserror::Error, Debug)]
pub enum NameplateError {
    /// Bad or missing input, or a required resource is absent. Never worth
    /// retrying: the caller or the configuration is wrong.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external rasterizer failed (spawn error, non-zero exit, or
    /// malformed output).
    #[error("render error: {0}")]
    Render(String),

    /// Directory or file creation/verification failed.
    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NameplateError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self::Filesystem(msg.into())
    }

    /// Inner message without the taxonomy prefix, for embedding in
    /// caller-facing strings.
    pub fn detail(&self) -> String {
        match self {
            Self::Configuration(m) | Self::Render(m) | Self::Filesystem(m) => m.clone(),
            Self::Other(e) => e.to_string(),
        }
    }
}
