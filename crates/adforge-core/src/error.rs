//! Core error types for the Adforge renderer.

/// A specialized Result type for Adforge operations.
pub type AdResult<T> = Result<T, AdError>;

/// Top-level error type encompassing all Adforge subsystems.
#[derive(Debug, thiserror::Error)]
pub enum AdError {
    /// A font could not be resolved or parsed. Fatal for the render pass.
    #[error("font error: {0}")]
    Font(String),

    #[error("asset error: {message} ({reference})")]
    Asset { message: String, reference: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdError {
    /// Create an asset error for an image or font reference.
    pub fn asset(message: impl Into<String>, reference: impl Into<String>) -> Self {
        AdError::Asset {
            message: message.into(),
            reference: reference.into(),
        }
    }

    pub fn font(message: impl Into<String>) -> Self {
        AdError::Font(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        AdError::Render(message.into())
    }
}
