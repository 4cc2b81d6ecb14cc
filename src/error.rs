//! Error type shared by every layer of the engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ButtonError {
    #[error("Asset missing: {0}")]
    AssetMissing(String),

    #[error("Instance {index} out of range (button has {count})")]
    InvalidInstance { index: usize, count: usize },

    #[error("Raster allocation failed ({width}x{height})")]
    AllocationFailure { width: usize, height: usize },

    #[error("Protocol transport not available")]
    ProtocolUnavailable,

    #[error("Invalid draw order \"{0}\"")]
    InvalidDrawOrder(String),

    #[error("Invalid button definition: {0}")]
    InvalidDefinition(String),

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Remote fetch failed: {0}")]
    Fetch(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Button {0} has been destroyed")]
    Destroyed(String),
}

impl ButtonError {
    /// Errors that only degrade a single layer instead of failing the render
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            ButtonError::AssetMissing(_) | ButtonError::Decode(_) | ButtonError::Fetch(_)
        )
    }
}

impl From<image::ImageError> for ButtonError {
    fn from(e: image::ImageError) -> Self {
        ButtonError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ButtonError>;
