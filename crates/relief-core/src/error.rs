use thiserror::Error;

/// Errors that can occur while starting the viewer and during its frame loop.
#[derive(Debug, Error)]
pub enum ReliefError {
    #[error("WebGPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),

    #[error("Surface configuration failed: {0}")]
    SurfaceConfigFailed(String),

    #[error("Failed to load map data: {0}")]
    DataLoad(String),

    #[error("Required page element missing: {0}")]
    MissingElement(String),

    #[error("Browser API call failed: {0}")]
    Browser(String),

    #[error("Failed to parse map config RON: {0}")]
    ConfigParseError(String),
}
