//! Error Types
//!
//! The main error type [`VitrineError`] covers every failure mode that can
//! abort startup: GPU initialization, shader compilation, resource creation,
//! and asset decoding. Once startup has succeeded, per-frame code paths are
//! infallible by design.
//!
//! All public fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, VitrineError>`.

use thiserror::Error;

/// The main error type for the vitrine renderer.
#[derive(Error, Debug)]
pub enum VitrineError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter or surface.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// A GPU resource could not be created in a usable state: an invalid
    /// render-target attachment, a zero-sized uniform buffer, and the like.
    /// Fatal for the pipeline stage that hit it.
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Shader compilation or validation failure. Returned to the caller so
    /// startup can abort instead of limping on with an unusable program.
    #[error("Shader {stage:?} failed to compile: {log}")]
    Compile {
        /// Which program the failure was reported for.
        stage: String,
        /// The compiler's diagnostic output.
        log: String,
    },

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// Malformed asset bytes: a bad RGBE header, a corrupted scanline, a
    /// scene document that does not match the schema. Fatal for that load.
    #[error("Asset decode error: {0}")]
    AssetDecode(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, VitrineError>`.
pub type Result<T> = std::result::Result<T, VitrineError>;
