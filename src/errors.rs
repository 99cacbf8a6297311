//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! [`TesseraError`] is split into four groups:
//! - Configuration errors, raised synchronously while a scene or a piece of
//!   geometry is being constructed
//! - Resource errors (GPU context, shader compilation, asset loading), which
//!   carry the diagnostic text produced by the driver or loader
//! - Consistency errors, raised at the point where data is aggregated
//! - Unrecoverable errors, propagated to the caller as-is
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, TesseraError>`.
//!
//! ```rust,ignore
//! use tessera::errors::{Result, TesseraError};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum TesseraError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A required constructor argument was not supplied.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A render mode that the element kind does not accept.
    #[error("Render mode {mode} is not valid for {element} elements")]
    InvalidRenderMode {
        /// Element kind being constructed
        element: &'static str,
        /// The rejected mode
        mode: String,
    },

    /// An option value outside its accepted set.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// A face needs at least three vertices.
    #[error("A face needs at least 3 vertices, got {0}")]
    InsufficientVertices(usize),

    /// A variable descriptor without a usable kind or type.
    #[error("Invalid variable descriptor: {0}")]
    InvalidVariable(String),

    /// A variable name that does not follow the prefix convention of its kind.
    #[error("Variable `{name}` must start with `{expected}`")]
    InvalidVariableName {
        /// Offending name
        name: String,
        /// Required prefix
        expected: &'static str,
    },

    /// A variable that the shader generator cannot express.
    #[error("Variable `{name}` of type {ty} cannot be generated")]
    UnsupportedVariable {
        /// Variable name
        name: String,
        /// Its GL type name
        ty: &'static str,
    },

    /// More unique vertices than a 16-bit index buffer can address.
    #[error("Too many unique vertices for a 16-bit index buffer: {0}")]
    IndexOverflow(usize),

    /// A scene configuration document that could not be decoded.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The shape key does not belong to this scene.
    #[error("Shape not found in scene")]
    UnknownShape,

    /// The camera id does not belong to this scene.
    #[error("Camera `{0}` not found in scene")]
    UnknownCamera(String),

    /// The light id does not belong to this scene.
    #[error("Light `{0}` not found in scene")]
    UnknownLight(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Shader source failed to compile or link. Carries the driver log.
    #[error("Failed to build program `{key}`:\n{log}")]
    ShaderCompile {
        /// Program key name
        key: String,
        /// Diagnostic log from the GPU driver
        log: String,
    },

    /// Shader template rendering failed.
    #[error("Shader template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A GPU handle that the context does not know about.
    #[error("Unknown GPU resource: {0}")]
    UnknownResource(String),

    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A malformed line in an obj or mtl document.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A relative asset path could not be resolved against its base.
    #[error("Invalid asset url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Consistency Errors
    // ========================================================================
    /// Per-vertex texture coordinates do not line up with the vertices.
    #[error("Texture coordinate count {coords} does not match vertex count {vertices}")]
    TextureCoordMismatch {
        /// Number of vertices on the shape
        vertices: usize,
        /// Number of coordinates supplied
        coords: usize,
    },

    /// Two animation clips overlap in time on the same target.
    #[error("Clip `{clip}` overlaps another clip on the same target ({start}..{end} ms)")]
    AnimationConflict {
        /// Id of the rejected clip
        clip: String,
        /// Clip start in milliseconds
        start: f32,
        /// Clip end in milliseconds
        end: f32,
    },

    // ========================================================================
    // Unrecoverable Errors
    // ========================================================================
    /// No GPU context could be obtained.
    #[error("GPU context unavailable: {0}")]
    ContextUnavailable(String),

    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),
}

/// Alias for `Result<T, TesseraError>`.
pub type Result<T> = std::result::Result<T, TesseraError>;
