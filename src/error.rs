//! Error types for tinkerbox
//!
//! Only the plumbing around the sandbox (shader files, GPU setup, the event
//! loop) can fail. The parameter-editing core reports absence through
//! `Option` and never returns these errors.

use std::path::PathBuf;

/// Errors raised while loading shaders or bringing up the window and GPU.
#[derive(thiserror::Error, Debug)]
pub enum SandboxError {
    /// Reading a shader source file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// WGSL source did not parse
    #[error("shader '{name}' failed to parse:\n{message}")]
    ShaderParse { name: String, message: String },

    /// WGSL parsed but did not validate
    #[error("shader '{name}' failed validation: {message}")]
    ShaderValidation { name: String, message: String },

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
