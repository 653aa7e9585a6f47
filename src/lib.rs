//! Tinkerbox 3D Sandbox
//!
//! An interactive wgpu/winit scene viewer whose imgui panels edit shader
//! uniforms, object transforms and render state while the scene runs.

use std::cell::RefCell;
use std::rc::Rc;

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

pub use app::SandboxApp;
pub use config::SandboxConfig;
pub use error::{Result, SandboxError};

/// Single-threaded shared state, as captured by UI commands.
pub type Shared<T> = Rc<RefCell<T>>;

/// Creates a sandbox with the default configuration
pub fn default() -> Result<SandboxApp> {
    SandboxApp::new(SandboxConfig::default())
}
