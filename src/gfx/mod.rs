//! # Graphics Module
//!
//! Everything the sandbox draws with:
//!
//! - **Camera System** ([`camera`]) - Orbit camera and its input controller
//! - **Geometry** ([`geometry`]) - Procedural cube, sphere and plane meshes
//! - **Rendering Pipeline** ([`rendering`]) - Pipeline cache and frame rendering
//! - **Scene Management** ([`scene`]) - Named game objects with transforms
//! - **Shaders** ([`shader`]) - WGSL programs, reflection and uniform values
//! - **Resource Management** ([`resources`]) - Render target textures
//!
//! ```no_run
//! use tinkerbox::gfx::{OrbitCamera, scene::Scene};
//!
//! let camera = OrbitCamera::default();
//! let scene = Scene::new();
//! // let engine = RenderEngine::new(window, width, height, settings.present_mode()).await?;
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shader;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
