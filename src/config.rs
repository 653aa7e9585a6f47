//! Startup configuration
//!
//! Everything the sandbox needs before the first frame: window size, camera
//! parameters and the shaders to load. All types have sensible defaults and
//! `with_*` builders, e.g.
//!
//! ```
//! use tinkerbox::config::SandboxConfig;
//!
//! let config = SandboxConfig::default()
//!     .with_title("my sandbox")
//!     .with_size(800, 600)
//!     .with_demo_objects(3);
//! assert_eq!(config.window.width, 800);
//! ```

use std::path::PathBuf;

use cgmath::{Deg, Point3};

use crate::gfx::camera::OrbitCameraBounds;

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "tinkerbox".to_string(),
            width: 1200,
            height: 800,
            vsync: true,
        }
    }
}

/// Initial orbit camera state and input sensitivities.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Degrees of yaw/pitch per pixel of drag.
    pub orbit_sensitivity: f32,
    /// World units per pixel of drag.
    pub pan_sensitivity: f32,
    /// World units per scroll step.
    pub zoom_sensitivity: f32,
    pub bounds: OrbitCameraBounds,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            distance: 10.0,
            yaw: Deg(0.0),
            pitch: Deg(20.0),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 1000.0,
            orbit_sensitivity: 0.25,
            pan_sensitivity: 0.01,
            zoom_sensitivity: 0.5,
            bounds: OrbitCameraBounds::default(),
        }
    }
}

/// A shader to load at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderEntry {
    pub name: String,
    pub path: PathBuf,
}

impl ShaderEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// A shader shipped in the crate's `shaders/` directory.
    pub fn bundled(name: &str) -> Self {
        Self::new(
            name,
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("shaders")
                .join(format!("{name}.wgsl")),
        )
    }
}

/// Defaults for sliders synthesized from shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderDefaults {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for SliderDefaults {
    fn default() -> Self {
        Self {
            value: 0.0,
            min: -10.0,
            max: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub shaders: Vec<ShaderEntry>,
    /// Number of randomly placed spheres added next to the fixed demo scene.
    pub demo_objects: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            shaders: vec![ShaderEntry::bundled("phong"), ShaderEntry::bundled("normals")],
            demo_objects: 4,
        }
    }
}

impl SandboxConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.window.vsync = vsync;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Adds a shader, replacing any entry with the same name.
    pub fn with_shader(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let entry = ShaderEntry::new(name, path);
        self.shaders.retain(|s| s.name != entry.name);
        self.shaders.push(entry);
        self
    }

    pub fn with_demo_objects(mut self, count: usize) -> Self {
        self.demo_objects = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SandboxConfig::default();
        assert_eq!((config.window.width, config.window.height), (1200, 800));
        assert_eq!(config.camera.distance, 10.0);
        assert_eq!(config.camera.bounds.min_distance, Some(0.1));
        assert_eq!(config.camera.bounds.max_distance, Some(200.0));

        let names: Vec<_> = config.shaders.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["phong", "normals"]);
        assert!(config.shaders[0].path.ends_with("shaders/phong.wgsl"));
    }

    #[test]
    fn test_with_shader_replaces_by_name() {
        let config = SandboxConfig::default()
            .with_shader("phong", "custom/phong.wgsl")
            .with_shader("toon", "custom/toon.wgsl");

        assert_eq!(config.shaders.len(), 3);
        let phong = config.shaders.iter().find(|s| s.name == "phong").unwrap();
        assert_eq!(phong.path, PathBuf::from("custom/phong.wgsl"));
    }

    #[test]
    fn test_slider_defaults() {
        let defaults = SliderDefaults::default();
        assert_eq!((defaults.value, defaults.min, defaults.max), (0.0, -10.0, 10.0));
    }
}
