//! # Tinkerbox Prelude
//!
//! Commonly used types in one import:
//!
//! ```no_run
//! use tinkerbox::prelude::*;
//!
//! fn main() -> tinkerbox::Result<()> {
//!     let mut app = tinkerbox::default()?;
//!     let strength = FloatSlider::new("Strength", 1.0, 0.0, 4.0);
//!     let value = strength.handle();
//!     app.ui_mut()
//!         .add_panel("Demo", "Demo")
//!         .add("Strength", strength)
//!         .bind(Command::new(move || log::info!("strength {}", value.get())));
//!     app.run()
//! }
//! ```

pub use crate::app::SandboxApp;
pub use crate::config::{CameraConfig, SandboxConfig, WindowConfig};
pub use crate::default;

pub use crate::gfx::camera::{CameraController, OrbitCamera};
pub use crate::gfx::geometry::{generate_cube, generate_plane, generate_sphere, GeometryData};
pub use crate::gfx::rendering::{PolygonMode, RenderSettings};
pub use crate::gfx::scene::{GameObject, Mesh, Scene};
pub use crate::gfx::shader::{ShaderLibrary, ShaderSource};

pub use crate::ui::{
    Button, Checkbox, Command, FloatSlider, Label, Panel, Selector, ShaderReflectionGenerator,
    UiContext, Vec3Slider,
};
