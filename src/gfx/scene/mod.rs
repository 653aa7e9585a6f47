//! # Scene Management Module
//!
//! The scene is a flat, name-ordered set of [`GameObject`]s. Each object
//! owns its [`Mesh`], names the shader it is drawn with and carries a
//! position/rotation/scale transform whose model matrix is rebuilt on every
//! change.
//!
//! ```no_run
//! use tinkerbox::gfx::geometry::generate_sphere;
//! use tinkerbox::gfx::scene::{GameObject, Mesh, Scene};
//!
//! let mut scene = Scene::new();
//! scene
//!     .add_object(GameObject::new("ball", Mesh::from(generate_sphere(32, 16)), "phong"))
//!     .set_position([0.0, 1.0, 0.0]);
//! ```

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, GameObject, Mesh};
pub use scene::Scene;
pub use vertex::Vertex3D;
