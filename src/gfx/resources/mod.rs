//! GPU resource management
//!
//! Render targets owned by the render engine.

pub mod texture_resource;

pub use texture_resource::TextureResource;
