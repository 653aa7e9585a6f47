//! Small wgpu helpers for uniform buffers and their bindings

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::{uniform, uniform_entry, uniform_layout};
pub use uniform_buffer::{padded_size, RawUniformBuffer, UniformBuffer};
