//! WGSL shading programs: loading, reflection and uniform updates

pub mod backend;
pub mod library;
pub mod reflect;

pub use backend::{ProgramId, ShaderBackend, UniformDescriptor, UniformKind};
pub use library::{ShaderLibrary, ShaderProgram, ShaderSource, UniformBlock, PARAMS_BINDING, PARAMS_GROUP};
pub use reflect::{reflect, BlockLayout, Reflection};
