//! The narrow interface the UI core needs from the shading backend

use std::fmt;

use super::library::{PARAMS_BINDING, PARAMS_GROUP};

/// Identifier of one successful compile of a shading program.
///
/// `ProgramId(0)` means "no usable program" (never compiled, or the last
/// compile failed). Every successful compile gets a fresh id, so a command
/// holding an old id stops affecting the program once it is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramId(pub u32);

impl ProgramId {
    pub const INVALID: ProgramId = ProgramId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared type of a reflected uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    UInt,
    Bool,
    Mat3,
    Mat4,
    Sampler,
    Texture,
    Other,
}

/// One active uniform as reported by reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor {
    /// Member name; array members are reported as `name[0]`.
    pub name: String,
    pub kind: UniformKind,
    /// Element count for arrays, `None` otherwise.
    pub array_len: Option<u32>,
    pub group: u32,
    pub binding: u32,
    /// Byte offset inside the owning uniform block.
    pub offset: u32,
}

impl UniformDescriptor {
    pub fn is_array(&self) -> bool {
        self.array_len.is_some() || self.name.contains('[')
    }

    /// True for members of the `@group(2) @binding(0)` parameter block, the
    /// only block the renderer uploads from the CPU copy.
    pub fn is_parameter(&self) -> bool {
        self.group == PARAMS_GROUP && self.binding == PARAMS_BINDING
    }
}

/// Compile, query and update shading programs by name.
///
/// Writes against an invalid or stale program, or an unknown uniform, are
/// ignored.
pub trait ShaderBackend {
    /// Current program of the shader called `name`, invalid if unknown.
    fn program_id(&self, name: &str) -> ProgramId;

    /// Active uniforms of `program`; empty for invalid or stale ids.
    fn active_uniforms(&self, program: ProgramId) -> Vec<UniformDescriptor>;

    fn set_float(&mut self, program: ProgramId, uniform: &str, value: f32);

    fn set_vec3(&mut self, program: ProgramId, uniform: &str, value: [f32; 3]);

    /// Recompiles `name` from its recorded source and returns the new id.
    fn reload(&mut self, name: &str) -> ProgramId;
}
