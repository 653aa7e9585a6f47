//! Named WGSL shading programs
//!
//! [`ShaderLibrary`] compiles WGSL with naga, remembers where each program
//! came from so it can be reloaded, and keeps a CPU copy of every uniform
//! block. Values pushed through [`ShaderBackend`] land in those copies; the
//! render engine uploads dirty blocks before drawing.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::{debug, error, info};
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::backend::{ProgramId, ShaderBackend, UniformDescriptor, UniformKind};
use super::reflect::{reflect, Reflection};
use crate::error::{Result, SandboxError};

/// Bind group of the per-shader parameter block.
pub const PARAMS_GROUP: u32 = 2;
pub const PARAMS_BINDING: u32 = 0;

/// Where a program's WGSL comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    File(PathBuf),
    Inline(String),
}

impl ShaderSource {
    fn read(&self) -> Result<String> {
        match self {
            ShaderSource::File(path) => fs::read_to_string(path).map_err(|source| SandboxError::Io {
                path: path.clone(),
                source,
            }),
            ShaderSource::Inline(text) => Ok(text.clone()),
        }
    }
}

/// CPU image of one uniform buffer.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    fn new(group: u32, binding: u32, size: u32) -> Self {
        Self {
            group,
            binding,
            bytes: vec![0; size as usize],
            dirty: true,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning the bytes if they needed an upload.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.bytes)
        } else {
            None
        }
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> bool {
        let start = offset as usize;
        let Some(slot) = self.bytes.get_mut(start..start + data.len()) else {
            return false;
        };
        slot.copy_from_slice(data);
        self.dirty = true;
        true
    }

    fn read_f32s<const N: usize>(&self, offset: u32) -> Option<[f32; N]> {
        let start = offset as usize;
        let bytes = self.bytes.get(start..start + N * 4)?;
        let mut out = [0.0; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Some(out)
    }
}

/// One named program and its latest compile.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    source: ShaderSource,
    id: ProgramId,
    wgsl: String,
    reflection: Reflection,
    blocks: Vec<UniformBlock>,
}

impl ShaderProgram {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// WGSL text of the last successful compile.
    pub fn wgsl(&self) -> &str {
        &self.wgsl
    }

    pub fn uniforms(&self) -> &[UniformDescriptor] {
        &self.reflection.uniforms
    }

    /// Size of the parameter block, if the program declares one.
    pub fn params_size(&self) -> Option<u32> {
        self.reflection
            .block(PARAMS_GROUP, PARAMS_BINDING)
            .map(|b| b.size)
    }

    pub fn params_block_mut(&mut self) -> Option<&mut UniformBlock> {
        self.blocks
            .iter_mut()
            .find(|b| b.group == PARAMS_GROUP && b.binding == PARAMS_BINDING)
    }

    fn block_for(&mut self, uniform: &UniformDescriptor) -> Option<&mut UniformBlock> {
        self.blocks
            .iter_mut()
            .find(|b| b.group == uniform.group && b.binding == uniform.binding)
    }

    fn write(&mut self, uniform: &str, expected: UniformKind, data: &[u8]) {
        let Some(descriptor) = self.reflection.uniform(uniform).cloned() else {
            debug!("Shader '{}' has no uniform '{}'", self.name, uniform);
            return;
        };
        if descriptor.kind != expected {
            debug!(
                "Uniform '{}' of '{}' is {:?}, not {:?}",
                uniform, self.name, descriptor.kind, expected
            );
            return;
        }
        if !descriptor.is_parameter() {
            debug!("Uniform '{}' of '{}' is owned by the renderer", uniform, self.name);
            return;
        }
        let written = self
            .block_for(&descriptor)
            .is_some_and(|block| block.write(descriptor.offset, data));
        if !written {
            debug!("Uniform '{}' of '{}' is not writable", uniform, self.name);
        }
    }

    pub fn float(&self, uniform: &str) -> Option<f32> {
        let descriptor = self.reflection.uniform(uniform)?;
        let block = self
            .blocks
            .iter()
            .find(|b| b.group == descriptor.group && b.binding == descriptor.binding)?;
        block.read_f32s::<1>(descriptor.offset).map(|[v]| v)
    }

    pub fn vec3(&self, uniform: &str) -> Option<[f32; 3]> {
        let descriptor = self.reflection.uniform(uniform)?;
        let block = self
            .blocks
            .iter()
            .find(|b| b.group == descriptor.group && b.binding == descriptor.binding)?;
        block.read_f32s::<3>(descriptor.offset)
    }
}

struct Compiled {
    wgsl: String,
    reflection: Reflection,
}

fn compile(name: &str, source: &ShaderSource) -> Result<Compiled> {
    let wgsl = source.read()?;
    let module = naga::front::wgsl::parse_str(&wgsl).map_err(|e| SandboxError::ShaderParse {
        name: name.to_string(),
        message: e.emit_to_string(&wgsl),
    })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| SandboxError::ShaderValidation {
            name: name.to_string(),
            message: e.into_inner().to_string(),
        })?;

    check_bindings(name, &module)?;

    let reflection = reflect(&module);
    Ok(Compiled { wgsl, reflection })
}

/// Uniform slots the render engine binds: camera, transform, parameters.
const RENDERER_SLOTS: [(u32, u32); 3] = [(0, 0), (1, 0), (PARAMS_GROUP, PARAMS_BINDING)];

/// Rejects resources the renderer's pipeline layout has no slot for.
fn check_bindings(name: &str, module: &naga::Module) -> Result<()> {
    for (_, global) in module.global_variables.iter() {
        let Some(binding) = global.binding.as_ref() else {
            continue;
        };
        let slot = (binding.group, binding.binding);
        if global.space != naga::AddressSpace::Uniform || !RENDERER_SLOTS.contains(&slot) {
            return Err(SandboxError::ShaderValidation {
                name: name.to_string(),
                message: format!(
                    "'{}' at @group({}) @binding({}) is not bound by the renderer",
                    global.name.as_deref().unwrap_or("?"),
                    slot.0,
                    slot.1
                ),
            });
        }
    }
    Ok(())
}

/// Resource cache of shading programs by name.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    programs: BTreeMap<String, ShaderProgram>,
    next_id: u32,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ProgramId {
        self.next_id += 1;
        ProgramId(self.next_id)
    }

    /// Compiles `source` and registers it as `name`, replacing any program
    /// of that name. A failed compile is logged and stored with an invalid
    /// id so it can be fixed and reloaded later.
    pub fn load(&mut self, name: impl Into<String>, source: ShaderSource) -> ProgramId {
        let name = name.into();
        if let Err(err) = self.try_load(name.as_str(), source) {
            error!("{}", err);
        }
        self.program_id(&name)
    }

    /// Like [`ShaderLibrary::load`] but hands the compile error back.
    pub fn try_load(&mut self, name: impl Into<String>, source: ShaderSource) -> Result<ProgramId> {
        let name = name.into();
        let mut program = ShaderProgram {
            name: name.clone(),
            source,
            id: ProgramId::INVALID,
            wgsl: String::new(),
            reflection: Reflection::default(),
            blocks: Vec::new(),
        };
        let result = self.install(&mut program);
        self.programs.insert(name, program);
        result
    }

    fn install(&mut self, program: &mut ShaderProgram) -> Result<ProgramId> {
        match compile(&program.name, &program.source) {
            Ok(compiled) => {
                program.id = self.next_id();
                program.blocks = compiled
                    .reflection
                    .blocks
                    .iter()
                    .map(|b| UniformBlock::new(b.group, b.binding, b.size))
                    .collect();
                program.wgsl = compiled.wgsl;
                program.reflection = compiled.reflection;
                info!(
                    "Compiled shader '{}' as program {} ({} uniforms)",
                    program.name,
                    program.id,
                    program.reflection.uniforms.len()
                );
                Ok(program.id)
            }
            Err(err) => {
                program.id = ProgramId::INVALID;
                program.wgsl.clear();
                program.reflection = Reflection::default();
                program.blocks.clear();
                Err(err)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ShaderProgram> {
        self.programs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ShaderProgram> {
        self.programs.get_mut(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.programs.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    fn by_id_mut(&mut self, id: ProgramId) -> Option<&mut ShaderProgram> {
        if !id.is_valid() {
            return None;
        }
        self.programs.values_mut().find(|p| p.id == id)
    }

    fn by_id(&self, id: ProgramId) -> Option<&ShaderProgram> {
        if !id.is_valid() {
            return None;
        }
        self.programs.values().find(|p| p.id == id)
    }
}

impl ShaderBackend for ShaderLibrary {
    fn program_id(&self, name: &str) -> ProgramId {
        self.programs
            .get(name)
            .map_or(ProgramId::INVALID, ShaderProgram::id)
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<UniformDescriptor> {
        let uniforms = self
            .by_id(program)
            .map(|p| p.uniforms().to_vec())
            .unwrap_or_default();
        debug!("Program {} has {} active uniforms", program, uniforms.len());
        uniforms
    }

    fn set_float(&mut self, program: ProgramId, uniform: &str, value: f32) {
        match self.by_id_mut(program) {
            Some(p) => p.write(uniform, UniformKind::Float, &value.to_le_bytes()),
            None => debug!("Ignoring '{}' write to stale program {}", uniform, program),
        }
    }

    fn set_vec3(&mut self, program: ProgramId, uniform: &str, value: [f32; 3]) {
        match self.by_id_mut(program) {
            Some(p) => p.write(uniform, UniformKind::Vec3, bytemuck::cast_slice(&value)),
            None => debug!("Ignoring '{}' write to stale program {}", uniform, program),
        }
    }

    fn reload(&mut self, name: &str) -> ProgramId {
        let Some(mut program) = self.programs.remove(name) else {
            error!("Cannot reload unknown shader '{}'", name);
            return ProgramId::INVALID;
        };
        info!("Reloading shader '{}'", name);
        if let Err(err) = self.install(&mut program) {
            error!("{}", err);
        }
        let id = program.id;
        self.programs.insert(name.to_string(), program);
        id
    }
}
