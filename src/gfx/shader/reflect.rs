//! Uniform reflection over parsed WGSL modules
//!
//! Every `var<uniform>` global is flattened into one [`UniformDescriptor`]
//! per struct member, or a single descriptor for a non-struct uniform.
//! Texture and sampler globals are reported too, so callers can see (and
//! skip) them.

use naga::{ArraySize, Module, ScalarKind, TypeInner, VectorSize};

use super::backend::{UniformDescriptor, UniformKind};

/// Byte layout of one uniform buffer binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reflection {
    pub uniforms: Vec<UniformDescriptor>,
    pub blocks: Vec<BlockLayout>,
}

impl Reflection {
    pub fn block(&self, group: u32, binding: u32) -> Option<&BlockLayout> {
        self.blocks
            .iter()
            .find(|b| b.group == group && b.binding == binding)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformDescriptor> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Kind and array length of a type.
fn classify(module: &Module, inner: &TypeInner) -> (UniformKind, Option<u32>) {
    let kind = match *inner {
        TypeInner::Scalar(scalar) => match scalar.kind {
            ScalarKind::Float => UniformKind::Float,
            ScalarKind::Sint => UniformKind::Int,
            ScalarKind::Uint => UniformKind::UInt,
            ScalarKind::Bool => UniformKind::Bool,
            _ => UniformKind::Other,
        },
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => match size {
            VectorSize::Bi => UniformKind::Vec2,
            VectorSize::Tri => UniformKind::Vec3,
            VectorSize::Quad => UniformKind::Vec4,
        },
        TypeInner::Matrix { columns, rows, .. } => match (columns, rows) {
            (VectorSize::Tri, VectorSize::Tri) => UniformKind::Mat3,
            (VectorSize::Quad, VectorSize::Quad) => UniformKind::Mat4,
            _ => UniformKind::Other,
        },
        TypeInner::Array { base, size, .. } => {
            let (kind, _) = classify(module, &module.types[base].inner);
            let len = match size {
                ArraySize::Constant(n) => n.get(),
                _ => 0,
            };
            return (kind, Some(len));
        }
        TypeInner::Sampler { .. } => UniformKind::Sampler,
        TypeInner::Image { .. } => UniformKind::Texture,
        _ => UniformKind::Other,
    };
    (kind, None)
}

fn describe(
    module: &Module,
    name: &str,
    inner: &TypeInner,
    group: u32,
    binding: u32,
    offset: u32,
) -> UniformDescriptor {
    let (kind, array_len) = classify(module, inner);
    let name = match array_len {
        Some(_) => format!("{name}[0]"),
        None => name.to_string(),
    };
    UniformDescriptor {
        name,
        kind,
        array_len,
        group,
        binding,
        offset,
    }
}

/// Lists the uniforms and uniform blocks declared by `module`.
pub fn reflect(module: &Module) -> Reflection {
    let mut reflection = Reflection::default();

    for (_, global) in module.global_variables.iter() {
        let (Some(name), Some(binding)) = (global.name.as_deref(), global.binding.as_ref()) else {
            continue;
        };
        let inner = &module.types[global.ty].inner;

        match global.space {
            naga::AddressSpace::Uniform => {
                reflection.blocks.push(BlockLayout {
                    name: name.to_string(),
                    group: binding.group,
                    binding: binding.binding,
                    size: inner.size(module.to_ctx()),
                });

                if let TypeInner::Struct { members, .. } = inner {
                    for member in members {
                        let Some(member_name) = member.name.as_deref() else {
                            continue;
                        };
                        reflection.uniforms.push(describe(
                            module,
                            member_name,
                            &module.types[member.ty].inner,
                            binding.group,
                            binding.binding,
                            member.offset,
                        ));
                    }
                } else {
                    reflection.uniforms.push(describe(
                        module,
                        name,
                        inner,
                        binding.group,
                        binding.binding,
                        0,
                    ));
                }
            }
            naga::AddressSpace::Handle => {
                reflection.uniforms.push(describe(
                    module,
                    name,
                    inner,
                    binding.group,
                    binding.binding,
                    0,
                ));
            }
            _ => {}
        }
    }

    reflection
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = r#"
        struct Params {
            roughness: f32,
            view: mat4x4<f32>,
            tintColor: vec3<f32>,
            lightPositions: array<vec4<f32>, 4>,
        };

        @group(2) @binding(0) var<uniform> params: Params;
        @group(2) @binding(1) var<uniform> exposure: f32;
        @group(3) @binding(0) var albedo: texture_2d<f32>;
        @group(3) @binding(1) var albedo_sampler: sampler;
    "#;

    fn reflect_source(source: &str) -> Reflection {
        let module = naga::front::wgsl::parse_str(source).expect("test WGSL parses");
        reflect(&module)
    }

    #[test]
    fn test_struct_members_are_flattened() {
        let reflection = reflect_source(PARAMS);

        let roughness = reflection.uniform("roughness").unwrap();
        assert_eq!(roughness.kind, UniformKind::Float);
        assert_eq!((roughness.group, roughness.binding, roughness.offset), (2, 0, 0));

        let view = reflection.uniform("view").unwrap();
        assert_eq!(view.kind, UniformKind::Mat4);
        assert_eq!(view.offset, 16);

        let tint = reflection.uniform("tintColor").unwrap();
        assert_eq!(tint.kind, UniformKind::Vec3);
        assert_eq!(tint.offset, 80);
    }

    #[test]
    fn test_arrays_are_reported_with_index_suffix() {
        let reflection = reflect_source(PARAMS);
        let lights = reflection.uniform("lightPositions[0]").unwrap();
        assert_eq!(lights.kind, UniformKind::Vec4);
        assert_eq!(lights.array_len, Some(4));
        assert!(lights.is_array());
        assert_eq!(lights.offset, 96);
    }

    #[test]
    fn test_plain_uniform_and_handles() {
        let reflection = reflect_source(PARAMS);

        let exposure = reflection.uniform("exposure").unwrap();
        assert_eq!(exposure.kind, UniformKind::Float);
        assert_eq!((exposure.binding, exposure.offset), (1, 0));

        assert_eq!(
            reflection.uniform("albedo").map(|u| u.kind),
            Some(UniformKind::Texture)
        );
        assert_eq!(
            reflection.uniform("albedo_sampler").map(|u| u.kind),
            Some(UniformKind::Sampler)
        );
    }

    #[test]
    fn test_block_sizes() {
        let reflection = reflect_source(PARAMS);
        assert_eq!(reflection.blocks.len(), 2);
        assert_eq!(reflection.block(2, 0).map(|b| b.size), Some(160));
        assert_eq!(reflection.block(2, 1).map(|b| b.size), Some(4));
        assert!(reflection.block(0, 0).is_none());
    }

    #[test]
    fn test_module_without_uniforms() {
        let reflection = reflect_source(
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        );
        assert!(reflection.uniforms.is_empty());
        assert!(reflection.blocks.is_empty());
    }
}
