//! Render pipeline cache for shading programs
//!
//! Pipelines are created lazily per shading program and render state. The
//! program id is part of the key, so a reloaded program never reuses the
//! pipeline built from its previous source.

use std::{collections::HashMap, sync::Arc};

use log::{debug, info};
use wgpu::*;

use super::settings::PolygonMode;
use crate::gfx::resources::TextureResource;
use crate::gfx::scene::vertex::Vertex3D;
use crate::gfx::shader::{ProgramId, ShaderLibrary, ShaderProgram};
use crate::wgpu_utils::uniform_layout;

/// Everything a cached pipeline depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader: String,
    pub program: ProgramId,
    pub polygon_mode: PolygonMode,
    pub depth_test: bool,
}

impl PipelineKey {
    pub fn new(program: &ShaderProgram, polygon_mode: PolygonMode, depth_test: bool) -> Self {
        Self {
            shader: program.name().to_string(),
            program: program.id(),
            polygon_mode,
            depth_test,
        }
    }

    /// True while `shaders` still holds the program this key was built from.
    pub fn is_current(&self, shaders: &ShaderLibrary) -> bool {
        shaders
            .get(&self.shader)
            .is_some_and(|p| p.is_valid() && p.id() == self.program)
    }
}

/// Owns the shared bind group layouts and the pipeline cache.
///
/// Bind group layout convention:
/// - `@group(0)` camera uniform
/// - `@group(1)` per-object transform uniform
/// - `@group(2)` material parameters, only for programs that declare them
pub struct PipelineManager {
    device: Arc<Device>,
    color_format: TextureFormat,
    camera_layout: BindGroupLayout,
    transform_layout: BindGroupLayout,
    params_layout: BindGroupLayout,
    pipelines: HashMap<PipelineKey, RenderPipeline>,
    shader_modules: HashMap<(String, ProgramId), ShaderModule>,
}

impl PipelineManager {
    /// Creates a new pipeline manager
    ///
    /// # Arguments
    /// * `device` - Shared wgpu device for creating resources
    /// * `color_format` - Format of the surface the pipelines draw to
    pub fn new(device: Arc<Device>, color_format: TextureFormat) -> Self {
        let camera_layout = uniform_layout(&device, "Camera Bind Group Layout");
        let transform_layout = uniform_layout(&device, "Transform Bind Group Layout");
        let params_layout = uniform_layout(&device, "Params Bind Group Layout");
        Self {
            device,
            color_format,
            camera_layout,
            transform_layout,
            params_layout,
            pipelines: HashMap::new(),
            shader_modules: HashMap::new(),
        }
    }

    pub fn camera_layout(&self) -> &BindGroupLayout {
        &self.camera_layout
    }

    pub fn transform_layout(&self) -> &BindGroupLayout {
        &self.transform_layout
    }

    pub fn params_layout(&self) -> &BindGroupLayout {
        &self.params_layout
    }

    /// Builds the pipeline for `key` unless it is already cached.
    ///
    /// Does nothing for an invalid program.
    pub fn prepare(&mut self, program: &ShaderProgram, key: &PipelineKey) {
        if !program.is_valid() || self.pipelines.contains_key(key) {
            return;
        }
        let module_key = (key.shader.clone(), key.program);
        if !self.shader_modules.contains_key(&module_key) {
            let module = self.device.create_shader_module(ShaderModuleDescriptor {
                label: Some(program.name()),
                source: wgpu::ShaderSource::Wgsl(program.wgsl().into()),
            });
            self.shader_modules.insert(module_key.clone(), module);
        }
        let Some(module) = self.shader_modules.get(&module_key) else {
            return;
        };

        let pipeline = self.create_pipeline(module, program.params_size().is_some(), key);
        debug!(
            "Created pipeline for '{}' program {} ({}, depth test {})",
            key.shader, key.program, key.polygon_mode, key.depth_test
        );
        self.pipelines.insert(key.clone(), pipeline);
    }

    pub fn pipeline(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Drops pipelines and modules built from programs that were reloaded
    /// or removed since.
    pub fn retain_current(&mut self, shaders: &ShaderLibrary) {
        let before = self.pipelines.len();
        self.pipelines.retain(|key, _| key.is_current(shaders));
        self.shader_modules.retain(|(shader, program), _| {
            shaders
                .get(shader)
                .is_some_and(|p| p.is_valid() && p.id() == *program)
        });
        let dropped = before - self.pipelines.len();
        if dropped > 0 {
            info!("Dropped {} stale pipeline(s)", dropped);
        }
    }

    fn create_pipeline(&self, module: &ShaderModule, has_params: bool, key: &PipelineKey) -> RenderPipeline {
        let mut layouts = vec![&self.camera_layout, &self.transform_layout];
        if has_params {
            layouts.push(&self.params_layout);
        }
        let label = format!("{} Pipeline", key.shader);
        let pipeline_layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", key.shader)),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        // The depth attachment is always bound, so a disabled depth test
        // still declares it and just never rejects or writes.
        let depth_stencil = Some(DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: key.depth_test,
            depth_compare: if key.depth_test {
                CompareFunction::Less
            } else {
                CompareFunction::Always
            },
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: self.color_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: key.polygon_mode.to_wgpu(),
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
