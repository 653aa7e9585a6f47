//! WGPU-based rendering engine for the sandbox
//!
//! Owns the surface, device and queue, the depth buffer, the camera uniform
//! and one parameter uniform per shading program, and draws the scene and
//! the world axes followed by an optional UI overlay.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use wgpu::TextureFormat;

use super::axes::AxesOverlay;
use super::pipeline_manager::{PipelineKey, PipelineManager};
use super::settings::{PolygonMode, RenderSettings};
use crate::error::Result;
use crate::gfx::{
    camera::{CameraUniform, OrbitCamera},
    resources::TextureResource,
    scene::{DrawObject, Scene},
    shader::{ProgramId, ShaderLibrary},
};
use crate::wgpu_utils::{RawUniformBuffer, UniformBuffer};

/// GPU copy of one program's `@group(2)` parameter block.
struct ParamsBinding {
    program: ProgramId,
    buffer: RawUniformBuffer,
    bind_group: wgpu::BindGroup,
}

/// Polygon mode actually used when `requested` may need a device feature.
pub fn effective_polygon_mode(requested: PolygonMode, line_supported: bool) -> PolygonMode {
    match requested {
        PolygonMode::Line if !line_supported => PolygonMode::Fill,
        mode => mode,
    }
}

/// Draws the scene with one pipeline per shader and render state
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    camera_buffer: UniformBuffer<CameraUniform>,
    camera_bind_group: wgpu::BindGroup,
    params: HashMap<String, ParamsBinding>,
    axes: AxesOverlay,
    line_mode_supported: bool,
    warned_line_fallback: bool,
}

impl RenderEngine {
    /// Brings up the GPU and a surface for `window`
    ///
    /// # Arguments
    /// * `window` - Surface target, usually an `Arc<Window>`
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `present_mode` - Initial present mode, see [`RenderSettings::present_mode`]
    ///
    /// # Errors
    /// Fails if no surface, adapter or device can be created
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        present_mode: wgpu::PresentMode,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let line_mode_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sandbox_device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let pipeline_manager = PipelineManager::new(device.clone(), format);

        let camera_buffer = UniformBuffer::<CameraUniform>::new(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: pipeline_manager.camera_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.binding_resource(),
            }],
        });

        let axes = AxesOverlay::new(&device, format, pipeline_manager.camera_layout());

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            camera_buffer,
            camera_bind_group,
            params: HashMap::new(),
            axes,
            line_mode_supported,
            warned_line_fallback: false,
        })
    }

    /// Creates GPU buffers for objects added since the last call.
    pub fn prepare_scene(&mut self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, self.pipeline_manager.transform_layout());
    }

    /// Uploads the camera, object transforms and dirty parameter blocks.
    pub fn update(&mut self, scene: &mut Scene, camera: &OrbitCamera, shaders: &mut ShaderLibrary) {
        self.prepare_scene(scene);
        scene.update_all_transforms(&self.queue);
        self.camera_buffer
            .update_content(&self.queue, CameraUniform::from_camera(camera));
        self.sync_params(shaders);
        self.pipeline_manager.retain_current(shaders);
    }

    fn sync_params(&mut self, shaders: &mut ShaderLibrary) {
        for name in shaders.names() {
            let Some(program) = shaders.get_mut(&name) else {
                continue;
            };
            let id = program.id();
            let Some(block) = program.params_block_mut() else {
                self.params.remove(&name);
                continue;
            };

            match self.params.get(&name) {
                Some(binding) if binding.program == id => {
                    if let Some(bytes) = block.take_dirty() {
                        binding.buffer.write(&self.queue, bytes);
                    }
                }
                _ => {
                    let buffer = RawUniformBuffer::new(&self.device, &format!("{name} Params"), block.bytes());
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some(&format!("{name} Params Bind Group")),
                        layout: self.pipeline_manager.params_layout(),
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.binding_resource(),
                        }],
                    });
                    block.take_dirty();
                    debug!("Created {} byte parameter buffer for '{}' program {}", buffer.size(), name, id);
                    self.params.insert(
                        name,
                        ParamsBinding {
                            program: id,
                            buffer,
                            bind_group,
                        },
                    );
                }
            }
        }
        self.params.retain(|name, binding| shaders.get(name).is_some_and(|p| p.id() == binding.program));
    }

    fn polygon_mode_for(&mut self, settings: &RenderSettings) -> PolygonMode {
        let mode = effective_polygon_mode(settings.polygon_mode, self.line_mode_supported);
        if mode != settings.polygon_mode && !self.warned_line_fallback {
            warn!("Line polygon mode is not supported by this device, drawing filled");
            self.warned_line_fallback = true;
        }
        mode
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// Objects whose shader is missing or failed to compile are skipped.
    ///
    /// # Arguments
    /// * `scene` - Scene containing objects to render
    /// * `shaders` - Programs the objects refer to by name
    /// * `settings` - Global render state
    /// * `ui_callback` - Optional function that renders UI elements on top
    ///
    /// # Returns
    /// False if the surface gave no texture; the frame, `ui_callback`
    /// included, was skipped
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        shaders: &ShaderLibrary,
        settings: &RenderSettings,
        ui_callback: Option<F>,
    ) -> bool
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.set_present_mode(settings.present_mode());
        let polygon_mode = self.polygon_mode_for(settings);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return false;
            }
            Err(err) => {
                warn!("Skipping frame: {}", err);
                return false;
            }
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut draws = Vec::new();
        for object in scene.objects().filter(|o| o.is_visible()) {
            let Some(program) = shaders.get(object.shader()).filter(|p| p.is_valid()) else {
                continue;
            };
            let key = PipelineKey::new(program, polygon_mode, settings.depth_test);
            self.pipeline_manager.prepare(program, &key);
            draws.push((object, key));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(settings.clear_color_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for (object, key) in &draws {
                let Some(pipeline) = self.pipeline_manager.pipeline(key) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                if let Some(params) = self.params.get(&key.shader) {
                    render_pass.set_bind_group(2, &params.bind_group, &[]);
                }
                render_pass.draw_object(object);
            }

            if settings.show_axes {
                self.axes.draw(&mut render_pass);
            }
        }

        // UI overlay (if provided), loads the scene pass output
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        true
    }

    /// Resizes the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Switches the present mode, reconfiguring the surface only on change.
    fn set_present_mode(&mut self, present_mode: wgpu::PresentMode) {
        if self.config.present_mode != present_mode {
            info!("Present mode {:?}", present_mode);
            self.config.present_mode = present_mode;
            self.surface.configure(&self.device, &self.config);
        }
    }
}
