//! Window, event loop and per-frame orchestration
//!
//! Each redraw runs one UI frame (commands fire while panels are drawn,
//! deferred panel rebuilds are applied right after), uploads the camera,
//! transforms and shader parameters, draws the scene and finally the UI
//! overlay on top of it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, error, info};
use rand::Rng;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::SandboxConfig;
use crate::error::Result;
use crate::gfx::{
    camera::{CameraController, OrbitCamera},
    geometry::{generate_cube, generate_plane, generate_sphere},
    rendering::{RenderEngine, RenderSettings},
    scene::{GameObject, Mesh, Scene},
    shader::{ShaderLibrary, ShaderSource},
};
use crate::ui::{EnginePanels, EngineState, UiContext, UiManager};

pub struct SandboxApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: SandboxConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    // Declared before `ui_manager`: elements and commands must go before
    // the imgui context.
    ui: UiContext,
    ui_manager: Option<UiManager>,
    controller: CameraController,
    state: EngineState,
}

/// Fills `scene` with a ground plane, a cube, a sphere and `extra`
/// randomly placed balls.
pub fn populate_demo_scene(scene: &mut Scene, shader_names: &[String], extra: usize) {
    let shader = |i: usize| -> String {
        shader_names
            .get(i % shader_names.len().max(1))
            .cloned()
            .unwrap_or_default()
    };

    scene.add_object(
        GameObject::new("ground", Mesh::from(generate_plane(20.0, 20.0, 1, 1)), shader(0))
            .with_position([0.0, -1.0, 0.0]),
    );
    scene.add_object(GameObject::new("cube", Mesh::from(generate_cube()), shader(0)));
    scene.add_object(
        GameObject::new("sphere", Mesh::from(generate_sphere(48, 24)), shader(1))
            .with_position([2.5, 0.0, 0.0]),
    );

    let mut rng = rand::rng();
    for i in 0..extra {
        let position = [
            rng.random_range(-6.0..6.0),
            rng.random_range(-0.5..3.0),
            rng.random_range(-6.0..6.0),
        ];
        let size = rng.random_range(0.3..0.8);
        scene.add_object(
            GameObject::new("ball", Mesh::from(generate_sphere(24, 12)), shader(i))
                .with_position(position)
                .with_scale([size; 3]),
        );
    }
}

impl SandboxApp {
    /// Creates the event loop, loads the configured shaders, builds the
    /// demo scene and installs the engine panels.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        let mut shaders = ShaderLibrary::new();
        for entry in &config.shaders {
            shaders.load(entry.name.as_str(), ShaderSource::File(entry.path.clone()));
        }

        let mut scene = Scene::new();
        populate_demo_scene(&mut scene, &shaders.names(), config.demo_objects);

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = OrbitCamera::new(&config.camera, aspect);
        let settings = RenderSettings {
            vsync: config.window.vsync,
            ..Default::default()
        };

        let state = EngineState {
            shaders: Rc::new(RefCell::new(shaders)),
            scene: Rc::new(RefCell::new(scene)),
            camera: Rc::new(RefCell::new(camera)),
            settings: Rc::new(RefCell::new(settings)),
        };
        let mut ui = UiContext::new();
        EnginePanels::install(&mut ui, &state);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui,
                ui_manager: None,
                controller: CameraController::new(),
                state,
            },
        })
    }

    /// Handles onto the shaders, scene, camera and render settings.
    pub fn state(&self) -> &EngineState {
        &self.app_state.state
    }

    /// The panel registry, for adding application panels before `run`.
    pub fn ui_mut(&mut self) -> &mut UiContext {
        &mut self.app_state.ui
    }

    /// Adds an object to the scene and lists it in the object selector.
    pub fn add_object(&mut self, object: GameObject) {
        self.app_state.state.scene.borrow_mut().add_object(object);
        EnginePanels::refresh_game_objects(&mut self.app_state.ui, &self.app_state.state);
    }

    /// Runs the application until the window closes.
    pub fn run(mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl AppState {
    fn redraw(&mut self) {
        let (Some(window), Some(render_engine), Some(ui_manager)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return;
        };

        // No shared state may stay borrowed here: commands borrow it
        if ui_manager.run_frame(window, &mut self.ui) {
            debug!("UI frame {} changed a value", self.ui.frame());
        }

        let state = &self.state;
        render_engine.update(
            &mut state.scene.borrow_mut(),
            &state.camera.borrow(),
            &mut state.shaders.borrow_mut(),
        );
        let presented = render_engine.render_frame(
            &state.scene.borrow(),
            &state.shaders.borrow(),
            &state.settings.borrow(),
            Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                ui_manager.render_overlay(device, queue, encoder, view);
            }),
        );
        if !presented {
            ui_manager.discard_frame();
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(size.width, size.height);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.update_display_size(size.width, size.height);
        }
        self.state
            .camera
            .borrow_mut()
            .update_projection(size.width, size.height);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let (width, height): (u32, u32) = window.inner_size().into();
        let present_mode = self.state.settings.borrow().present_mode();
        let mut renderer = match pollster::block_on(RenderEngine::new(window.clone(), width, height, present_mode)) {
            Ok(renderer) => renderer,
            Err(err) => {
                error!("{}", err);
                event_loop.exit();
                return;
            }
        };

        renderer.prepare_scene(&mut self.state.scene.borrow_mut());
        self.state.camera.borrow_mut().update_projection(width, height);

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        info!("Window ready at {}x{}", width, height);

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // UI gets the input first; what it captures never reaches the camera
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_window_event(&window, window_id, &event) {
                self.controller.cancel_drag();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                self.controller
                    .process_window_event(&other, &mut self.state.camera.borrow_mut());
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.ui.shutdown();
        self.ui_manager = None;
        self.render_engine = None;
        self.window = None;
        info!("Sandbox closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_contents() {
        let mut scene = Scene::new();
        let shaders = vec!["normals".to_string(), "phong".to_string()];
        populate_demo_scene(&mut scene, &shaders, 3);

        assert_eq!(scene.object_count(), 6);
        assert_eq!(scene.object("ground").unwrap().position(), [0.0, -1.0, 0.0]);
        assert_eq!(scene.object("sphere").unwrap().shader(), "phong");
        for name in ["ball", "ball (1)", "ball (2)"] {
            let ball = scene.object(name).unwrap();
            let [x, y, z] = ball.position();
            assert!((-6.0..6.0).contains(&x) && (-0.5..3.0).contains(&y) && (-6.0..6.0).contains(&z));
            assert!((0.3..0.8).contains(&ball.scale()[0]));
        }
    }

    #[test]
    fn test_demo_scene_without_shaders() {
        let mut scene = Scene::new();
        populate_demo_scene(&mut scene, &[], 0);
        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.object("cube").unwrap().shader(), "");
    }
}
