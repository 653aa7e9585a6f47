//! Dear ImGui host for the element tree
//!
//! Owns the imgui context, its winit platform glue and its wgpu renderer.
//! The element tree never sees any of these: each frame it is drawn
//! through [`ImguiWidgets`] inside [`UiManager::run_frame`], and the
//! resulting draw lists are recorded on top of the scene by
//! [`UiManager::render_overlay`].

use std::time::Instant;

use imgui::{Context, DrawData, FontConfig, FontSource, MouseCursor, Ui};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::{debug, error, trace, warn};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

use super::context::UiContext;
use super::widgets::ImguiWidgets;

const BASE_FONT_SIZE: f64 = 16.0;

/// Which of imgui's capture flags governs an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pointer,
    Keyboard,
    /// Forwarded to imgui but never withheld from the camera
    Passive,
}

impl InputKind {
    /// Classifies `event`, or `None` for events imgui has no use for.
    pub fn of(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => Some(Self::Pointer),
            WindowEvent::KeyboardInput { .. } => Some(Self::Keyboard),
            WindowEvent::ModifiersChanged(_) | WindowEvent::Focused(_) | WindowEvent::CursorLeft { .. } => {
                Some(Self::Passive)
            }
            _ => None,
        }
    }

    /// Whether imgui keeps the event for itself given its capture flags.
    pub fn is_captured(self, wants_pointer: bool, wants_keyboard: bool) -> bool {
        match self {
            Self::Pointer => wants_pointer,
            Self::Keyboard => wants_keyboard,
            Self::Passive => false,
        }
    }
}

/// Pairs every imgui `frame()` with a `render()`.
///
/// imgui aborts if a frame is begun while the previous one was never
/// rendered, which happens whenever the surface drops a frame.
#[derive(Debug, Default)]
struct FrameBracket {
    open: bool,
}

impl FrameBracket {
    /// Begins a frame, first closing one left open.
    fn begin<'c>(&mut self, context: &'c mut Context) -> &'c mut Ui {
        if self.open {
            context.render();
            trace!("Closed a UI frame that was never drawn");
        }
        self.open = true;
        context.frame()
    }

    /// Ends the open frame, if any, and returns its draw lists.
    fn end<'c>(&mut self, context: &'c mut Context) -> Option<&'c DrawData> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(context.render())
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.open
    }
}

pub struct UiManager {
    context: Context,
    frame: FrameBracket,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates the imgui context and its renderer for `window`
    ///
    /// # Arguments
    /// * `device` - Device the renderer allocates its buffers and font atlas on
    /// * `queue` - Queue for the font atlas upload
    /// * `output_color_format` - Format of the surface the overlay is drawn to
    /// * `window` - Window whose input and scale factor imgui follows
    pub fn new(device: &Device, queue: &Queue, output_color_format: TextureFormat, window: &Window) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        // DPI is locked; the scale factor goes into the font size instead
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        let size_pixels = (BASE_FONT_SIZE * window.scale_factor()) as f32;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                size_pixels,
                oversample_h: 1,
                pixel_snap_h: true,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_color_format,
                ..Default::default()
            },
        );

        Self {
            context,
            frame: FrameBracket::default(),
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Follows a surface resize.
    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds a window event to imgui
    ///
    /// # Returns
    /// True if imgui captured the event, so the camera must not see it
    pub fn handle_window_event(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        let Some(kind) = InputKind::of(event) else {
            return false;
        };
        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform.handle_event(self.context.io_mut(), window, &wrapped);

        let io = self.context.io();
        let captured = kind.is_captured(io.want_capture_mouse, io.want_capture_keyboard);
        if captured {
            trace!("UI captured {:?} input", kind);
        }
        captured
    }

    /// Runs one imgui frame that draws every panel of `ui`
    ///
    /// Commands of edited elements fire during this call and deferred
    /// panel changes are applied before it returns.
    ///
    /// # Returns
    /// True if any element value changed this frame
    pub fn run_frame(&mut self, window: &Window, ui: &mut UiContext) -> bool {
        let now = Instant::now();
        self.context.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            warn!("Failed to prepare UI frame: {}", err);
        }

        let frame = self.frame.begin(&mut self.context);
        let changed = ui.render(&mut ImguiWidgets::new(frame));

        let cursor = frame.mouse_cursor();
        if self.last_cursor != cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(frame, window);
        }
        changed
    }

    /// Records the draw lists of the last [`run_frame`](Self::run_frame)
    /// on top of `target`, keeping the scene already drawn there.
    pub fn render_overlay(&mut self, device: &Device, queue: &Queue, encoder: &mut CommandEncoder, target: &TextureView) {
        let Some(draw_data) = self.frame.end(&mut self.context) else {
            return;
        };
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ui_overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self.renderer.render(draw_data, queue, device, &mut pass) {
            error!("Failed to render UI: {:?}", err);
        }
    }

    /// Closes the frame of the last [`run_frame`](Self::run_frame)
    /// without drawing it, e.g. when the surface had no texture to give.
    pub fn discard_frame(&mut self) {
        if self.frame.end(&mut self.context).is_some() {
            debug!("Discarded an undrawn UI frame");
        }
    }
}
