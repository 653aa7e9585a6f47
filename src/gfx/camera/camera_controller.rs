use log::debug;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Pixels of touchpad scroll that count as one wheel step.
const PIXELS_PER_SCROLL_STEP: f32 = 50.0;

/// Turns pointer and keyboard input into orbit camera operations.
///
/// Middle or right drag orbits, the same drag with Shift held pans, the
/// wheel zooms and Shift+C resets the camera.
#[derive(Debug, Default)]
pub struct CameraController {
    is_shift_held: bool,
    is_mouse_pressed: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one window event to the controller.
    ///
    /// Returns true if the event moved the camera.
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_shift(modifiers.state().shift_key());
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(*button, *state == ElementState::Pressed);
                false
            }
            WindowEvent::CursorMoved { position, .. } => self.on_cursor_moved(*position, camera),
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_SCROLL_STEP
                    }
                };
                self.on_scroll(steps, camera)
            }
            WindowEvent::KeyboardInput { event, .. } => self.process_keyed_events(event, camera),
            _ => false,
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.set_shift(*state == ElementState::Pressed);
                false
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                repeat: false,
                ..
            } if self.is_shift_held => {
                debug!("Resetting camera to its home position");
                camera.reset();
                true
            }
            _ => false,
        }
    }

    pub fn set_shift(&mut self, held: bool) {
        self.is_shift_held = held;
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if matches!(button, MouseButton::Middle | MouseButton::Right) {
            self.is_mouse_pressed = pressed;
            self.last_cursor = None;
        }
    }

    /// Orbits or pans by the distance moved since the previous cursor event
    /// of the current drag.
    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>, camera: &mut OrbitCamera) -> bool {
        let previous = self.last_cursor.replace(position);
        if !self.is_mouse_pressed {
            return false;
        }
        let Some(previous) = previous else {
            return false;
        };

        let dx = (position.x - previous.x) as f32;
        let dy = (position.y - previous.y) as f32;
        if self.is_shift_held {
            camera.pan(dx, dy);
        } else {
            camera.orbit(dx, dy);
        }
        true
    }

    /// Zooms by `steps` wheel notches; positive scrolls in.
    pub fn on_scroll(&mut self, steps: f32, camera: &mut OrbitCamera) -> bool {
        if steps == 0.0 {
            return false;
        }
        camera.zoom(steps);
        true
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }

    /// Forgets any drag in progress, e.g. when the UI grabs the pointer.
    pub fn cancel_drag(&mut self) {
        self.is_mouse_pressed = false;
        self.last_cursor = None;
    }
}
