//! # User Interface Module
//!
//! Parameter panels built from a small set of editable elements.
//!
//! ## Key Components
//!
//! - [`Command`] - A deferred action bound to an element
//! - [`Element`] - Button, sliders, checkbox, selector or label
//! - [`Panel`] - Named elements drawn inside one grouping region
//! - [`UiContext`] - Registry of panels plus the per-frame change flag
//! - [`ShaderReflectionGenerator`] - Panels synthesized from shader uniforms
//! - [`EnginePanels`] - The sandbox's built-in panels
//! - [`UiManager`] - Dear ImGui integration with winit and wgpu
//!
//! ## Usage
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//! use tinkerbox::ui::{Command, FloatSlider, UiContext};
//!
//! let mut ui = UiContext::new();
//! let slider = FloatSlider::new("gain", 1.0, 0.0, 2.0);
//! let gain = slider.handle();
//! let seen = Rc::new(Cell::new(0.0));
//! let sink = Rc::clone(&seen);
//! ui.add_panel("Audio", "Audio")
//!     .add("gain", slider)
//!     .bind(Command::new(move || sink.set(gain.get())));
//! assert_eq!(ui.panel("Audio").unwrap().len(), 1);
//! ```
//!
//! ## Input Handling
//!
//! When the UI wants the pointer or keyboard, events are not forwarded to
//! the camera controller.

pub mod command;
pub mod context;
pub mod element;
pub mod engine_panels;
pub mod manager;
pub mod panel;
pub mod reflection;
pub mod widgets;

// Re-export main types
pub use command::Command;
pub use context::{Deferred, UiContext, CONTROLS_PANEL};
pub use element::{
    Button, Checkbox, Element, FloatSlider, Label, SelectionHandle, Selector, ValueHandle,
    Vec3Slider,
};
pub use engine_panels::{EnginePanels, EngineState};
pub use manager::{InputKind, UiManager};
pub use panel::Panel;
pub use reflection::ShaderReflectionGenerator;
pub use widgets::{ImguiWidgets, Widgets, NO_OPTIONS};
