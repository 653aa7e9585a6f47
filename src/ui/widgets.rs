//! Immediate-mode widget primitives
//!
//! [`Widgets`] is the narrow surface the element tree draws through. Each call
//! draws one control for the current frame and reports whether the user
//! interacted with it. [`ImguiWidgets`] adapts a live `imgui::Ui` frame.

use imgui::Ui;

/// Per-frame draw calls of an immediate-mode UI library.
///
/// Every method returns `true` when the control was interacted with during
/// this call. Values are edited in place.
pub trait Widgets {
    fn button(&mut self, label: &str) -> bool;

    fn slider_f32(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool;

    fn slider_vec3(&mut self, label: &str, value: &mut [f32; 3], min: f32, max: f32) -> bool;

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Draws a dropdown. `selected` is `None` only when `options` is empty.
    fn combo(&mut self, label: &str, selected: &mut Option<usize>, options: &[String]) -> bool;

    /// Draws static text.
    fn label(&mut self, text: &str);

    /// Opens a named grouping region, runs `body` inside it and closes it.
    fn group(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn Widgets));
}

/// Text shown by a dropdown that has nothing to choose from.
pub const NO_OPTIONS: &str = "None";

/// [`Widgets`] over one imgui frame
pub struct ImguiWidgets<'ui> {
    ui: &'ui Ui,
}

impl<'ui> ImguiWidgets<'ui> {
    pub fn new(ui: &'ui Ui) -> Self {
        Self { ui }
    }
}

impl Widgets for ImguiWidgets<'_> {
    fn button(&mut self, label: &str) -> bool {
        self.ui.button(label)
    }

    fn slider_f32(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool {
        self.ui.slider(label, min, max, value)
    }

    fn slider_vec3(&mut self, label: &str, value: &mut [f32; 3], min: f32, max: f32) -> bool {
        self.ui.slider_config(label, min, max).build_array(value)
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.ui.checkbox(label, value)
    }

    fn combo(&mut self, label: &str, selected: &mut Option<usize>, options: &[String]) -> bool {
        let preview = selected
            .and_then(|index| options.get(index))
            .map_or(NO_OPTIONS, String::as_str);

        let mut clicked = false;
        if let Some(_combo) = self.ui.begin_combo(label, preview) {
            for (index, option) in options.iter().enumerate() {
                let is_selected = *selected == Some(index);
                if self
                    .ui
                    .selectable_config(option)
                    .selected(is_selected)
                    .build()
                {
                    *selected = Some(index);
                    clicked = true;
                }
                if is_selected {
                    self.ui.set_item_default_focus();
                }
            }
        }
        clicked
    }

    fn label(&mut self, text: &str) {
        self.ui.text(text);
    }

    fn group(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn Widgets)) {
        let ui = self.ui;
        ui.window(title)
            .size([360.0, 0.0], imgui::Condition::FirstUseEver)
            .build(|| body(self));
    }
}
