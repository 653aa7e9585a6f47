//! Editable UI elements
//!
//! Each control kind is its own struct and [`Element`] is the closed sum of
//! them. Every element follows the same per-frame discipline:
//!
//! 1. draw the control with its current value,
//! 2. store whatever value the user produced (clamped where bounds apply),
//! 3. if the control reported a change and a [`Command`] is bound, execute it
//!    exactly once.
//!
//! `render` returns whether the element changed during this call, so change
//! detection is edge-triggered within the same frame.
//!
//! Values live in shared cells so a command can read the value its element
//! just stored: grab a [`ValueHandle`] (or [`SelectionHandle`]) with
//! `handle()` before binding the command.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::warn;

use super::command::Command;
use super::widgets::Widgets;

/// Read-only view of an element's current value.
#[derive(Debug, Clone)]
pub struct ValueHandle<T: Copy>(Rc<Cell<T>>);

impl<T: Copy> ValueHandle<T> {
    pub fn get(&self) -> T {
        self.0.get()
    }
}

/// Read-only view of a [`Selector`]'s current choice.
#[derive(Debug, Clone)]
pub struct SelectionHandle {
    options: Rc<[String]>,
    selected: Rc<Cell<Option<usize>>>,
}

impl SelectionHandle {
    pub fn index(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn option(&self) -> Option<String> {
        self.index().and_then(|i| self.options.get(i).cloned())
    }
}

/// Bounds used in place of a NaN or infinite one.
const FALLBACK_BOUNDS: (f32, f32) = (-10.0, 10.0);

/// Returns finite bounds with `min <= max`, replacing non-finite ones and
/// swapping inverted ones.
fn ordered_bounds(label: &str, min: f32, max: f32) -> (f32, f32) {
    let min = if min.is_finite() {
        min
    } else {
        warn!("Slider '{}' has non-finite min {}, using {}", label, min, FALLBACK_BOUNDS.0);
        FALLBACK_BOUNDS.0
    };
    let max = if max.is_finite() {
        max
    } else {
        warn!("Slider '{}' has non-finite max {}, using {}", label, max, FALLBACK_BOUNDS.1);
        FALLBACK_BOUNDS.1
    };
    if min > max {
        warn!("Slider '{}' built with min {} > max {}, swapping bounds", label, min, max);
        (max, min)
    } else {
        (min, max)
    }
}

fn run(command: &mut Option<Command>, changed: bool) {
    if changed {
        if let Some(command) = command.as_mut() {
            command.execute();
        }
    }
}

/// Push button; "changed" means it was clicked this frame.
pub struct Button {
    label: String,
    command: Option<Command>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: None,
        }
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let clicked = widgets.button(&self.label);
        run(&mut self.command, clicked);
        clicked
    }
}

/// Scalar slider with inclusive bounds.
///
/// The stored value is always inside `[min, max]`. Inverted bounds passed to
/// [`FloatSlider::new`] are swapped. A NaN handed to
/// [`FloatSlider::set_value`] is ignored.
pub struct FloatSlider {
    label: String,
    value: Rc<Cell<f32>>,
    min: f32,
    max: f32,
    command: Option<Command>,
}

impl FloatSlider {
    pub fn new(label: impl Into<String>, value: f32, min: f32, max: f32) -> Self {
        let label = label.into();
        let (min, max) = ordered_bounds(&label, min, max);
        let initial = if value.is_nan() { min } else { value.clamp(min, max) };
        Self {
            label,
            value: Rc::new(Cell::new(initial)),
            min,
            max,
            command: None,
        }
    }

    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn set_value(&mut self, value: f32) {
        if !value.is_nan() {
            self.value.set(value.clamp(self.min, self.max));
        }
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn handle(&self) -> ValueHandle<f32> {
        ValueHandle(Rc::clone(&self.value))
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let mut value = self.value.get();
        let changed = widgets.slider_f32(&self.label, &mut value, self.min, self.max);
        if changed {
            self.set_value(value);
        }
        run(&mut self.command, changed);
        changed
    }
}

/// Three-component slider; bounds are shared by all components.
pub struct Vec3Slider {
    label: String,
    value: Rc<Cell<[f32; 3]>>,
    min: f32,
    max: f32,
    command: Option<Command>,
}

impl Vec3Slider {
    pub fn new(label: impl Into<String>, value: [f32; 3], min: f32, max: f32) -> Self {
        let label = label.into();
        let (min, max) = ordered_bounds(&label, min, max);
        let mut slider = Self {
            label,
            value: Rc::new(Cell::new([min; 3])),
            min,
            max,
            command: None,
        };
        slider.set_value(value);
        slider
    }

    pub fn value(&self) -> [f32; 3] {
        self.value.get()
    }

    /// Stores `value` component-wise clamped. NaN components keep their
    /// previous value.
    pub fn set_value(&mut self, value: [f32; 3]) {
        let mut current = self.value.get();
        for (slot, v) in current.iter_mut().zip(value) {
            if !v.is_nan() {
                *slot = v.clamp(self.min, self.max);
            }
        }
        self.value.set(current);
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn handle(&self) -> ValueHandle<[f32; 3]> {
        ValueHandle(Rc::clone(&self.value))
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let mut value = self.value.get();
        let changed = widgets.slider_vec3(&self.label, &mut value, self.min, self.max);
        if changed {
            self.set_value(value);
        }
        run(&mut self.command, changed);
        changed
    }
}

pub struct Checkbox {
    label: String,
    value: Rc<Cell<bool>>,
    command: Option<Command>,
}

impl Checkbox {
    pub fn new(label: impl Into<String>, value: bool) -> Self {
        Self {
            label: label.into(),
            value: Rc::new(Cell::new(value)),
            command: None,
        }
    }

    pub fn value(&self) -> bool {
        self.value.get()
    }

    pub fn set_value(&mut self, value: bool) {
        self.value.set(value);
    }

    pub fn handle(&self) -> ValueHandle<bool> {
        ValueHandle(Rc::clone(&self.value))
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let mut value = self.value.get();
        let changed = widgets.checkbox(&self.label, &mut value);
        if changed {
            self.value.set(value);
        }
        run(&mut self.command, changed);
        changed
    }
}

/// Dropdown over a fixed list of options.
///
/// The selection is `None` exactly when there are no options; otherwise it
/// starts at the first option. Only picking a different index counts as a
/// change, re-picking the current option does not.
pub struct Selector {
    label: String,
    options: Rc<[String]>,
    selected: Rc<Cell<Option<usize>>>,
    command: Option<Command>,
}

impl Selector {
    pub fn new<I, S>(label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Rc<[String]> = options.into_iter().map(Into::<String>::into).collect();
        let selected = if options.is_empty() { None } else { Some(0) };
        Self {
            label: label.into(),
            options,
            selected: Rc::new(Cell::new(selected)),
            command: None,
        }
    }

    /// Starts on `index` instead of the first option, if it is valid.
    pub fn with_selected(mut self, index: usize) -> Self {
        self.set_selected_index(index);
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_index()
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Selects `index`. Out-of-range indices leave the selection untouched
    /// and return `false`.
    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if index < self.options.len() {
            self.selected.set(Some(index));
            true
        } else {
            false
        }
    }

    pub fn handle(&self) -> SelectionHandle {
        SelectionHandle {
            options: Rc::clone(&self.options),
            selected: Rc::clone(&self.selected),
        }
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let previous = self.selected.get();
        let mut selected = previous;
        widgets.combo(&self.label, &mut selected, &self.options);

        let changed = match selected {
            Some(index) if index < self.options.len() => {
                self.selected.set(Some(index));
                selected != previous
            }
            _ => false,
        };
        run(&mut self.command, changed);
        changed
    }
}

/// Static text. Never changes and never runs a command.
pub struct Label {
    text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        widgets.label(&self.text);
        false
    }
}

/// One control of a [`Panel`](super::Panel).
///
/// The variant is fixed at construction; the typed accessors return `None`
/// on a variant mismatch instead of failing.
pub enum Element {
    Button(Button),
    FloatSlider(FloatSlider),
    Vec3Slider(Vec3Slider),
    Checkbox(Checkbox),
    Selector(Selector),
    Label(Label),
}

impl Element {
    /// Display label of the control (the text itself for labels).
    pub fn label(&self) -> &str {
        match self {
            Element::Button(e) => &e.label,
            Element::FloatSlider(e) => &e.label,
            Element::Vec3Slider(e) => &e.label,
            Element::Checkbox(e) => &e.label,
            Element::Selector(e) => &e.label,
            Element::Label(e) => &e.text,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Button(_) => "Button",
            Element::FloatSlider(_) => "FloatSlider",
            Element::Vec3Slider(_) => "Vec3Slider",
            Element::Checkbox(_) => "Checkbox",
            Element::Selector(_) => "Selector",
            Element::Label(_) => "Label",
        }
    }

    /// Draws the control and reports whether it changed during this call.
    ///
    /// A bound command has already run once when this returns `true`.
    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        match self {
            Element::Button(e) => e.render(widgets),
            Element::FloatSlider(e) => e.render(widgets),
            Element::Vec3Slider(e) => e.render(widgets),
            Element::Checkbox(e) => e.render(widgets),
            Element::Selector(e) => e.render(widgets),
            Element::Label(e) => e.render(widgets),
        }
    }

    /// Binds `command`, replacing any previous one. Labels never change, so
    /// a command bound to one is dropped.
    pub fn bind(&mut self, command: Command) -> &mut Self {
        let slot = match self {
            Element::Button(e) => &mut e.command,
            Element::FloatSlider(e) => &mut e.command,
            Element::Vec3Slider(e) => &mut e.command,
            Element::Checkbox(e) => &mut e.command,
            Element::Selector(e) => &mut e.command,
            Element::Label(e) => {
                warn!("Ignoring command bound to label '{}'", e.text);
                return self;
            }
        };
        *slot = Some(command);
        self
    }

    pub fn has_command(&self) -> bool {
        match self {
            Element::Button(e) => e.command.is_some(),
            Element::FloatSlider(e) => e.command.is_some(),
            Element::Vec3Slider(e) => e.command.is_some(),
            Element::Checkbox(e) => e.command.is_some(),
            Element::Selector(e) => e.command.is_some(),
            Element::Label(_) => false,
        }
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Element::Button(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_float_slider(&self) -> Option<&FloatSlider> {
        match self {
            Element::FloatSlider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_float_slider_mut(&mut self) -> Option<&mut FloatSlider> {
        match self {
            Element::FloatSlider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_vec3_slider(&self) -> Option<&Vec3Slider> {
        match self {
            Element::Vec3Slider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_vec3_slider_mut(&mut self) -> Option<&mut Vec3Slider> {
        match self {
            Element::Vec3Slider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_checkbox(&self) -> Option<&Checkbox> {
        match self {
            Element::Checkbox(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_checkbox_mut(&mut self) -> Option<&mut Checkbox> {
        match self {
            Element::Checkbox(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            Element::Selector(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_selector_mut(&mut self) -> Option<&mut Selector> {
        match self {
            Element::Selector(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Element::Label(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind())
            .field("label", &self.label())
            .field("has_command", &self.has_command())
            .finish()
    }
}

macro_rules! element_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Element {
                fn from(element: $variant) -> Self {
                    Element::$variant(element)
                }
            }
        )*
    };
}

element_from!(Button, FloatSlider, Vec3Slider, Checkbox, Selector, Label);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::testing::{Drawn, Interaction, ScriptedWidgets};
    use std::cell::RefCell;

    fn counting_command() -> (Command, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        (Command::new(move || counter.set(counter.get() + 1)), hits)
    }

    #[test]
    fn test_float_slider_clamps_set_value() {
        let mut slider = FloatSlider::new("roughness", 0.0, -10.0, 10.0);
        for v in [25.0, -3.5, -100.0, 10.0, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            slider.set_value(v);
            let current = slider.value();
            assert!((-10.0..=10.0).contains(&current), "{} escaped bounds", current);
        }
        slider.set_value(4.0);
        slider.set_value(f32::NAN);
        assert_eq!(slider.value(), 4.0);
    }

    #[test]
    fn test_float_slider_clamps_initial_value() {
        assert_eq!(FloatSlider::new("a", 42.0, 0.0, 1.0).value(), 1.0);
        assert_eq!(FloatSlider::new("b", -42.0, 0.0, 1.0).value(), 0.0);
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let slider = FloatSlider::new("inverted", 5.0, 10.0, -10.0);
        assert_eq!(slider.bounds(), (-10.0, 10.0));
        assert_eq!(slider.value(), 5.0);

        let vec = Vec3Slider::new("inverted", [0.0; 3], 1.0, -1.0);
        assert_eq!(vec.bounds(), (-1.0, 1.0));
    }

    #[test]
    fn test_non_finite_bounds_fall_back() {
        let mut slider = FloatSlider::new("x", 1.0, f32::NAN, 5.0);
        assert_eq!(slider.bounds(), (-10.0, 5.0));
        assert_eq!(slider.value(), 1.0);
        slider.set_value(100.0);
        assert_eq!(slider.value(), 5.0);

        let slider = FloatSlider::new("y", 3.0, 0.0, f32::INFINITY);
        assert_eq!(slider.bounds(), (0.0, 10.0));

        // Replaced min ends up above the given max and gets swapped
        let slider = FloatSlider::new("z", 0.0, f32::NEG_INFINITY, -20.0);
        assert_eq!(slider.bounds(), (-20.0, -10.0));
        assert_eq!(slider.value(), -10.0);

        let mut vec = Vec3Slider::new("w", [0.5; 3], f32::NAN, f32::NAN);
        assert_eq!(vec.bounds(), (-10.0, 10.0));
        vec.set_value([50.0, -50.0, 2.0]);
        assert_eq!(vec.value(), [10.0, -10.0, 2.0]);
    }

    #[test]
    fn test_float_slider_clamps_widget_input() {
        let mut slider = FloatSlider::new("roughness", 0.0, -10.0, 10.0);
        let mut widgets = ScriptedWidgets::new();
        widgets.interact("roughness", Interaction::SetFloat(50.0));

        assert!(slider.render(&mut widgets));
        assert_eq!(slider.value(), 10.0);
    }

    #[test]
    fn test_vec3_slider_clamps_per_component() {
        let mut slider = Vec3Slider::new("tint", [0.0; 3], -1.0, 1.0);
        slider.set_value([2.0, -0.5, -7.0]);
        assert_eq!(slider.value(), [1.0, -0.5, -1.0]);

        slider.set_value([f32::NAN, 0.25, 0.0]);
        assert_eq!(slider.value(), [1.0, 0.25, 0.0]);
    }

    #[test]
    fn test_command_runs_once_per_interaction() {
        let (command, hits) = counting_command();
        let mut element: Element = FloatSlider::new("x", 0.0, -1.0, 1.0).into();
        element.bind(command);
        let mut widgets = ScriptedWidgets::new();

        assert!(!element.render(&mut widgets));
        assert_eq!(hits.get(), 0);

        widgets.interact("x", Interaction::SetFloat(0.5));
        assert!(element.render(&mut widgets));
        assert_eq!(hits.get(), 1);

        // No interaction queued for the next frame.
        assert!(!element.render(&mut widgets));
        assert_eq!(hits.get(), 1);

        for frame in 0..5 {
            widgets.interact("x", Interaction::SetFloat(frame as f32 / 10.0));
            element.render(&mut widgets);
        }
        assert_eq!(hits.get(), 6);
    }

    #[test]
    fn test_command_sees_updated_value() {
        let slider = Vec3Slider::new("tint", [0.0; 3], -10.0, 10.0);
        let handle = slider.handle();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut element = Element::from(slider);
        element.bind(Command::new(move || sink.borrow_mut().push(handle.get())));

        let mut widgets = ScriptedWidgets::new();
        widgets.interact("tint", Interaction::SetVec3([1.0, 2.0, 30.0]));
        element.render(&mut widgets);

        assert_eq!(seen.borrow().as_slice(), [[1.0, 2.0, 10.0]]);
    }

    #[test]
    fn test_button_reports_clicks() {
        let (command, hits) = counting_command();
        let mut element = Element::from(Button::new("Reset"));
        element.bind(command);
        let mut widgets = ScriptedWidgets::new();

        assert!(!element.render(&mut widgets));
        widgets.interact("Reset", Interaction::Click);
        assert!(element.render(&mut widgets));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_checkbox_toggles() {
        let (command, hits) = counting_command();
        let checkbox = Checkbox::new("Visible", true);
        let handle = checkbox.handle();
        let mut element = Element::from(checkbox);
        element.bind(command);

        let mut widgets = ScriptedWidgets::new();
        widgets.interact("Visible", Interaction::Toggle);
        assert!(element.render(&mut widgets));
        assert!(!handle.get());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_selector_defaults_and_bounds() {
        let mut selector = Selector::new("mode", ["line", "fill"]);
        assert_eq!(selector.selected_index(), Some(0));
        assert_eq!(selector.selected_option(), Some("line"));

        assert!(selector.set_selected_index(1));
        assert!(!selector.set_selected_index(2));
        assert_eq!(selector.selected_index(), Some(1));
        assert_eq!(selector.selected_option(), Some("fill"));

        let empty = Selector::new("empty", Vec::<String>::new());
        assert_eq!(empty.selected_index(), None);
        assert_eq!(empty.selected_option(), None);
    }

    #[test]
    fn test_selector_with_selected() {
        let selector = Selector::new("s", ["a", "b", "c"]).with_selected(2);
        assert_eq!(selector.selected_option(), Some("c"));
        let unchanged = Selector::new("s", ["a"]).with_selected(9);
        assert_eq!(unchanged.selected_index(), Some(0));
    }

    #[test]
    fn test_selector_changes_only_on_new_index() {
        let (command, hits) = counting_command();
        let selector = Selector::new("mode", ["line", "fill"]);
        let handle = selector.handle();
        let mut element = Element::from(selector);
        element.bind(command);
        let mut widgets = ScriptedWidgets::new();

        widgets.interact("mode", Interaction::Select(0));
        assert!(!element.render(&mut widgets));
        assert_eq!(hits.get(), 0);

        widgets.interact("mode", Interaction::Select(1));
        assert!(element.render(&mut widgets));
        assert_eq!(hits.get(), 1);
        assert_eq!(handle.option().as_deref(), Some("fill"));

        widgets.interact("mode", Interaction::Select(7));
        assert!(!element.render(&mut widgets));
        assert_eq!(handle.index(), Some(1));
    }

    #[test]
    fn test_empty_selector_renders_without_selection() {
        let mut selector = Selector::new("shader", Vec::<String>::new());
        let mut widgets = ScriptedWidgets::new();
        widgets.interact("shader", Interaction::Select(0));

        assert!(!selector.render(&mut widgets));
        assert_eq!(widgets.drawn, vec![Drawn::Combo("shader".into(), None)]);
    }

    #[test]
    fn test_label_never_changes() {
        let mut element = Element::from(Label::new("No Game Object Selected."));
        let (command, hits) = counting_command();
        element.bind(command);
        assert!(!element.has_command());

        let mut widgets = ScriptedWidgets::new();
        assert!(!element.render(&mut widgets));
        assert_eq!(hits.get(), 0);
        assert_eq!(
            widgets.drawn,
            vec![Drawn::Label("No Game Object Selected.".into())]
        );
    }

    #[test]
    fn test_typed_accessors_check_variant() {
        let mut element = Element::from(FloatSlider::new("f", 0.0, 0.0, 1.0));
        assert!(element.as_float_slider().is_some());
        assert!(element.as_button().is_none());
        assert!(element.as_vec3_slider_mut().is_none());
        assert!(element.as_selector().is_none());
        assert_eq!(element.kind(), "FloatSlider");
        assert_eq!(element.label(), "f");
    }
}
