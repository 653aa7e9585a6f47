//! Named containers of editable elements
//!
//! A [`Panel`] owns its elements by name and draws all of them inside one
//! grouping region (an imgui window when drawn through
//! [`ImguiWidgets`](super::ImguiWidgets)). Elements are drawn in name order.

use std::collections::btree_map::{BTreeMap, Entry};

use log::debug;

use super::element::{Button, Checkbox, Element, FloatSlider, Label, Selector, Vec3Slider};
use super::widgets::Widgets;

#[derive(Debug)]
pub struct Panel {
    title: String,
    elements: BTreeMap<String, Element>,
}

impl Panel {
    /// Creates an empty panel whose grouping region is called `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: BTreeMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Inserts `element` under `name`, replacing any element already stored
    /// there, and returns it for wiring.
    ///
    /// ```
    /// use tinkerbox::ui::{Button, Command, Panel};
    ///
    /// let mut panel = Panel::new("Camera");
    /// panel
    ///     .add("Reset", Button::new("Reset"))
    ///     .bind(Command::new(|| {}));
    /// assert!(panel.button("Reset").is_some());
    /// ```
    pub fn add(&mut self, name: impl Into<String>, element: impl Into<Element>) -> &mut Element {
        let name = name.into();
        let element = element.into();
        debug!(
            "Panel '{}': adding {} '{}'",
            self.title,
            element.kind(),
            name
        );

        match self.elements.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(element);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(element),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Element> {
        self.elements.remove(name)
    }

    /// Drops every element together with its command.
    pub fn clear(&mut self) {
        debug!(
            "Panel '{}': clearing {} elements",
            self.title,
            self.elements.len()
        );
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    /// Element names in draw order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements.get_mut(name)
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.get(name).and_then(Element::as_button)
    }

    pub fn float_slider(&self, name: &str) -> Option<&FloatSlider> {
        self.get(name).and_then(Element::as_float_slider)
    }

    pub fn float_slider_mut(&mut self, name: &str) -> Option<&mut FloatSlider> {
        self.get_mut(name).and_then(Element::as_float_slider_mut)
    }

    pub fn vec3_slider(&self, name: &str) -> Option<&Vec3Slider> {
        self.get(name).and_then(Element::as_vec3_slider)
    }

    pub fn vec3_slider_mut(&mut self, name: &str) -> Option<&mut Vec3Slider> {
        self.get_mut(name).and_then(Element::as_vec3_slider_mut)
    }

    pub fn checkbox(&self, name: &str) -> Option<&Checkbox> {
        self.get(name).and_then(Element::as_checkbox)
    }

    pub fn checkbox_mut(&mut self, name: &str) -> Option<&mut Checkbox> {
        self.get_mut(name).and_then(Element::as_checkbox_mut)
    }

    pub fn selector(&self, name: &str) -> Option<&Selector> {
        self.get(name).and_then(Element::as_selector)
    }

    pub fn selector_mut(&mut self, name: &str) -> Option<&mut Selector> {
        self.get_mut(name).and_then(Element::as_selector_mut)
    }

    pub fn label(&self, name: &str) -> Option<&Label> {
        self.get(name).and_then(Element::as_label)
    }

    /// Draws every element inside the panel's grouping region.
    ///
    /// Returns `true` if at least one element changed.
    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        let elements = &mut self.elements;
        let mut changed = false;
        widgets.group(&self.title, &mut |w| {
            for element in elements.values_mut() {
                changed |= element.render(w);
            }
        });
        changed
    }
}
