//! UI context: the panel registry and the per-frame bracket
//!
//! [`UiContext`] owns every [`Panel`] plus one loose "Controls" panel for
//! elements that do not belong to a named panel. A frame is driven by
//! [`UiContext::render`], which resets the change flag, draws all panels and
//! then applies the actions commands queued through [`Deferred`].
//!
//! Commands run while their panel is being drawn, so they cannot restructure
//! the registry directly. They push a closure onto the [`Deferred`] queue
//! instead, and it runs with `&mut UiContext` once the panel pass is over.

use std::cell::RefCell;
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::{debug, info, trace, warn};

use super::element::Element;
use super::panel::Panel;
use super::widgets::Widgets;

/// Title of the region holding ungrouped elements.
pub const CONTROLS_PANEL: &str = "Controls";

type DeferredAction = Box<dyn FnOnce(&mut UiContext)>;

/// Cloneable handle onto the context's end-of-frame action queue.
#[derive(Clone, Default)]
pub struct Deferred {
    queue: Rc<RefCell<VecDeque<DeferredAction>>>,
}

impl Deferred {
    pub fn push<F>(&self, action: F)
    where
        F: FnOnce(&mut UiContext) + 'static,
    {
        self.queue.borrow_mut().push_back(Box::new(action));
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn take(&self) -> VecDeque<DeferredAction> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("pending", &self.len())
            .finish()
    }
}

/// Registry of panels and loose elements plus the per-frame change flag.
#[derive(Debug)]
pub struct UiContext {
    panels: BTreeMap<String, Panel>,
    controls: Panel,
    changed_this_frame: bool,
    in_frame: bool,
    frame: u64,
    deferred: Deferred,
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UiContext {
    pub fn new() -> Self {
        Self {
            panels: BTreeMap::new(),
            controls: Panel::new(CONTROLS_PANEL),
            changed_this_frame: false,
            in_frame: false,
            frame: 0,
            deferred: Deferred::default(),
        }
    }

    /// Registers an empty panel under `name`, replacing any panel already
    /// registered there.
    pub fn add_panel(&mut self, name: impl Into<String>, title: impl Into<String>) -> &mut Panel {
        let name = name.into();
        let panel = Panel::new(title);
        info!("Added panel '{}' ({})", name, panel.title());

        match self.panels.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(panel);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(panel),
        }
    }

    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.panels.get(name)
    }

    pub fn panel_mut(&mut self, name: &str) -> Option<&mut Panel> {
        self.panels.get_mut(name)
    }

    pub fn remove_panel(&mut self, name: &str) -> Option<Panel> {
        self.panels.remove(name)
    }

    pub fn panel_names(&self) -> impl Iterator<Item = &str> {
        self.panels.keys().map(String::as_str)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Adds an ungrouped element, drawn inside the "Controls" region.
    pub fn add_element(&mut self, name: impl Into<String>, element: impl Into<Element>) -> &mut Element {
        self.controls.add(name, element)
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.controls.get(name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.controls.get_mut(name)
    }

    pub fn remove_element(&mut self, name: &str) -> Option<Element> {
        self.controls.remove(name)
    }

    /// The loose elements as a panel, for typed lookups.
    pub fn controls(&self) -> &Panel {
        &self.controls
    }

    /// Handle commands use to queue registry changes for the end of the frame.
    pub fn deferred(&self) -> Deferred {
        self.deferred.clone()
    }

    /// Whether any element changed during the current (or last finished)
    /// frame. Reset by [`UiContext::begin_frame`].
    pub fn changed_this_frame(&self) -> bool {
        self.changed_this_frame
    }

    /// Raises the change flag from outside an element.
    pub fn mark_changed(&mut self) {
        self.changed_this_frame = true;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Opens a frame and resets the change flag. Ignored when a frame is
    /// already open.
    pub fn begin_frame(&mut self) {
        if self.in_frame {
            warn!("begin_frame called inside frame {}", self.frame);
            return;
        }
        self.in_frame = true;
        self.frame += 1;
        self.changed_this_frame = false;
    }

    /// Closes the frame and applies queued actions.
    pub fn end_frame(&mut self) {
        if !self.in_frame {
            warn!("end_frame called without an open frame");
            return;
        }
        self.in_frame = false;
        if self.changed_this_frame {
            trace!("Frame {}: UI value changed", self.frame);
        }
        self.apply_deferred();
    }

    /// Runs every action queued so far. Actions queued while these run are
    /// kept for the next call.
    pub fn apply_deferred(&mut self) {
        let actions = self.deferred.take();
        if !actions.is_empty() {
            debug!("Applying {} deferred UI actions", actions.len());
        }
        for action in actions {
            action(self);
        }
    }

    /// Draws all panels (loose controls first, only if there are any).
    fn render_panels(&mut self, widgets: &mut dyn Widgets) {
        if !self.in_frame {
            warn!("Panels rendered outside a UI frame, skipping");
            return;
        }

        let mut changed = false;
        if !self.controls.is_empty() {
            changed |= self.controls.render(widgets);
        }
        for panel in self.panels.values_mut() {
            changed |= panel.render(widgets);
        }
        self.changed_this_frame |= changed;
    }

    /// Runs one full UI frame: begin, draw every panel, end.
    ///
    /// Returns the frame's change flag.
    pub fn render(&mut self, widgets: &mut dyn Widgets) -> bool {
        self.begin_frame();
        self.render_panels(widgets);
        self.end_frame();
        self.changed_this_frame
    }

    /// Drops every panel, element, command and queued action.
    ///
    /// Must run before the UI library context goes away.
    pub fn shutdown(&mut self) {
        info!(
            "Shutting down UI context ({} panels, {} loose elements)",
            self.panels.len(),
            self.controls.len()
        );
        for panel in self.panels.values_mut() {
            panel.clear();
        }
        self.panels.clear();
        self.controls.clear();
        self.deferred.clear();
        self.in_frame = false;
        self.changed_this_frame = false;
    }
}
