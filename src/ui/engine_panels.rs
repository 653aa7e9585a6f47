//! The sandbox's built-in panels
//!
//! [`EnginePanels::install`] registers panels for picking and inspecting
//! shaders, editing game objects, toggling global render features and
//! steering the camera. Every control talks to the engine through the
//! [`EngineState`] handles it captured; selections that rebuild another
//! panel go through the context's deferred queue.

use std::rc::Rc;

use log::{debug, info};

use super::command::Command;
use super::context::UiContext;
use super::element::{Button, Checkbox, FloatSlider, Label, Selector, Vec3Slider};
use super::reflection::ShaderReflectionGenerator;
use crate::gfx::camera::OrbitCamera;
use crate::gfx::rendering::{PolygonMode, RenderSettings};
use crate::gfx::scene::Scene;
use crate::gfx::shader::ShaderLibrary;
use crate::Shared;

pub const SHADERS_PANEL: &str = "Shaders";
pub const SHADER_INFO_PANEL: &str = "ShaderInfo";
pub const GAME_OBJECTS_PANEL: &str = "GameObjects";
pub const GAME_OBJECT_INFO_PANEL: &str = "GameObjectInfo";
pub const FEATURES_PANEL: &str = "Features";
pub const CAMERA_PANEL: &str = "Camera";

pub const NO_OBJECT_SELECTED: &str = "No Game Object Selected.";

/// Slider ranges of the game object editor.
const POSITION_RANGE: (f32, f32) = (-10.0, 10.0);
const ROTATION_RANGE: (f32, f32) = (-180.0, 180.0);
const SCALE_RANGE: (f32, f32) = (0.1, 10.0);

/// Handles onto everything the engine panels edit.
#[derive(Clone)]
pub struct EngineState {
    pub shaders: Shared<ShaderLibrary>,
    pub scene: Shared<Scene>,
    pub camera: Shared<OrbitCamera>,
    pub settings: Shared<RenderSettings>,
}

pub struct EnginePanels;

impl EnginePanels {
    /// Registers all engine panels, replacing any previous ones, and fills
    /// the info panels for the first shader and the first object.
    pub fn install(ui: &mut UiContext, state: &EngineState) {
        let generator = ShaderReflectionGenerator::new(Rc::clone(&state.shaders));
        Self::install_shaders(ui, state, &generator);
        Self::install_game_objects(ui, state);
        Self::install_features(ui, state);
        Self::install_camera(ui, state);
        info!("Installed engine panels");
    }

    fn install_shaders(ui: &mut UiContext, state: &EngineState, generator: &ShaderReflectionGenerator<ShaderLibrary>) {
        let names = state.shaders.borrow().names();
        let first = names.first().cloned();
        let deferred = ui.deferred();

        let selector = Selector::new("Shader", names);
        let selection = selector.handle();
        let on_select = generator.clone();
        ui.add_panel(SHADERS_PANEL, "Shaders")
            .add("Shader", selector)
            .bind(Command::new(move || {
                let Some(shader) = selection.option() else {
                    return;
                };
                let generator = on_select.clone();
                deferred.push(move |ui| {
                    generator.generate(ui, SHADER_INFO_PANEL, &shader);
                });
            }));

        ui.add_panel(SHADER_INFO_PANEL, "Shader Info");
        if let Some(shader) = first {
            generator.generate(ui, SHADER_INFO_PANEL, &shader);
        }
    }

    fn install_game_objects(ui: &mut UiContext, state: &EngineState) {
        ui.add_panel(GAME_OBJECTS_PANEL, "Game Objects");
        ui.add_panel(GAME_OBJECT_INFO_PANEL, "GameObject Info");
        Self::refresh_game_objects(ui, state);
    }

    /// Rebuilds the object selector from the scene's current names and
    /// shows the first object.
    pub fn refresh_game_objects(ui: &mut UiContext, state: &EngineState) {
        let names = state.scene.borrow().object_names();
        let first = names.first().cloned();
        let deferred = ui.deferred();

        let selector = Selector::new("Object", names);
        let selection = selector.handle();
        let on_select = state.clone();
        if ui.panel(GAME_OBJECTS_PANEL).is_none() {
            ui.add_panel(GAME_OBJECTS_PANEL, "Game Objects");
        }
        if let Some(panel) = ui.panel_mut(GAME_OBJECTS_PANEL) {
            panel.add("Object", selector).bind(Command::new(move || {
                let object = selection.option();
                let state = on_select.clone();
                deferred.push(move |ui| Self::show_game_object(ui, &state, object.as_deref()));
            }));
        }

        Self::show_game_object(ui, state, first.as_deref());
    }

    /// Fills the object editor for `name`, or shows the placeholder label.
    pub fn show_game_object(ui: &mut UiContext, state: &EngineState, name: Option<&str>) {
        if ui.panel(GAME_OBJECT_INFO_PANEL).is_none() {
            ui.add_panel(GAME_OBJECT_INFO_PANEL, "GameObject Info");
        }
        let Some(panel) = ui.panel_mut(GAME_OBJECT_INFO_PANEL) else {
            return;
        };
        panel.clear();

        let scene = state.scene.borrow();
        let Some(object) = name.and_then(|n| scene.object(n)) else {
            panel.add("NoSelection", Label::new(NO_OBJECT_SELECTED));
            return;
        };
        debug!("Showing game object '{}'", object.name());
        let name = object.name().to_string();

        panel.add("Name", Label::new(format!("Name: {name}")));

        let slider = Vec3Slider::new("Position", object.position(), POSITION_RANGE.0, POSITION_RANGE.1);
        let value = slider.handle();
        let (target, scene_handle) = (name.clone(), Rc::clone(&state.scene));
        panel.add("Position", slider).bind(Command::new(move || {
            if let Some(object) = scene_handle.borrow_mut().object_mut(&target) {
                object.set_position(value.get());
            }
        }));

        let slider = Vec3Slider::new("Rotation", object.rotation(), ROTATION_RANGE.0, ROTATION_RANGE.1);
        let value = slider.handle();
        let (target, scene_handle) = (name.clone(), Rc::clone(&state.scene));
        panel.add("Rotation", slider).bind(Command::new(move || {
            if let Some(object) = scene_handle.borrow_mut().object_mut(&target) {
                object.set_rotation(value.get());
            }
        }));

        let slider = Vec3Slider::new("Scale", object.scale(), SCALE_RANGE.0, SCALE_RANGE.1);
        let value = slider.handle();
        let (target, scene_handle) = (name.clone(), Rc::clone(&state.scene));
        panel.add("Scale", slider).bind(Command::new(move || {
            if let Some(object) = scene_handle.borrow_mut().object_mut(&target) {
                object.set_scale(value.get());
            }
        }));

        let checkbox = Checkbox::new("Visible", object.is_visible());
        let value = checkbox.handle();
        let (target, scene_handle) = (name.clone(), Rc::clone(&state.scene));
        panel.add("Visible", checkbox).bind(Command::new(move || {
            if let Some(object) = scene_handle.borrow_mut().object_mut(&target) {
                object.set_visible(value.get());
            }
        }));

        let shader_names = state.shaders.borrow().names();
        let current = shader_names.iter().position(|s| s == object.shader());
        let mut selector = Selector::new("Object shader", shader_names);
        if let Some(index) = current {
            selector.set_selected_index(index);
        }
        let selection = selector.handle();
        let scene_handle = Rc::clone(&state.scene);
        panel.add("Shader", selector).bind(Command::new(move || {
            let Some(shader) = selection.option() else {
                return;
            };
            if let Some(object) = scene_handle.borrow_mut().object_mut(&name) {
                info!("'{}' now uses shader '{}'", name, shader);
                object.set_shader(shader);
            }
        }));
    }

    fn install_features(ui: &mut UiContext, state: &EngineState) {
        let settings = *state.settings.borrow();
        let panel = ui.add_panel(FEATURES_PANEL, "Global Features");

        let mode = PolygonMode::OPTIONS
            .iter()
            .position(|o| *o == settings.polygon_mode.as_str())
            .unwrap_or_default();
        let selector = Selector::new("View mode", PolygonMode::OPTIONS).with_selected(mode);
        let selection = selector.handle();
        let handle = Rc::clone(&state.settings);
        panel.add("ViewMode", selector).bind(Command::new(move || {
            if let Some(mode) = selection.option().as_deref().and_then(PolygonMode::from_option) {
                info!("View mode: {}", mode);
                handle.borrow_mut().polygon_mode = mode;
            }
        }));

        let checkbox = Checkbox::new("Depth test", settings.depth_test);
        let value = checkbox.handle();
        let handle = Rc::clone(&state.settings);
        panel.add("DepthTest", checkbox).bind(Command::new(move || {
            handle.borrow_mut().depth_test = value.get();
        }));

        let checkbox = Checkbox::new("V-Sync", settings.vsync);
        let value = checkbox.handle();
        let handle = Rc::clone(&state.settings);
        panel.add("VSync", checkbox).bind(Command::new(move || {
            handle.borrow_mut().vsync = value.get();
        }));

        let checkbox = Checkbox::new("World axes", settings.show_axes);
        let value = checkbox.handle();
        let handle = Rc::clone(&state.settings);
        panel.add("WorldAxes", checkbox).bind(Command::new(move || {
            handle.borrow_mut().show_axes = value.get();
        }));

        let slider = Vec3Slider::new("Clear color", settings.clear_color, 0.0, 1.0);
        let value = slider.handle();
        let handle = Rc::clone(&state.settings);
        panel.add("ClearColor", slider).bind(Command::new(move || {
            handle.borrow_mut().clear_color = value.get();
        }));
    }

    fn install_camera(ui: &mut UiContext, state: &EngineState) {
        let camera = state.camera.borrow();
        let panel = ui.add_panel(CAMERA_PANEL, "Camera");

        let handle = Rc::clone(&state.camera);
        panel
            .add("Reset", Button::new("Reset"))
            .bind(Command::new(move || handle.borrow_mut().reset()));
        let handle = Rc::clone(&state.camera);
        panel
            .add("ZoomIn", Button::new("Zoom in"))
            .bind(Command::bind(move |step: &f32| handle.borrow_mut().zoom(*step), 1.0));
        let handle = Rc::clone(&state.camera);
        panel
            .add("ZoomOut", Button::new("Zoom out"))
            .bind(Command::bind(move |step: &f32| handle.borrow_mut().zoom(*step), -1.0));

        let slider = FloatSlider::new("Orbit sensitivity", camera.orbit_sensitivity(), 0.01, 1.0);
        let value = slider.handle();
        let handle = Rc::clone(&state.camera);
        panel.add("OrbitSensitivity", slider).bind(Command::new(move || {
            handle.borrow_mut().set_orbit_sensitivity(value.get());
        }));

        let slider = FloatSlider::new("Pan sensitivity", camera.pan_sensitivity(), 0.001, 0.1);
        let value = slider.handle();
        let handle = Rc::clone(&state.camera);
        panel.add("PanSensitivity", slider).bind(Command::new(move || {
            handle.borrow_mut().set_pan_sensitivity(value.get());
        }));

        let slider = FloatSlider::new("Zoom sensitivity", camera.zoom_sensitivity(), 0.05, 5.0);
        let value = slider.handle();
        let handle = Rc::clone(&state.camera);
        panel.add("ZoomSensitivity", slider).bind(Command::new(move || {
            handle.borrow_mut().set_zoom_sensitivity(value.get());
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::gfx::geometry::{generate_cube, generate_sphere};
    use crate::gfx::scene::{GameObject, Mesh};
    use crate::gfx::shader::{ShaderBackend, ShaderSource};
    use crate::ui::reflection::{RECOMPILE_BUTTON, RECOMPILE_LABEL};
    use crate::ui::widgets::testing::{Interaction, ScriptedWidgets};

    const FLAT: &str = r#"
        struct Params {
            color: vec3<f32>,
            gain: f32,
        };
        @group(2) @binding(0) var<uniform> params: Params;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(params.color * params.gain, 1.0);
        }
    "#;

    const PLAIN: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    "#;

    fn shared<T>(value: T) -> Shared<T> {
        Rc::new(RefCell::new(value))
    }

    fn state(objects: &[&str]) -> EngineState {
        let mut shaders = ShaderLibrary::new();
        shaders.load("flat", ShaderSource::Inline(FLAT.to_string()));
        shaders.load("plain", ShaderSource::Inline(PLAIN.to_string()));

        let mut scene = Scene::new();
        for name in objects {
            scene.add_object(GameObject::new(*name, Mesh::from(generate_cube()), "flat"));
        }

        EngineState {
            shaders: shared(shaders),
            scene: shared(scene),
            camera: shared(OrbitCamera::default()),
            settings: shared(RenderSettings::default()),
        }
    }

    fn installed(objects: &[&str]) -> (UiContext, EngineState) {
        let state = state(objects);
        let mut ui = UiContext::new();
        EnginePanels::install(&mut ui, &state);
        (ui, state)
    }

    #[test]
    fn test_install_registers_all_panels() {
        let (ui, _) = installed(&["cube"]);
        let names: Vec<_> = ui.panel_names().collect();
        assert_eq!(
            names,
            [
                CAMERA_PANEL,
                FEATURES_PANEL,
                GAME_OBJECT_INFO_PANEL,
                GAME_OBJECTS_PANEL,
                SHADER_INFO_PANEL,
                SHADERS_PANEL
            ]
        );
        assert_eq!(ui.panel(FEATURES_PANEL).unwrap().title(), "Global Features");
        assert_eq!(ui.panel(GAME_OBJECT_INFO_PANEL).unwrap().title(), "GameObject Info");
    }

    #[test]
    fn test_shader_info_shows_first_shader() {
        let (ui, _) = installed(&[]);
        let info = ui.panel(SHADER_INFO_PANEL).unwrap();
        assert!(info.button(RECOMPILE_BUTTON).is_some());
        assert!(info.vec3_slider("color").is_some());
        assert!(info.float_slider("gain").is_some());
    }

    #[test]
    fn test_selecting_shader_regenerates_info() {
        let (mut ui, _) = installed(&[]);
        let mut widgets = ScriptedWidgets::new();
        widgets.interact("Shader", Interaction::Select(1));
        ui.render(&mut widgets);

        let info = ui.panel(SHADER_INFO_PANEL).unwrap();
        assert_eq!(info.names().collect::<Vec<_>>(), [RECOMPILE_BUTTON]);
    }

    #[test]
    fn test_recompile_button_reloads_program() {
        let (mut ui, state) = installed(&[]);
        let before = state.shaders.borrow().program_id("flat");

        let mut widgets = ScriptedWidgets::new();
        widgets.interact(RECOMPILE_LABEL, Interaction::Click);
        ui.render(&mut widgets);

        let after = state.shaders.borrow().program_id("flat");
        assert!(after.is_valid());
        assert_ne!(before, after);
        assert!(ui.panel(SHADER_INFO_PANEL).unwrap().float_slider("gain").is_some());
    }

    #[test]
    fn test_shader_slider_writes_params_block() {
        let (mut ui, state) = installed(&[]);
        let mut widgets = ScriptedWidgets::new();
        widgets.interact("gain", Interaction::SetFloat(2.5));
        ui.render(&mut widgets);

        let shaders = state.shaders.borrow();
        assert_eq!(shaders.get("flat").unwrap().float("gain"), Some(2.5));
    }

    #[test]
    fn test_empty_scene_shows_placeholder() {
        let (ui, _) = installed(&[]);
        let info = ui.panel(GAME_OBJECT_INFO_PANEL).unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info.label("NoSelection").unwrap().text(), NO_OBJECT_SELECTED);
    }

    #[test]
    fn test_object_editor_moves_object() {
        let (mut ui, state) = installed(&["a", "b"]);
        let info = ui.panel(GAME_OBJECT_INFO_PANEL).unwrap();
        assert_eq!(info.label("Name").unwrap().text(), "Name: a");
        assert_eq!(info.vec3_slider("Scale").unwrap().value(), [1.0; 3]);

        let mut widgets = ScriptedWidgets::new();
        widgets
            .interact("Position", Interaction::SetVec3([1.0, 2.0, 3.0]))
            .interact("Visible", Interaction::Toggle);
        assert!(ui.render(&mut widgets));

        let scene = state.scene.borrow();
        let a = scene.object("a").unwrap();
        assert_eq!(a.position(), [1.0, 2.0, 3.0]);
        assert!(!a.is_visible());
        assert_eq!(scene.object("b").unwrap().position(), [0.0; 3]);
    }

    #[test]
    fn test_selecting_object_repopulates_editor() {
        let (mut ui, state) = installed(&["a", "b"]);
        state
            .scene
            .borrow_mut()
            .object_mut("b")
            .unwrap()
            .set_position([0.0, 5.0, 0.0]);

        let mut widgets = ScriptedWidgets::new();
        widgets.interact("Object", Interaction::Select(1));
        ui.render(&mut widgets);

        let info = ui.panel(GAME_OBJECT_INFO_PANEL).unwrap();
        assert_eq!(info.label("Name").unwrap().text(), "Name: b");
        assert_eq!(info.vec3_slider("Position").unwrap().value(), [0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_refresh_picks_up_new_objects() {
        let (mut ui, state) = installed(&["a"]);
        state
            .scene
            .borrow_mut()
            .add_object(GameObject::new("ball", Mesh::from(generate_sphere(8, 4)), "plain"));
        EnginePanels::refresh_game_objects(&mut ui, &state);

        let selector = ui.panel(GAME_OBJECTS_PANEL).unwrap().selector("Object").unwrap();
        assert_eq!(selector.options(), ["a", "ball"]);
    }

    #[test]
    fn test_object_shader_selector() {
        let (mut ui, state) = installed(&["a"]);
        let info = ui.panel(GAME_OBJECT_INFO_PANEL).unwrap();
        assert_eq!(info.selector("Shader").unwrap().selected_option(), Some("flat"));

        let mut widgets = ScriptedWidgets::new();
        widgets.interact("Object shader", Interaction::Select(1));
        ui.render(&mut widgets);
        assert_eq!(state.scene.borrow().object("a").unwrap().shader(), "plain");
    }

    #[test]
    fn test_features_panel_edits_settings() {
        let (mut ui, state) = installed(&[]);
        let mut widgets = ScriptedWidgets::new();
        widgets
            .interact("View mode", Interaction::Select(0))
            .interact("Depth test", Interaction::Toggle)
            .interact("World axes", Interaction::Toggle)
            .interact("Clear color", Interaction::SetVec3([1.0, 0.0, 0.0]));
        ui.render(&mut widgets);

        let settings = state.settings.borrow();
        assert_eq!(settings.polygon_mode, PolygonMode::Line);
        assert!(!settings.depth_test);
        assert!(settings.vsync);
        assert!(!settings.show_axes);
        assert_eq!(settings.clear_color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_camera_panel_drives_camera() {
        let (mut ui, state) = installed(&[]);
        let distance = state.camera.borrow().distance();
        let step = state.camera.borrow().zoom_sensitivity();

        let mut widgets = ScriptedWidgets::new();
        widgets
            .interact("Zoom in", Interaction::Click)
            .interact("Orbit sensitivity", Interaction::SetFloat(0.5));
        ui.render(&mut widgets);

        let camera = state.camera.borrow();
        assert!((camera.distance() - (distance - step)).abs() < 1e-5);
        assert_eq!(camera.orbit_sensitivity(), 0.5);
    }
}
