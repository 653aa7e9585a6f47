//! Builds a panel of controls from a shading program's uniforms
//!
//! Every scalar float uniform becomes a [`FloatSlider`] and every `vec3`
//! uniform a [`Vec3Slider`]; moving either pushes the new value to the
//! program. A "Recompile Current Shader" button reloads the program and
//! regenerates the panel so it follows the new uniform set.

use std::rc::Rc;

use log::{debug, info};

use super::command::Command;
use super::context::UiContext;
use super::element::{Button, FloatSlider, Vec3Slider};
use crate::config::SliderDefaults;
use crate::gfx::shader::{ShaderBackend, UniformDescriptor, UniformKind};
use crate::Shared;

/// Element name of the fixed recompile button.
pub const RECOMPILE_BUTTON: &str = "RecompileShaderButton";
pub const RECOMPILE_LABEL: &str = "Recompile Current Shader";

/// Uniforms the renderer fills in itself.
const RENDERER_UNIFORMS: [&str; 3] = ["model", "view", "projection"];
const RESERVED_PREFIXES: [&str; 2] = ["gl_", "__"];

/// Why a uniform gets no control, or `None` if it gets one.
pub fn skip_reason(uniform: &UniformDescriptor) -> Option<&'static str> {
    if RESERVED_PREFIXES.iter().any(|p| uniform.name.starts_with(p)) {
        Some("reserved name")
    } else if RENDERER_UNIFORMS.contains(&uniform.name.as_str()) {
        Some("supplied by the renderer")
    } else if !uniform.is_parameter() {
        Some("outside the parameter block")
    } else if uniform.is_array() {
        Some("array")
    } else {
        None
    }
}

pub struct ShaderReflectionGenerator<B: ShaderBackend> {
    backend: Shared<B>,
    defaults: SliderDefaults,
}

impl<B: ShaderBackend> Clone for ShaderReflectionGenerator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
            defaults: self.defaults,
        }
    }
}

impl<B: ShaderBackend + 'static> ShaderReflectionGenerator<B> {
    pub fn new(backend: Shared<B>) -> Self {
        Self {
            backend,
            defaults: SliderDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: SliderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn backend(&self) -> &Shared<B> {
        &self.backend
    }

    /// Replaces the contents of panel `panel_name` with controls for
    /// `shader`, creating the panel if needed.
    ///
    /// An unknown or uncompiled program leaves the panel empty.
    ///
    /// # Returns
    /// The number of uniform controls synthesized, the recompile button
    /// not included
    pub fn generate(&self, ui: &mut UiContext, panel_name: &str, shader: &str) -> usize {
        let deferred = ui.deferred();
        if ui.panel(panel_name).is_none() {
            ui.add_panel(panel_name, panel_name);
        }
        let Some(panel) = ui.panel_mut(panel_name) else {
            return 0;
        };
        panel.clear();

        let (program, uniforms) = {
            let backend = self.backend.borrow();
            let program = backend.program_id(shader);
            if !program.is_valid() {
                debug!("Shader '{}' has no valid program, nothing to reflect", shader);
                return 0;
            }
            (program, backend.active_uniforms(program))
        };

        let generator = self.clone();
        let shader_name = shader.to_string();
        let target = panel_name.to_string();
        panel
            .add(RECOMPILE_BUTTON, Button::new(RECOMPILE_LABEL))
            .bind(Command::new(move || {
                let id = generator.backend.borrow_mut().reload(&shader_name);
                info!("Recompiled '{}' as program {}", shader_name, id);
                let generator = generator.clone();
                let shader_name = shader_name.clone();
                let target = target.clone();
                deferred.push(move |ui| {
                    generator.generate(ui, &target, &shader_name);
                });
            }));

        let mut count = 0;
        for uniform in &uniforms {
            if let Some(reason) = skip_reason(uniform) {
                debug!("Skipping uniform '{}' ({})", uniform.name, reason);
                continue;
            }
            let SliderDefaults { value, min, max } = self.defaults;
            let name = uniform.name.clone();
            let backend = Rc::clone(&self.backend);
            match uniform.kind {
                UniformKind::Float => {
                    let slider = FloatSlider::new(&uniform.name, value, min, max);
                    let handle = slider.handle();
                    panel.add(&uniform.name, slider).bind(Command::new(move || {
                        backend.borrow_mut().set_float(program, &name, handle.get());
                    }));
                }
                UniformKind::Vec3 => {
                    let slider = Vec3Slider::new(&uniform.name, [value; 3], min, max);
                    let handle = slider.handle();
                    panel.add(&uniform.name, slider).bind(Command::new(move || {
                        backend.borrow_mut().set_vec3(program, &name, handle.get());
                    }));
                }
                kind => {
                    debug!("No control for uniform '{}' of kind {:?}", uniform.name, kind);
                    continue;
                }
            }
            count += 1;
        }

        info!(
            "Reflected {} of {} uniforms of '{}' (program {})",
            count,
            uniforms.len(),
            shader,
            program
        );
        count
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::gfx::shader::backend::testing::FakeBackend;
    use crate::gfx::shader::ProgramId;
    use crate::ui::widgets::testing::{Drawn, Interaction, ScriptedWidgets};

    const PANEL: &str = "ShaderInfo";

    fn material() -> Shared<FakeBackend> {
        Rc::new(RefCell::new(FakeBackend::new().with_program(
            "material",
            &[
                ("roughness", UniformKind::Float, None),
                ("view", UniformKind::Mat4, None),
                ("tintColor", UniformKind::Vec3, None),
                ("lightPositions[0]", UniformKind::Vec3, Some(4)),
            ],
        )))
    }

    #[test]
    fn test_generates_controls_for_supported_uniforms() {
        let backend = material();
        let generator = ShaderReflectionGenerator::new(Rc::clone(&backend));
        let mut ui = UiContext::new();

        assert_eq!(generator.generate(&mut ui, PANEL, "material"), 2);

        let panel = ui.panel(PANEL).unwrap();
        assert_eq!(panel.len(), 3);
        assert!(panel.button(RECOMPILE_BUTTON).is_some());
        let roughness = panel.float_slider("roughness").unwrap();
        assert_eq!(roughness.value(), 0.0);
        assert_eq!(roughness.bounds(), (-10.0, 10.0));
        assert_eq!(panel.vec3_slider("tintColor").unwrap().value(), [0.0; 3]);
        assert!(panel.get("view").is_none());
        assert!(panel.get("lightPositions[0]").is_none());

        let mut widgets = ScriptedWidgets::new();
        ui.render(&mut widgets);
        assert_eq!(widgets.control_count(), 3);
    }

    #[test]
    fn test_invalid_program_yields_empty_panel() {
        let generator = ShaderReflectionGenerator::new(material());
        let mut ui = UiContext::new();
        ui.add_panel(PANEL, "Shader Info").add("stale", Button::new("stale"));

        assert_eq!(generator.generate(&mut ui, PANEL, "missing"), 0);
        let panel = ui.panel(PANEL).unwrap();
        assert!(panel.is_empty());
        assert_eq!(panel.title(), "Shader Info");
    }

    #[test]
    fn test_unsupported_and_reserved_uniforms_are_skipped() {
        let backend = Rc::new(RefCell::new(FakeBackend::new().with_program(
            "odd",
            &[
                ("gl_Position", UniformKind::Vec4, None),
                ("__padding", UniformKind::Float, None),
                ("model", UniformKind::Mat4, None),
                ("projection", UniformKind::Mat4, None),
                ("offset", UniformKind::Vec2, None),
                ("color", UniformKind::Vec4, None),
                ("count", UniformKind::Int, None),
                ("enabled", UniformKind::Bool, None),
                ("albedo", UniformKind::Texture, None),
                ("albedo_sampler", UniformKind::Sampler, None),
                ("weights[0]", UniformKind::Float, Some(8)),
            ],
        )));
        let generator = ShaderReflectionGenerator::new(backend);
        let mut ui = UiContext::new();

        assert_eq!(generator.generate(&mut ui, PANEL, "odd"), 0);
        assert_eq!(ui.panel(PANEL).unwrap().names().collect::<Vec<_>>(), [RECOMPILE_BUTTON]);
    }

    #[test]
    fn test_renderer_blocks_get_no_controls() {
        let backend = Rc::new(RefCell::new(FakeBackend::new().with_program(
            "split",
            &[
                ("eye", UniformKind::Vec3, None),
                ("exposure", UniformKind::Float, None),
                ("gain", UniformKind::Float, None),
            ],
        )));
        for (_, uniforms) in backend.borrow_mut().programs.values_mut() {
            for uniform in uniforms.iter_mut().filter(|u| u.name != "gain") {
                uniform.group = 0;
            }
        }
        let generator = ShaderReflectionGenerator::new(backend);
        let mut ui = UiContext::new();

        assert_eq!(generator.generate(&mut ui, PANEL, "split"), 1);
        let names: Vec<_> = ui.panel(PANEL).unwrap().names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&RECOMPILE_BUTTON) && names.contains(&"gain"));
    }

    #[test]
    fn test_slider_pushes_value_to_program() {
        let backend = material();
        let program = backend.borrow().program_id("material");
        let generator = ShaderReflectionGenerator::new(Rc::clone(&backend));
        let mut ui = UiContext::new();
        generator.generate(&mut ui, PANEL, "material");

        let mut widgets = ScriptedWidgets::new();
        widgets
            .interact("roughness", Interaction::SetFloat(0.5))
            .interact("tintColor", Interaction::SetVec3([1.0, 0.5, 0.25]));
        assert!(ui.render(&mut widgets));

        let backend = backend.borrow();
        assert_eq!(backend.floats, [(program, "roughness".to_string(), 0.5)]);
        assert_eq!(backend.vec3s, [(program, "tintColor".to_string(), [1.0, 0.5, 0.25])]);
    }

    #[test]
    fn test_untouched_sliders_push_nothing() {
        let backend = material();
        let generator = ShaderReflectionGenerator::new(Rc::clone(&backend));
        let mut ui = UiContext::new();
        generator.generate(&mut ui, PANEL, "material");

        assert!(!ui.render(&mut ScriptedWidgets::new()));
        assert!(backend.borrow().floats.is_empty());
    }

    #[test]
    fn test_recompile_reloads_and_regenerates() {
        let backend = material();
        let before = backend.borrow().program_id("material");
        let generator = ShaderReflectionGenerator::new(Rc::clone(&backend));
        let mut ui = UiContext::new();
        generator.generate(&mut ui, PANEL, "material");

        let mut widgets = ScriptedWidgets::new();
        widgets.interact(RECOMPILE_LABEL, Interaction::Click);
        ui.render(&mut widgets);

        let after = backend.borrow().program_id("material");
        assert_eq!(backend.borrow().reloads, ["material"]);
        assert_ne!(before, after);
        assert_ne!(after, ProgramId::INVALID);

        // The regenerated slider targets the new program.
        let mut widgets = ScriptedWidgets::new();
        widgets.interact("roughness", Interaction::SetFloat(2.0));
        ui.render(&mut widgets);
        assert_eq!(backend.borrow().floats, [(after, "roughness".to_string(), 2.0)]);
        assert!(widgets.drawn.contains(&Drawn::Button(RECOMPILE_LABEL.to_string())));
    }

    #[test]
    fn test_custom_slider_defaults() {
        let generator = ShaderReflectionGenerator::new(material()).with_defaults(SliderDefaults {
            value: 1.0,
            min: 0.0,
            max: 2.0,
        });
        let mut ui = UiContext::new();
        generator.generate(&mut ui, PANEL, "material");

        let panel = ui.panel(PANEL).unwrap();
        assert_eq!(panel.float_slider("roughness").unwrap().bounds(), (0.0, 2.0));
        assert_eq!(panel.vec3_slider("tintColor").unwrap().value(), [1.0; 3]);
    }
}
