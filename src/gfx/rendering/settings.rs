//! Global render state edited from the "Global Features" panel

use std::fmt;

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

impl PolygonMode {
    /// Option labels in the order the view mode selector lists them.
    pub const OPTIONS: [&'static str; 2] = ["line", "fill"];

    pub fn from_option(option: &str) -> Option<Self> {
        match option {
            "line" => Some(Self::Line),
            "fill" => Some(Self::Fill),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Line => "line",
        }
    }

    pub fn to_wgpu(self) -> wgpu::PolygonMode {
        match self {
            Self::Fill => wgpu::PolygonMode::Fill,
            Self::Line => wgpu::PolygonMode::Line,
        }
    }
}

impl fmt::Display for PolygonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub polygon_mode: PolygonMode,
    pub depth_test: bool,
    pub vsync: bool,
    /// Draw the world axes gizmo.
    pub show_axes: bool,
    /// Linear RGB.
    pub clear_color: [f32; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            depth_test: true,
            vsync: true,
            show_axes: true,
            clear_color: [0.1, 0.2, 0.3],
        }
    }
}

impl RenderSettings {
    pub fn clear_color_wgpu(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}
