//! Core rendering functionality
//!
//! Handles render pipelines, global render state and frame rendering.

pub mod axes;
pub mod pipeline_manager;
pub mod render_engine;
pub mod settings;

// Re-export main types
pub use axes::{axis_vertices, AxesOverlay, AxisVertex, AXES_LENGTH};
pub use pipeline_manager::{PipelineKey, PipelineManager};
pub use render_engine::RenderEngine;
pub use settings::{PolygonMode, RenderSettings};
