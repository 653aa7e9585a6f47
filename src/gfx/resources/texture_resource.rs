//! Render target textures

use wgpu::{Device, Extent3d, SurfaceConfiguration, TextureFormat, TextureUsages};

/// A render attachment and the view passes bind it through.
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Single-layer extent; zero sizes (minimized window) become 1.
pub fn attachment_extent(width: u32, height: u32) -> Extent3d {
    Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

impl TextureResource {
    pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

    /// Creates a 2-D attachment of `format` covering `width` x `height`.
    pub fn attachment(device: &Device, label: &str, width: u32, height: u32, format: TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: attachment_extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        Self { texture, view }
    }

    /// Depth buffer sized to the surface.
    pub fn create_depth_texture(device: &Device, config: &SurfaceConfiguration, label: &str) -> Self {
        Self::attachment(device, label, config.width, config.height, Self::DEPTH_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_extent_never_empty() {
        let extent = attachment_extent(0, 720);
        assert_eq!((extent.width, extent.height, extent.depth_or_array_layers), (1, 720, 1));
    }
}
