use std::marker::PhantomData;

/// Typed uniform buffer that skips writes of unchanged content.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        match type_name.rfind(':') {
            Some(pos) => &type_name[(pos + 1)..],
            None => type_name,
        }
    }

    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", Self::name())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Writes `content` unless it equals what was written last time.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Untyped uniform buffer sized from a reflected block layout.
pub struct RawUniformBuffer {
    buffer: wgpu::Buffer,
}

impl RawUniformBuffer {
    /// Creates a buffer holding `contents`, padded to the 16-byte uniform
    /// alignment.
    pub fn new(device: &wgpu::Device, label: &str, contents: &[u8]) -> Self {
        let size = padded_size(contents.len() as u64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        buffer.slice(..).get_mapped_range_mut()[..contents.len()].copy_from_slice(contents);
        buffer.unmap();

        Self { buffer }
    }

    pub fn write(&self, queue: &wgpu::Queue, contents: &[u8]) {
        queue.write_buffer(&self.buffer, 0, contents);
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// Rounds `len` up to a multiple of 16, never returning zero.
pub fn padded_size(len: u64) -> u64 {
    len.max(16).div_ceil(16) * 16
}
