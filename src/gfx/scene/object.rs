//! Game objects: a mesh, a shader name and an editable transform

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};
use log::debug;
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;

/// Vertex and index data plus their GPU buffers once uploaded.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// Creates the vertex and index buffers. Does nothing if already done.
    pub fn upload(&mut self, device: &wgpu::Device) {
        if self.is_uploaded() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

impl From<GeometryData> for Mesh {
    fn from(data: GeometryData) -> Self {
        Self::new(data.vertices, data.indices)
    }
}

/// Per-object uniform buffer holding the model matrix (`@group(1)`).
pub struct ObjectGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

pub struct GameObject {
    name: String,
    mesh: Mesh,
    shader: String,
    position: Vector3<f32>,
    /// Euler angles in degrees, applied X, then Y, then Z.
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
    visible: bool,
    model: Matrix4<f32>,
    transform_dirty: bool,
    gpu_resources: Option<ObjectGpuResources>,
}

impl GameObject {
    /// Creates a visible object at the origin with unit scale.
    pub fn new(name: impl Into<String>, mesh: Mesh, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh,
            shader: shader.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            visible: true,
            model: Matrix4::identity(),
            transform_dirty: true,
            gpu_resources: None,
        }
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn shader(&self) -> &str {
        &self.shader
    }

    pub fn set_shader(&mut self, shader: impl Into<String>) {
        self.shader = shader.into();
    }

    pub fn position(&self) -> [f32; 3] {
        self.position.into()
    }

    pub fn rotation(&self) -> [f32; 3] {
        self.rotation.into()
    }

    pub fn scale(&self) -> [f32; 3] {
        self.scale.into()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_position(&mut self, position: [f32; 3]) {
        self.position = position.into();
        self.rebuild_model();
    }

    /// Sets the Euler rotation in degrees.
    pub fn set_rotation(&mut self, rotation: [f32; 3]) {
        self.rotation = rotation.into();
        self.rebuild_model();
    }

    pub fn set_scale(&mut self, scale: [f32; 3]) {
        self.scale = scale.into();
        self.rebuild_model();
    }

    pub fn model(&self) -> Matrix4<f32> {
        self.model
    }

    fn rebuild_model(&mut self) {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_z(Deg(self.rotation.z))
            * Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_x(Deg(self.rotation.x));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        self.model = t * r * s; // Order matters: T * R * S
        self.transform_dirty = true;
    }

    /// Uploads the mesh and creates the transform uniform.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        self.mesh.upload(device);
        if self.gpu_resources.is_some() {
            return;
        }
        debug!("Creating GPU resources for '{}'", self.name);

        let transform_data: &[f32; 16] = self.model.as_ref();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Uniform Buffer"),
            contents: bytemuck::cast_slice(transform_data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
        self.transform_dirty = false;
    }

    /// Writes the model matrix to the GPU if it changed since the last call.
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        if !self.transform_dirty {
            return;
        }
        if let Some(gpu_resources) = &self.gpu_resources {
            // cgmath matrices are column-major, which is what the GPU expects
            let transform_data: &[f32; 16] = self.model.as_ref();
            queue.write_buffer(
                &gpu_resources.transform_buffer,
                0,
                bytemuck::cast_slice(transform_data),
            );
            self.transform_dirty = false;
        }
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawObject {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_object(&mut self, object: &GameObject);
}

impl DrawObject for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    /// Binds the object's transform at `@group(1)` and draws its mesh.
    fn draw_object(&mut self, object: &GameObject) {
        let Some(bind_group) = object.transform_bind_group() else {
            return;
        };
        self.set_bind_group(1, bind_group, &[]);
        self.draw_mesh(&object.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use approx::assert_relative_eq;
    use cgmath::{Transform, Vector4};

    fn cube() -> GameObject {
        GameObject::new("cube", Mesh::from(generate_cube()), "phong")
    }

    #[test]
    fn test_new_object_has_identity_model() {
        let object = cube();
        assert_eq!(object.model(), Matrix4::identity());
        assert!(object.is_visible());
        assert_eq!(object.mesh().vertex_count(), 24);
        assert_eq!(object.mesh().index_count(), 36);
    }

    #[test]
    fn test_model_is_trs() {
        let mut object = cube();
        object.set_scale([2.0, 2.0, 2.0]);
        object.set_rotation([0.0, 90.0, 0.0]);
        object.set_position([1.0, 0.0, 0.0]);

        // +X scaled to 2, turned 90 degrees about Y onto -Z, then moved +X.
        let p = object.model() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p, Vector4::new(1.0, 0.0, -2.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_setters_rebuild_model_immediately() {
        let mut object = cube();
        object.set_position([0.0, 3.0, 0.0]);
        let moved = object.model().transform_point(cgmath::Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(moved.y, 3.0);
        assert_eq!(object.position(), [0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_builders() {
        let object = cube().with_position([1.0, 2.0, 3.0]).with_scale([0.5; 3]);
        assert_eq!(object.position(), [1.0, 2.0, 3.0]);
        assert_eq!(object.scale(), [0.5; 3]);
        assert!(object.transform_bind_group().is_none());
    }
}
