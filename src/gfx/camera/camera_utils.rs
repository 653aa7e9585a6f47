use cgmath::{Matrix4, SquareMatrix};

use super::orbit_camera::OrbitCamera;

/// GPU layout of the `Camera` block at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],

    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub eye: [f32; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view: convert_matrix4_to_array(Matrix4::identity()),
            projection: convert_matrix4_to_array(Matrix4::identity()),
            eye: [0.0; 4],
        }
    }
}

impl CameraUniform {
    pub fn from_camera(camera: &OrbitCamera) -> Self {
        let eye = camera.position();
        Self {
            view: convert_matrix4_to_array(camera.view()),
            projection: convert_matrix4_to_array(camera.projection()),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_matches_camera() {
        let camera = OrbitCamera::default();
        let uniform = CameraUniform::from_camera(&camera);
        assert_eq!(uniform.view, convert_matrix4_to_array(camera.view()));
        assert_eq!(uniform.eye[3], 1.0);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }

    #[test]
    fn test_matrix_conversion_is_column_major() {
        let m = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let array = convert_matrix4_to_array(m);
        assert_eq!(array[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
