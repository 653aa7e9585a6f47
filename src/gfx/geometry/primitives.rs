//! # Primitive Shapes
//!
//! Y-up shapes centered at the origin, with per-vertex normals.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Vector3};

use super::GeometryData;

/// Builds a `columns` x `rows` grid of quads. `point(u, v)` maps grid
/// coordinates in `[0, 1]` to a position and normal.
fn grid<F>(columns: u32, rows: u32, mut point: F) -> GeometryData
where
    F: FnMut(f32, f32) -> ([f32; 3], [f32; 3]),
{
    let mut data = GeometryData::new();
    for row in 0..=rows {
        for column in 0..=columns {
            let (position, normal) = point(column as f32 / columns as f32, row as f32 / rows as f32);
            data.push_vertex(position, normal);
        }
    }

    let stride = columns + 1;
    for row in 0..rows {
        for column in 0..columns {
            let here = row * stride + column;
            data.push_quad(here, here + stride, here + stride + 1, here + 1);
        }
    }
    data
}

/// Unit cube spanning -0.5 to 0.5 on every axis.
///
/// Every face has its own four vertices so normals stay flat.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();
    let axes = [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()];

    for (i, &axis) in axes.iter().enumerate() {
        for sign in [1.0f32, -1.0] {
            let normal = axis * sign;
            // Two in-plane axes ordered so u x v points along the normal
            let u = axes[(i + 1) % 3] * sign;
            let v = normal.cross(u);
            let corner = |a: f32, b: f32| -> [f32; 3] { (normal * 0.5 + u * a + v * b).into() };

            let n = normal.into();
            let first = data.push_vertex(corner(-0.5, -0.5), n);
            data.push_vertex(corner(0.5, -0.5), n);
            data.push_vertex(corner(0.5, 0.5), n);
            data.push_vertex(corner(-0.5, 0.5), n);
            data.push_quad(first, first + 1, first + 2, first + 3);
        }
    }
    data
}

/// UV sphere of radius 1
///
/// # Arguments
/// * `longitude_segments` - Segments around the Y axis, at least 3
/// * `latitude_segments` - Segments from pole to pole, at least 2
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    grid(longitude_segments.max(3), latitude_segments.max(2), |u, v| {
        let (sin_phi, cos_phi) = (u * TAU).sin_cos();
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        let point = Vector3::new(sin_theta * cos_phi, -cos_theta, sin_theta * sin_phi).normalize();
        (point.into(), point.into())
    })
}

/// Flat plane in XZ facing +Y
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` - Subdivisions along X, at least 1
/// * `depth_segments` - Subdivisions along Z, at least 1
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    grid(width_segments.max(1), depth_segments.max(1), |u, v| {
        ([(u - 0.5) * width, 0.0, (v - 0.5) * depth], [0.0, 1.0, 0.0])
    })
}
