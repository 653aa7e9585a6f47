//! Orbit camera
//!
//! The camera always looks at `target` from `distance` away, at the given
//! `yaw` (around world Y) and `pitch` (above the XZ plane). Its state only
//! changes through [`OrbitCamera::orbit`], [`OrbitCamera::pan`],
//! [`OrbitCamera::zoom`], [`OrbitCamera::update_projection`] and
//! [`OrbitCamera::reset`]; the eye position is recomputed after each of them
//! and the view matrix is derived from it whenever it is read.

use cgmath::*;
use log::{debug, warn};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Limits applied to distance, pitch and (optionally) yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: Deg<f32>,
    pub max_pitch: Deg<f32>,
    pub min_yaw: Option<Deg<f32>>,
    pub max_yaw: Option<Deg<f32>>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.1),
            max_distance: Some(200.0),
            min_pitch: Deg(-89.0),
            max_pitch: Deg(89.0),
            min_yaw: None,
            max_yaw: None,
        }
    }
}

impl OrbitCameraBounds {
    /// Returns a copy safe to clamp with: non-finite or non-positive limits
    /// fall back to the defaults and inverted pairs are swapped.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let distance = |limit: Option<f32>, fallback: Option<f32>| match limit {
            Some(d) if !d.is_finite() || d <= 0.0 => {
                warn!("Camera distance limit {} is invalid, using {:?}", d, fallback);
                fallback
            }
            other => other,
        };
        let angle = |limit: Deg<f32>, fallback: Deg<f32>| {
            if limit.0.is_finite() {
                limit
            } else {
                warn!("Camera pitch limit {:?} is invalid, using {:?}", limit, fallback);
                fallback
            }
        };
        let yaw = |limit: Option<Deg<f32>>| limit.filter(|l| l.0.is_finite());

        let mut bounds = Self {
            min_distance: distance(self.min_distance, defaults.min_distance),
            max_distance: distance(self.max_distance, defaults.max_distance),
            min_pitch: angle(self.min_pitch, defaults.min_pitch),
            max_pitch: angle(self.max_pitch, defaults.max_pitch),
            min_yaw: yaw(self.min_yaw),
            max_yaw: yaw(self.max_yaw),
        };
        if let (Some(min), Some(max)) = (bounds.min_distance, bounds.max_distance) {
            if min > max {
                bounds.min_distance = Some(max);
                bounds.max_distance = Some(min);
            }
        }
        if bounds.min_pitch > bounds.max_pitch {
            std::mem::swap(&mut bounds.min_pitch, &mut bounds.max_pitch);
        }
        if bounds != *self {
            debug!("Camera bounds adjusted to {:?}", bounds);
        }
        bounds
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(
            self.min_distance.unwrap_or(f32::EPSILON),
            self.max_distance.unwrap_or(f32::MAX),
        )
    }

    fn clamp_pitch(&self, pitch: Deg<f32>) -> Deg<f32> {
        Deg(pitch.0.clamp(self.min_pitch.0, self.max_pitch.0))
    }

    fn clamp_yaw(&self, yaw: Deg<f32>) -> Deg<f32> {
        let mut bounded = yaw.0;
        if let Some(min_yaw) = self.min_yaw {
            bounded = bounded.max(min_yaw.0);
        }
        if let Some(max_yaw) = self.max_yaw {
            bounded = bounded.min(max_yaw.0);
        }
        Deg(bounded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrbitState {
    target: Point3<f32>,
    distance: f32,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: OrbitState,
    home: OrbitState,
    eye: Point3<f32>,
    up: Vector3<f32>,
    bounds: OrbitCameraBounds,
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
    orbit_sensitivity: f32,
    pan_sensitivity: f32,
    zoom_sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), 1200.0 / 800.0)
    }
}

impl OrbitCamera {
    /// Builds a camera from `config`. The configured state becomes the home
    /// position used by [`OrbitCamera::reset`].
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let bounds = config.bounds.sanitized();
        let home = OrbitState {
            target: config.target,
            distance: bounds.clamp_distance(config.distance),
            yaw: bounds.clamp_yaw(config.yaw),
            pitch: bounds.clamp_pitch(config.pitch),
        };
        let mut camera = Self {
            state: home,
            home,
            eye: Point3::origin(), // Set by `update()` below.
            up: Vector3::unit_y(),
            bounds,
            aspect,
            fovy: config.fovy,
            znear: config.znear,
            zfar: config.zfar,
            orbit_sensitivity: config.orbit_sensitivity,
            pan_sensitivity: config.pan_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
        };
        camera.update();
        camera
    }

    /// Rotates around the target by a pointer delta in pixels.
    ///
    /// Yaw grows with `dx`; pitch shrinks with `dy` and stays inside the
    /// pitch bounds.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let yaw = self.state.yaw + Deg(dx * self.orbit_sensitivity);
        let pitch = self.state.pitch - Deg(dy * self.orbit_sensitivity);
        self.state.yaw = self.bounds.clamp_yaw(yaw);
        self.state.pitch = self.bounds.clamp_pitch(pitch);
        self.update();
    }

    /// Moves the target in the view plane by a pointer delta in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.state.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        let movement = right * (-dx * self.pan_sensitivity) + up * (-dy * self.pan_sensitivity);
        self.state.target += movement;
        self.update();
    }

    /// Moves toward the target for positive `dy`, away for negative.
    pub fn zoom(&mut self, dy: f32) {
        let distance = self.state.distance - dy * self.zoom_sensitivity;
        self.state.distance = self.bounds.clamp_distance(distance);
        self.update();
    }

    /// Recomputes the aspect ratio for a resized surface. Zero-sized
    /// surfaces (minimised windows) are ignored.
    pub fn update_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Returns to the configured home position.
    pub fn reset(&mut self) {
        self.state = self.home;
        self.update();
    }

    /// Updates the camera after changing `target`, `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye = calculate_cartesian_eye_position(
            self.state.pitch,
            self.state.yaw,
            self.state.distance,
            self.state.target,
        );
    }

    pub fn position(&self) -> Point3<f32> {
        self.eye
    }

    pub fn target(&self) -> Point3<f32> {
        self.state.target
    }

    pub fn distance(&self) -> f32 {
        self.state.distance
    }

    pub fn yaw(&self) -> Deg<f32> {
        self.state.yaw
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.state.pitch
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn bounds(&self) -> &OrbitCameraBounds {
        &self.bounds
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.state.target, self.up)
    }

    /// Perspective projection already mapped to wgpu's 0..1 depth range.
    pub fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }

    pub fn orbit_sensitivity(&self) -> f32 {
        self.orbit_sensitivity
    }

    pub fn pan_sensitivity(&self) -> f32 {
        self.pan_sensitivity
    }

    pub fn zoom_sensitivity(&self) -> f32 {
        self.zoom_sensitivity
    }

    pub fn set_orbit_sensitivity(&mut self, sensitivity: f32) {
        self.orbit_sensitivity = sensitivity;
    }

    pub fn set_pan_sensitivity(&mut self, sensitivity: f32) {
        self.pan_sensitivity = sensitivity;
    }

    pub fn set_zoom_sensitivity(&mut self, sensitivity: f32) {
        self.zoom_sensitivity = sensitivity;
    }
}

fn calculate_cartesian_eye_position(
    pitch: Deg<f32>,
    yaw: Deg<f32>,
    distance: f32,
    target: Point3<f32>,
) -> Point3<f32> {
    let (pitch, yaw) = (Rad::from(pitch), Rad::from(yaw));
    target
        + Vector3::new(
            distance * yaw.0.sin() * pitch.0.cos(),
            distance * pitch.0.sin(),
            distance * yaw.0.cos() * pitch.0.cos(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_position() {
        let camera = OrbitCamera::default();
        assert_eq!(camera.distance(), 10.0);
        assert_relative_eq!(camera.position().distance(camera.target()), 10.0, epsilon = 1e-4);
        // Pitched up 20 degrees, looking from +Z.
        assert!(camera.position().y > 0.0);
        assert!(camera.position().z > 0.0);
        assert_relative_eq!(camera.position().x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_updates_yaw_and_view() {
        let mut camera = OrbitCamera::default();
        let initial_yaw = camera.yaw();
        let sensitivity = camera.orbit_sensitivity();

        camera.orbit(10.0, 0.0);

        assert_relative_eq!(camera.yaw().0, initial_yaw.0 + 10.0 * sensitivity);
        assert_eq!(camera.pitch(), Deg(20.0));

        let expected_eye = calculate_cartesian_eye_position(
            camera.pitch(),
            camera.yaw(),
            camera.distance(),
            camera.target(),
        );
        assert_relative_eq!(camera.position(), expected_eye, epsilon = 1e-5);
        let expected_view = Matrix4::look_at_rh(expected_eye, camera.target(), Vector3::unit_y());
        assert_relative_eq!(camera.view(), expected_view, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_stays_in_bounds() {
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera.orbit(3.0, -50.0);
            assert!(camera.pitch() <= Deg(89.0));
        }
        assert_eq!(camera.pitch(), Deg(89.0));
        for _ in 0..100 {
            camera.orbit(-3.0, 50.0);
            assert!(camera.pitch() >= Deg(-89.0));
        }
        assert_eq!(camera.pitch(), Deg(-89.0));
    }

    #[test]
    fn test_zoom_respects_distance_bounds() {
        let mut camera = OrbitCamera::default();
        for _ in 0..1000 {
            camera.zoom(1.0);
            assert!(camera.distance() >= 0.1);
        }
        assert_relative_eq!(camera.distance(), 0.1);

        for _ in 0..1000 {
            camera.zoom(-1.0);
            assert!(camera.distance() <= 200.0);
        }
        assert_relative_eq!(camera.distance(), 200.0);
    }

    #[test]
    fn test_zoom_moves_toward_target() {
        let mut camera = OrbitCamera::default();
        camera.zoom(2.0);
        assert_relative_eq!(camera.distance(), 10.0 - 2.0 * camera.zoom_sensitivity());
        assert_relative_eq!(
            camera.position().distance(camera.target()),
            camera.distance(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_pan_moves_target_in_view_plane() {
        let mut camera = OrbitCamera::default();
        let offset_before = camera.position() - camera.target();

        camera.pan(-100.0, 0.0);

        // Looking down -Z from +Z, dragging left moves the target along +X.
        assert!(camera.target().x > 0.0);
        assert_relative_eq!(camera.target().y, 0.0, epsilon = 1e-5);
        let offset_after = camera.position() - camera.target();
        assert_relative_eq!(offset_before, offset_after, epsilon = 1e-5);
    }

    #[test]
    fn test_update_projection_ignores_zero_size() {
        let mut camera = OrbitCamera::default();
        camera.update_projection(800, 400);
        assert_relative_eq!(camera.aspect(), 2.0);
        camera.update_projection(800, 0);
        assert_relative_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_reset_restores_home() {
        let mut camera = OrbitCamera::default();
        let home_eye = camera.position();
        camera.orbit(40.0, 12.0);
        camera.pan(5.0, 5.0);
        camera.zoom(3.0);
        camera.reset();
        assert_relative_eq!(camera.position(), home_eye, epsilon = 1e-5);
        assert_eq!(camera.target(), Point3::origin());
    }

    #[test]
    fn test_yaw_bounds() {
        let config = CameraConfig {
            bounds: OrbitCameraBounds {
                min_yaw: Some(Deg(-30.0)),
                max_yaw: Some(Deg(30.0)),
                ..OrbitCameraBounds::default()
            },
            ..CameraConfig::default()
        };
        let mut camera = OrbitCamera::new(&config, 1.0);
        camera.orbit(1000.0, 0.0);
        assert_eq!(camera.yaw(), Deg(30.0));
        camera.orbit(-1000.0, 0.0);
        assert_eq!(camera.yaw(), Deg(-30.0));
    }

    #[test]
    fn test_invalid_bounds_are_sanitized() {
        let config = CameraConfig {
            bounds: OrbitCameraBounds {
                min_distance: Some(f32::NAN),
                max_distance: Some(f32::INFINITY),
                min_pitch: Deg(f32::NAN),
                max_pitch: Deg(-89.0),
                min_yaw: Some(Deg(f32::NAN)),
                max_yaw: None,
            },
            ..CameraConfig::default()
        };
        let mut camera = OrbitCamera::new(&config, 1.0);
        let bounds = camera.bounds();
        assert_eq!(bounds.min_distance, Some(0.1));
        assert_eq!(bounds.max_distance, Some(200.0));
        assert_eq!((bounds.min_pitch, bounds.max_pitch), (Deg(-89.0), Deg(-89.0)));
        assert_eq!(bounds.min_yaw, None);

        for _ in 0..1000 {
            camera.zoom(1.0);
        }
        assert_relative_eq!(camera.distance(), 0.1);
        camera.orbit(5.0, -50.0);
        assert_eq!(camera.pitch(), Deg(-89.0));
        assert!(camera.yaw().0.is_finite());
    }

    #[test]
    fn test_inverted_distance_bounds_are_swapped() {
        let bounds = OrbitCameraBounds {
            min_distance: Some(50.0),
            max_distance: Some(2.0),
            ..OrbitCameraBounds::default()
        }
        .sanitized();
        assert_eq!(bounds.min_distance, Some(2.0));
        assert_eq!(bounds.max_distance, Some(50.0));
        assert_eq!(OrbitCameraBounds::default().sanitized(), OrbitCameraBounds::default());
    }
}
