/// Camera state with view and projection matrix construction
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

const DEFAULT_FOV: f32 = 45.0;
const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 100.0;

/// Pitch never quite reaches straight up or down, keeping the view basis
/// well defined.
const MAX_PITCH_DEGREES: f32 = 89.0;

/// A look-at camera for perspective rendering.
///
/// Every mutation recomputes the affected matrices immediately, so the
/// matrices returned by [`Camera::view_matrix`] and
/// [`Camera::projection_matrix`] are always consistent with the camera
/// state. Angles at this interface are in degrees.
pub struct Camera {
    position: Point3<f32>,
    target: Point3<f32>,
    up: Vector3<f32>,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: DEFAULT_FOV,
            aspect: width as f32 / height as f32,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        };
        camera.update();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.recompute_view();
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
        self.recompute_view();
    }

    pub fn set_up(&mut self, up: Vector3<f32>) {
        self.up = up;
        self.recompute_view();
    }

    /// Replace the projection parameters. `fov` is the vertical field of
    /// view in degrees.
    pub fn set_projection(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        self.fov = fov;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.recompute_projection();
    }

    /// Recompute both matrices from the current state
    pub fn update(&mut self) {
        self.recompute_view();
        self.recompute_projection();
    }

    /// Dolly along the view direction, carrying the target so the
    /// orientation is unchanged
    pub fn move_forward(&mut self, distance: f32) {
        let direction = self.forward();
        self.position += direction * distance;
        self.target += direction * distance;
        self.recompute_view();
    }

    /// Strafe along the camera's right vector
    pub fn move_right(&mut self, distance: f32) {
        let mut right = self.forward().cross(&self.up);
        if right.norm() > 0.0 {
            right.normalize_mut();
        }
        self.position += right * distance;
        self.target += right * distance;
        self.recompute_view();
    }

    /// Translate along the camera's up vector
    pub fn move_up(&mut self, distance: f32) {
        self.position += self.up * distance;
        self.target += self.up * distance;
        self.recompute_view();
    }

    /// Turn left or right about the world vertical axis. Elevation above
    /// the horizon is preserved; looking straight up or down, the heading
    /// is undefined and the rotation is a no-op.
    pub fn rotate_yaw(&mut self, angle_degrees: f32) {
        let forward = self.target - self.position;
        let horizontal = Vector3::new(forward.x, 0.0, forward.z);
        if horizontal.norm() == 0.0 {
            return;
        }
        let rotated =
            Rotation3::from_axis_angle(&Vector3::y_axis(), angle_degrees.to_radians()) * horizontal;
        self.target = self.position + Vector3::new(rotated.x, forward.y, rotated.z);
        self.recompute_view();
    }

    /// Tilt up or down, clamped so the view never pitches past
    /// [`MAX_PITCH_DEGREES`] above or below the horizon
    pub fn rotate_pitch(&mut self, angle_degrees: f32) {
        let forward = self.target - self.position;
        let length = forward.norm();
        if length == 0.0 {
            return;
        }
        let max_pitch = MAX_PITCH_DEGREES.to_radians();
        let pitch = (forward.y / length).clamp(-1.0, 1.0).asin();
        let new_pitch = (pitch + angle_degrees.to_radians()).clamp(-max_pitch, max_pitch);

        let mut horizontal = Vector3::new(forward.x, 0.0, forward.z);
        if horizontal.norm() > 0.0 {
            horizontal.normalize_mut();
        } else {
            // already at a pole: pick an arbitrary heading to tilt from
            horizontal = Vector3::x();
        }
        let direction = Vector3::new(
            horizontal.x * new_pitch.cos(),
            new_pitch.sin(),
            horizontal.z * new_pitch.cos(),
        );
        self.target = self.position + direction * length;
        self.recompute_view();
    }

    fn forward(&self) -> Vector3<f32> {
        let forward = self.target - self.position;
        if forward.norm() > 0.0 {
            forward.normalize()
        } else {
            forward
        }
    }

    fn recompute_view(&mut self) {
        let mut forward = self.target - self.position;
        if forward.norm() > 0.0 {
            forward.normalize_mut();
        }
        let mut right = forward.cross(&self.up);
        if right.norm() > 0.0 {
            right.normalize_mut();
        }
        // re-derive up so the basis stays orthogonal
        let up = right.cross(&forward);

        let eye = self.position.coords;
        self.view = Matrix4::new(
            right.x, right.y, right.z, -right.dot(&eye),
            up.x, up.y, up.z, -up.dot(&eye),
            -forward.x, -forward.y, -forward.z, forward.dot(&eye),
            0.0, 0.0, 0.0, 1.0,
        );
    }

    fn recompute_projection(&mut self) {
        let tangent = (self.fov.to_radians() / 2.0).tan();
        let range = self.far - self.near;
        self.projection = Matrix4::new(
            1.0 / (self.aspect * tangent), 0.0, 0.0, 0.0,
            0.0, 1.0 / tangent, 0.0, 0.0,
            0.0, 0.0, -(self.far + self.near) / range, -2.0 * self.far * self.near / range,
            0.0, 0.0, -1.0, 0.0,
        );
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elevation_degrees(camera: &Camera) -> f32 {
        let forward = camera.target() - camera.position();
        (forward.y / forward.norm()).asin().to_degrees()
    }

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.target(), Point3::origin());
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_maps_target_onto_negative_z() {
        let camera = Camera::new(800, 600);
        let viewed = camera.view_matrix().transform_point(&Point3::origin());
        assert!(viewed.x.abs() < 1e-5);
        assert!(viewed.y.abs() < 1e-5);
        assert!((viewed.z + 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_translation_row() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // forward is (0, 0, -1), so the z-row carries +forward . eye = -5
        assert!((view[(2, 3)] + 5.0).abs() < 1e-6);
        assert!((view[(3, 3)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_projection_square_at_90_degrees() {
        let mut camera = Camera::new(100, 100);
        camera.set_projection(90.0, 1.0, 0.1, 100.0);
        let projection = camera.projection_matrix();
        assert!((projection[(0, 0)] - 1.0).abs() < 1e-5);
        assert!((projection[(1, 1)] - 1.0).abs() < 1e-5);
        assert!((projection[(3, 2)] + 1.0).abs() < 1e-6);
        assert!((projection[(3, 3)]).abs() < 1e-6);
    }

    #[test]
    fn test_projection_depth_terms() {
        let mut camera = Camera::new(100, 100);
        camera.set_projection(45.0, 1.0, 0.1, 100.0);
        let projection = camera.projection_matrix();
        let range = 100.0 - 0.1;
        assert!((projection[(2, 2)] + 100.1 / range).abs() < 1e-5);
        assert!((projection[(2, 3)] + 2.0 * 100.0 * 0.1 / range).abs() < 1e-5);
    }

    #[test]
    fn test_mutation_recomputes_immediately() {
        let mut camera = Camera::new(800, 600);
        let before = *camera.view_matrix();
        camera.set_position(Point3::new(3.0, 1.0, 5.0));
        assert_ne!(before, *camera.view_matrix());
    }

    #[test]
    fn test_move_round_trip() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::new(1.0, 2.0, 3.0));
        camera.set_target(Point3::new(4.0, 2.0, -1.0));
        let position = camera.position();
        let target = camera.target();

        camera.move_forward(3.7);
        camera.move_forward(-3.7);
        assert!((camera.position() - position).norm() < 1e-5);
        assert!((camera.target() - target).norm() < 1e-5);
    }

    #[test]
    fn test_move_carries_target() {
        let mut camera = Camera::new(800, 600);
        let offset_before = camera.target() - camera.position();
        camera.move_right(2.0);
        camera.move_up(-1.5);
        let offset_after = camera.target() - camera.position();
        assert!((offset_after - offset_before).norm() < 1e-5);
    }

    #[test]
    fn test_yaw_preserves_elevation_and_distance() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::origin());
        camera.set_target(Point3::new(1.0, 2.0, -3.0));
        let forward_before = camera.target() - camera.position();

        camera.rotate_yaw(30.0);
        let forward_after = camera.target() - camera.position();
        assert!((forward_after.y - forward_before.y).abs() < 1e-5);
        assert!((forward_after.norm() - forward_before.norm()).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_full_turn_returns() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::origin());
        camera.set_target(Point3::new(0.0, 1.0, -4.0));
        let target = camera.target();
        for _ in 0..8 {
            camera.rotate_yaw(45.0);
        }
        assert!((camera.target() - target).norm() < 1e-3);
    }

    #[test]
    fn test_yaw_is_noop_at_pole() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::origin());
        camera.set_target(Point3::new(0.0, 5.0, 0.0));
        camera.rotate_yaw(45.0);
        assert_eq!(camera.target(), Point3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_pitch_clamps_at_limit() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::origin());
        camera.set_target(Point3::new(0.0, 0.0, -1.0));
        for _ in 0..20 {
            camera.rotate_pitch(10.0);
        }
        let elevation = elevation_degrees(&camera);
        assert!(elevation <= 89.0 + 1e-3);
        assert!((elevation - 89.0).abs() < 1e-2);

        for _ in 0..40 {
            camera.rotate_pitch(-10.0);
        }
        assert!((elevation_degrees(&camera) + 89.0).abs() < 1e-2);
    }

    #[test]
    fn test_pitch_preserves_distance() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Point3::new(1.0, 1.0, 1.0));
        camera.set_target(Point3::new(4.0, 1.0, -3.0));
        let length = (camera.target() - camera.position()).norm();
        camera.rotate_pitch(25.0);
        assert!(((camera.target() - camera.position()).norm() - length).abs() < 1e-4);
        assert!((elevation_degrees(&camera) - 25.0).abs() < 1e-3);
    }
}
