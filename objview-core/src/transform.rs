/// Object placement: position, rotation, scale and the cached model matrix
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::geometry::Aabb;

/// Position, axis-angle rotation and per-axis scale for one object.
///
/// The composed model matrix is kept in step with the fields: every setter
/// recomputes it, and reads are just a borrow. Composition order is
/// translation, then rotation, then scale, so scale applies in object
/// space. The rotation angle is in degrees.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3<f32>,
    rotation_angle: f32,
    rotation_axis: Vector3<f32>,
    scale: Vector3<f32>,
    matrix: Matrix4<f32>,
}

impl Transform {
    pub fn new() -> Self {
        let mut transform = Self {
            position: Vector3::zeros(),
            rotation_angle: 0.0,
            rotation_axis: Vector3::y(),
            scale: Vector3::repeat(1.0),
            matrix: Matrix4::identity(),
        };
        transform.recompute();
        transform
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn rotation_axis(&self) -> Vector3<f32> {
        self.rotation_axis
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// The composed translation * rotation * scale matrix
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.recompute();
    }

    /// Set the rotation as an angle in degrees about an axis. A zero-length
    /// axis leaves the object unrotated.
    pub fn set_rotation(&mut self, angle_degrees: f32, axis: Vector3<f32>) {
        self.rotation_angle = angle_degrees;
        self.rotation_axis = axis;
        self.recompute();
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.recompute();
    }

    fn recompute(&mut self) {
        let translation = Matrix4::new_translation(&self.position);
        let rotation = match Unit::try_new(self.rotation_axis, 1.0e-6) {
            Some(axis) => {
                Rotation3::from_axis_angle(&axis, self.rotation_angle.to_radians()).to_homogeneous()
            }
            None => Matrix4::identity(),
        };
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        self.matrix = translation * rotation * scale;
    }

    /// Scale and translate a local bounding box into world space.
    ///
    /// Rotation deliberately does not participate: the box is refit around
    /// the scaled, translated center, which keeps it axis-aligned and
    /// cheap. For rotated objects the result is the bounds of the
    /// unrotated object, not a tight fit.
    pub fn world_aabb(&self, local: &Aabb) -> Aabb {
        let center = local.center().coords.component_mul(&self.scale) + self.position;
        let half = local.half_extents().component_mul(&self.scale);
        Aabb {
            min: Point3::from(center - half),
            max: Point3::from(center + half),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_default() {
        let transform = Transform::new();
        assert!((transform.matrix() - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_matrix_tracks_setters() {
        let mut transform = Transform::new();
        transform.set_position(Vector3::new(1.0, 2.0, 3.0));
        let point = transform.matrix().transform_point(&Point3::origin());
        assert!((point - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);

        transform.set_scale(Vector3::new(2.0, 2.0, 2.0));
        let point = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((point - Point3::new(3.0, 2.0, 3.0)).norm() < 1e-6);
    }

    #[test]
    fn test_scale_applies_before_rotation() {
        let mut transform = Transform::new();
        transform.set_scale(Vector3::new(2.0, 1.0, 1.0));
        transform.set_rotation(90.0, Vector3::y());
        // local +x is scaled to length 2, then rotated onto -z
        let point = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((point - Point3::new(0.0, 0.0, -2.0)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_about_arbitrary_axis() {
        let mut transform = Transform::new();
        transform.set_rotation(180.0, Vector3::new(1.0, 1.0, 0.0));
        let point = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((point - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_zero_axis_means_no_rotation() {
        let mut transform = Transform::new();
        transform.set_rotation(45.0, Vector3::zeros());
        assert!((transform.matrix() - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_world_aabb_scales_and_translates() {
        let mut transform = Transform::new();
        transform.set_position(Vector3::new(10.0, 0.0, 0.0));
        transform.set_scale(Vector3::new(2.0, 3.0, 1.0));
        let local = Aabb {
            min: Point3::new(-1.0, -1.0, -1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        let world = transform.world_aabb(&local);
        assert!((world.min - Point3::new(8.0, -3.0, -1.0)).norm() < 1e-6);
        assert!((world.max - Point3::new(12.0, 3.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_world_aabb_off_center_box() {
        let mut transform = Transform::new();
        transform.set_position(Vector3::new(0.0, 5.0, 0.0));
        transform.set_scale(Vector3::repeat(2.0));
        let local = Aabb {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(2.0, 2.0, 2.0),
        };
        let world = transform.world_aabb(&local);
        // center (1,1,1) scales to (2,2,2) and shifts up by 5
        assert!((world.min - Point3::new(0.0, 3.0, 0.0)).norm() < 1e-6);
        assert!((world.max - Point3::new(4.0, 7.0, 4.0)).norm() < 1e-6);
    }

    #[test]
    fn test_world_aabb_ignores_rotation() {
        let mut transform = Transform::new();
        transform.set_rotation(45.0, Vector3::y());
        let local = Aabb {
            min: Point3::new(-1.0, -1.0, -1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        let world = transform.world_aabb(&local);
        assert!((world.min - Point3::new(-1.0, -1.0, -1.0)).norm() < 1e-6);
        assert!((world.max - Point3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
    }
}
