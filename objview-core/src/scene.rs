/// Scene composition and automatic camera framing
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::camera::Camera;
use crate::geometry::{Aabb, Mesh};
use crate::obj::{self, ParseError};
use crate::texture::Texture;
use crate::transform::Transform;

/// One placed model: mesh, optional texture and its transform
#[derive(Debug)]
pub struct SceneObject {
    mesh: Mesh,
    texture: Option<Texture>,
    transform: Transform,
}

impl SceneObject {
    fn new(mesh: Mesh, texture: Option<Texture>) -> Self {
        Self {
            mesh,
            texture,
            transform: Transform::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// World-space bounds of this object
    pub fn world_aabb(&self) -> Aabb {
        self.transform.world_aabb(&self.mesh.bounding_box())
    }
}

/// A collection of placed objects and the camera that views them.
///
/// Adding an object re-frames the camera so everything stays in view; the
/// camera can afterwards be moved freely through [`Scene::camera_mut`].
pub struct Scene {
    objects: Vec<SceneObject>,
    camera: Camera,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        let mut scene = Self {
            objects: Vec::new(),
            camera: Camera::new(width, height),
        };
        scene.frame_camera();
        scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Load an OBJ file and place it so that the center of its bounding
    /// box lands at `position`.
    pub fn add_object(
        &mut self,
        path: impl AsRef<Path>,
        position: Point3<f32>,
        scale: Vector3<f32>,
    ) -> Result<(), ParseError> {
        let model = obj::load_obj(path)?;
        self.add_mesh(model.mesh, model.texture, position, scale);
        Ok(())
    }

    /// Place an already built mesh, centering its bounding box at
    /// `position`
    pub fn add_mesh(
        &mut self,
        mesh: Mesh,
        texture: Option<Texture>,
        position: Point3<f32>,
        scale: Vector3<f32>,
    ) {
        let mut object = SceneObject::new(mesh, texture);
        object.transform.set_scale(scale);
        // the local center scales with the object, so subtract it scaled
        let center = object.mesh.bounding_box().center();
        object
            .transform
            .set_position(position.coords - center.coords.component_mul(&scale));
        self.objects.push(object);
        self.frame_camera();
    }

    /// Place the camera on a fixed diagonal at a distance derived from the
    /// combined bounds of the scene, looking at their center.
    fn frame_camera(&mut self) {
        if self.objects.is_empty() {
            self.camera.set_position(Point3::new(0.0, 2.0, 5.0));
            self.camera.set_target(Point3::origin());
            return;
        }

        let bounds = Aabb::union(self.objects.iter().map(SceneObject::world_aabb));
        let center = bounds.center();
        let size = bounds.size();
        let max_size = size.x.max(size.y).max(size.z);
        let distance = (max_size * 0.8).max(3.0);

        self.camera
            .set_position(center + distance * Vector3::new(0.4, 0.5, 0.7));
        self.camera.set_target(center);
        self.camera.update();
        tracing::debug!(
            center = ?center,
            max_size,
            distance,
            "framed camera on scene bounds"
        );
    }
}
