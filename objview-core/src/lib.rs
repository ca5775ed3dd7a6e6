/// objview core library - mesh loading, camera math and scene state
///
/// This library provides the renderer-agnostic functionality of the
/// viewer: OBJ parsing into indexed meshes, view and projection matrix
/// construction, object transforms and scene composition.

pub mod camera;
pub mod geometry;
pub mod obj;
pub mod scene;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use geometry::{Aabb, Mesh, MeshBuilder, Vertex, MERGE_EPSILON};
pub use obj::{load_obj, ObjModel, ParseError};
pub use scene::{Scene, SceneObject};
pub use texture::{Texture, TextureError};
pub use transform::Transform;
