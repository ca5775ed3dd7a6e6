/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3};
use objview_core::{Camera, Scene, SceneObject, Texture, Vertex};
use std::io::{self, Write};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Base light level so unlit faces stay visible
const AMBIENT: f32 = 0.3;

/// Grey level used for untextured surfaces
const FALLBACK_SHADE: f32 = 0.7;

/// ASCII renderer that rasterizes scene objects into terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn clear(&mut self) {
        for i in 0..self.depth_buffer.len() {
            self.depth_buffer[i] = f32::INFINITY;
            self.char_buffer[i] = ' ';
            self.color_buffer[i] = Color::Reset;
        }
    }

    pub fn render_scene(&mut self, scene: &Scene) {
        for object in scene.objects() {
            self.render_object(object, scene.camera());
        }
    }

    fn render_object(&mut self, object: &SceneObject, camera: &Camera) {
        let model = object.transform().matrix();
        let mvp = camera.projection_matrix() * camera.view_matrix() * model;
        let normals = normal_matrix(model);
        let mesh = object.mesh();

        for triangle in mesh.indices.chunks_exact(3) {
            let corners = [
                &mesh.vertices[triangle[0] as usize],
                &mesh.vertices[triangle[1] as usize],
                &mesh.vertices[triangle[2] as usize],
            ];
            self.render_triangle(&corners, &mvp, &normals, object.texture());
        }
    }

    fn render_triangle(
        &mut self,
        corners: &[&Vertex; 3],
        mvp: &Matrix4<f32>,
        normals: &Matrix3<f32>,
        texture: Option<&Texture>,
    ) {
        let mut screen = [(0.0f32, 0.0f32, 0.0f32); 3];
        for (slot, vertex) in screen.iter_mut().zip(corners) {
            match self.project(mvp, &vertex.position) {
                Some(coords) => *slot = coords,
                None => return, // triangle is clipped
            }
        }

        // light the face with its averaged vertex normals in world space
        let light = Vector3::new(1.0, 1.0, 1.0).normalize();
        let world_normal = normals * (corners[0].normal + corners[1].normal + corners[2].normal);
        let brightness = if world_normal.norm() > 0.0 {
            world_normal.normalize().dot(&light).max(0.0)
        } else {
            0.0
        };
        let shade = AMBIENT + (1.0 - AMBIENT) * brightness;

        let char_index = ((shade * (LUMINOSITY_RAMP.len() - 1) as f32) as usize)
            .min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        let tex_coords = [
            corners[0].tex_coord,
            corners[1].tex_coord,
            corners[2].tex_coord,
        ];
        self.rasterize(&screen, &tex_coords, shade, character, texture);
    }

    /// Project a model-space position to screen space; `None` when it
    /// falls outside the frustum
    fn project(&self, mvp: &Matrix4<f32>, position: &Point3<f32>) -> Option<(f32, f32, f32)> {
        let clip = mvp * position.to_homogeneous();
        if clip.w.abs() < 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 || ndc.z < -1.0 || ndc.z > 1.0
        {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * self.height as f32;
        Some((screen_x, screen_y, ndc.z))
    }

    fn rasterize(
        &mut self,
        screen: &[(f32, f32, f32); 3],
        tex_coords: &[Vector2<f32>; 3],
        shade: f32,
        character: char,
        texture: Option<&Texture>,
    ) {
        let (v0, v1, v2) = (screen[0], screen[1], screen[2]);

        // bounding box clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let index = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[index] {
                    continue;
                }
                self.depth_buffer[index] = depth;
                self.char_buffer[index] = character;
                self.color_buffer[index] = match texture {
                    Some(texture) => {
                        let uv = w0 * tex_coords[0] + w1 * tex_coords[1] + w2 * tex_coords[2];
                        let [r, g, b] = texture.sample(uv.x, uv.y);
                        Color::Rgb {
                            r: (r as f32 * shade) as u8,
                            g: (g as f32 * shade) as u8,
                            b: (b as f32 * shade) as u8,
                        }
                    }
                    None => {
                        let grey = (FALLBACK_SHADE * shade * 255.0) as u8;
                        Color::Rgb {
                            r: grey,
                            g: grey,
                            b: grey,
                        }
                    }
                };
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let index = y * self.width + x;
                let character = self.char_buffer[index];
                if character == ' ' {
                    writer.queue(Print(' '))?;
                } else {
                    writer.queue(SetForegroundColor(self.color_buffer[index]))?;
                    writer.queue(Print(character))?;
                }
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Inverse-transpose of the linear part of the model matrix, for carrying
/// normals to world space under non-uniform scale
fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use objview_core::{Mesh, Scene};

    #[test]
    fn test_barycentric_at_vertices() {
        let (w0, w1, w2) =
            barycentric((0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)).unwrap();
        assert!((w0 - 1.0).abs() < 1e-6);
        assert!(w1.abs() < 1e-6);
        assert!(w2.abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_at_centroid() {
        let (w0, w1, w2) =
            barycentric((0.0, 0.0), (9.0, 0.0), (0.0, 9.0), (3.0, 3.0)).unwrap();
        assert!((w0 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w1 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w2 - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_barycentric_degenerate_triangle() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_project_camera_target_hits_screen_center() {
        let renderer = AsciiRenderer::new(80, 24);
        let camera = Camera::new(80, 24);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        let (x, y, depth) = renderer.project(&mvp, &Point3::origin()).unwrap();
        assert!((x - 40.0).abs() < 1e-3);
        assert!((y - 12.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_clipped() {
        let renderer = AsciiRenderer::new(80, 24);
        let camera = Camera::new(80, 24);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        assert!(renderer.project(&mvp, &Point3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn test_render_scene_fills_cells() {
        let mut scene = Scene::new(80, 24);
        scene.add_mesh(
            Mesh::cube(2.0),
            None,
            Point3::origin(),
            nalgebra::Vector3::repeat(1.0),
        );
        let mut renderer = AsciiRenderer::new(80, 24);
        renderer.render_scene(&scene);
        let filled = renderer.char_buffer.iter().filter(|&&c| c != ' ').count();
        assert!(filled > 0);
    }
}
