/// Wavefront OBJ mesh loading with material texture resolution
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector2, Vector3};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, tuple},
    IResult,
};

use crate::geometry::{Mesh, MeshBuilder, Vertex};
use crate::texture::Texture;

/// Error loading an OBJ file
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read OBJ file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("OBJ file {} contains no geometry", .path.display())]
    Empty { path: PathBuf },
}

/// A loaded OBJ model: the indexed mesh plus the diffuse texture, when the
/// material library names one that can be decoded.
#[derive(Debug)]
pub struct ObjModel {
    pub mesh: Mesh,
    pub texture: Option<Texture>,
}

/// Load an OBJ file from disk.
///
/// Unrecognized and malformed lines are skipped, so partially broken files
/// still load. Only a file that yields no vertices at all is an error.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjModel, ParseError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (mesh, material_lib) = parse_obj(&source);
    if mesh.is_empty() {
        return Err(ParseError::Empty {
            path: path.to_path_buf(),
        });
    }
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        "loaded OBJ model"
    );

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let texture = material_lib
        .and_then(|name| load_material_texture(&directory.join(&name), directory));

    Ok(ObjModel { mesh, texture })
}

/// Parse OBJ source text into a mesh and the last referenced material
/// library name.
fn parse_obj(source: &str) -> (Mesh, Option<String>) {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut tex_coords: Vec<Vector2<f32>> = Vec::new();
    let mut normals: Vec<Vector3<f32>> = Vec::new();
    let mut faces: Vec<&str> = Vec::new();
    let mut material_lib: Option<String> = None;

    for raw_line in source.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let keyword = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("");
        match keyword {
            "v" => {
                if let Ok((_, position)) = vector3(rest) {
                    positions.push(Point3::from(position));
                }
            }
            "vt" => {
                if let Ok((_, tex_coord)) = vector2(rest) {
                    tex_coords.push(tex_coord);
                }
            }
            "vn" => {
                if let Ok((_, normal)) = vector3(rest) {
                    normals.push(normal);
                }
            }
            // face resolution is deferred so faces may reference vertex
            // data that appears later in the file
            "f" => faces.push(rest),
            "mtllib" => {
                if let Some(name) = rest.split_whitespace().next() {
                    material_lib = Some(name.to_string());
                }
            }
            _ => {}
        }
    }

    let mut builder = MeshBuilder::new();
    for face in faces {
        push_face(face, &positions, &tex_coords, &normals, &mut builder);
    }
    (builder.build(), material_lib)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(position) => &line[..position],
        None => line,
    }
}

fn vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn vector2(input: &str) -> IResult<&str, Vector2<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, u) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, v) = float(input)?;
    Ok((input, Vector2::new(u, v)))
}

/// One corner of a face: 1-based indices into the position, texture
/// coordinate and normal pools
#[derive(Debug, Clone, Copy)]
struct FaceRef {
    position: u32,
    tex_coord: Option<u32>,
    normal: Option<u32>,
}

fn index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse)(input)
}

fn face_ref(input: &str) -> IResult<&str, FaceRef> {
    alt((
        map(
            tuple((index, char('/'), index, char('/'), index)),
            |(position, _, tex_coord, _, normal)| FaceRef {
                position,
                tex_coord: Some(tex_coord),
                normal: Some(normal),
            },
        ),
        map(tuple((index, tag("//"), index)), |(position, _, normal)| {
            FaceRef {
                position,
                tex_coord: None,
                normal: Some(normal),
            }
        }),
        map(tuple((index, char('/'), index)), |(position, _, tex_coord)| {
            FaceRef {
                position,
                tex_coord: Some(tex_coord),
                normal: None,
            }
        }),
        map(index, |position| FaceRef {
            position,
            tex_coord: None,
            normal: None,
        }),
    ))(input)
}

fn face_refs(input: &str) -> IResult<&str, Vec<FaceRef>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, face_ref),
        multispace0,
    ))(input)
}

/// Triangulate one face line into the builder. Malformed lines and faces
/// with fewer than three corners contribute nothing.
fn push_face(
    face: &str,
    positions: &[Point3<f32>],
    tex_coords: &[Vector2<f32>],
    normals: &[Vector3<f32>],
    builder: &mut MeshBuilder,
) {
    let Ok((_, refs)) = face_refs(face) else {
        return;
    };
    if refs.len() < 3 {
        return;
    }
    let corners: Vec<Vertex> = refs
        .iter()
        .map(|reference| resolve_ref(reference, positions, tex_coords, normals))
        .collect();
    // polygons fan-triangulate around the first corner
    for i in 1..corners.len() - 1 {
        builder.push_triangle(corners[0], corners[i], corners[i + 1]);
    }
}

fn resolve_ref(
    reference: &FaceRef,
    positions: &[Point3<f32>],
    tex_coords: &[Vector2<f32>],
    normals: &[Vector3<f32>],
) -> Vertex {
    let position = lookup(positions, reference.position)
        .copied()
        .unwrap_or_else(Point3::origin);
    let tex_coord = reference
        .tex_coord
        .and_then(|index| lookup(tex_coords, index))
        .copied()
        .unwrap_or_else(Vector2::zeros);
    let normal = reference
        .normal
        .and_then(|index| lookup(normals, index))
        .copied()
        .unwrap_or_else(Vector3::y);
    Vertex {
        position,
        normal,
        tex_coord,
    }
}

// OBJ indices are 1-based; 0 and past-the-end references fall back to the
// defaults
fn lookup<T>(pool: &[T], index: u32) -> Option<&T> {
    index.checked_sub(1).and_then(|i| pool.get(i as usize))
}

/// Scan a material library for its first `map_Kd` entry and decode the
/// image it names. The texture is looked up next to the OBJ file first,
/// then at the path as written. The first `map_Kd` ends the search whether
/// or not its image loads.
fn load_material_texture(mtl_path: &Path, obj_dir: &Path) -> Option<Texture> {
    let source = match std::fs::read_to_string(mtl_path) {
        Ok(source) => source,
        Err(error) => {
            tracing::warn!(path = %mtl_path.display(), %error, "could not read material library");
            return None;
        }
    };

    for raw_line in source.lines() {
        let line = strip_comment(raw_line).trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        if parts.next() != Some("map_Kd") {
            continue;
        }
        let given = parts.next().map(str::trim).unwrap_or("");
        let file_name = given.rsplit(['/', '\\']).next().unwrap_or(given);
        for candidate in [obj_dir.join(file_name), PathBuf::from(given)] {
            match Texture::open(&candidate) {
                Ok(texture) => return Some(texture),
                Err(error) => tracing::debug!(%error, "texture candidate rejected"),
            }
        }
        tracing::warn!(path = %mtl_path.display(), texture = given, "material texture could not be loaded");
        return None;
    }
    None
}
