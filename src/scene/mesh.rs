use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::info;
use nalgebra as na;
use na::{vector, Vector2, Vector3};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};

use super::texture::Texture;
use crate::color;
use crate::error::RenderError;

/// One triangle of a mesh, indices are 0-based into the mesh attribute arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub positions: [usize; 3],
    pub normals: [usize; 3],
    pub uvs: [usize; 3],
    /// Flat color used when a material has no texture to sample.
    pub color: u32,
}

/// Triangle mesh with parallel attribute arrays and its albedo texture.
/// The texture sits behind an `Arc` so render workers can borrow it for a frame.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub tex_coords: Vec<Vector2<f32>>,
    pub faces: Vec<Face>,
    pub texture: Arc<Texture>,
}

impl Mesh {
    /// Loads a triangulated OBJ with `v/vt/vn` faces together with its texture.
    pub fn load(obj_path: &Path, texture_path: &Path) -> Result<Self, RenderError> {
        let file = File::open(obj_path).map_err(|source| RenderError::Io {
            path: obj_path.to_path_buf(),
            source,
        })?;
        let texture = Texture::load(texture_path)?;
        let mesh = Self::from_obj_reader(BufReader::new(file), obj_path, Arc::new(texture))?;
        info!(
            "Loaded model {}: {} vertices, {} normals, {} uvs, {} faces",
            obj_path.display(),
            mesh.vertices.len(),
            mesh.normals.len(),
            mesh.tex_coords.len(),
            mesh.faces.len()
        );
        return Ok(mesh);
    }

    /// Parses OBJ text. Y is mirrored and V flipped to match the screen mapping
    /// of the renderer, where y grows downwards on screen after the mirror.
    pub fn from_obj_reader<R: BufRead>(
        reader: R,
        origin: &Path,
        texture: Arc<Texture>,
    ) -> Result<Self, RenderError> {
        let raw: RawObj = parse_obj(reader).map_err(|source| RenderError::Obj {
            path: origin.to_path_buf(),
            source,
        })?;
        let invalid = |reason: String| RenderError::InvalidMesh {
            path: origin.to_path_buf(),
            reason,
        };

        let vertices: Vec<Vector3<f32>> = raw
            .positions
            .iter()
            .map(|&(x, y, z, _)| vector![x, -y, z])
            .collect();
        let normals: Vec<Vector3<f32>> = raw
            .normals
            .iter()
            .map(|&(x, y, z)| vector![x, -y, z])
            .collect();
        let tex_coords: Vec<Vector2<f32>> = raw
            .tex_coords
            .iter()
            .map(|&(u, v, _)| vector![u, 1.0 - v])
            .collect();

        let mut faces = Vec::with_capacity(raw.polygons.len());
        for (face_index, polygon) in raw.polygons.iter().enumerate() {
            let corners = match polygon {
                Polygon::PTN(corners) => corners,
                _ => {
                    return Err(invalid(format!(
                        "face {} lacks texture coordinates or normals",
                        face_index
                    )))
                }
            };
            if corners.len() != 3 {
                return Err(invalid(format!(
                    "face {} has {} corners, only triangles are supported",
                    face_index,
                    corners.len()
                )));
            }
            let mut face = Face {
                positions: [0; 3],
                normals: [0; 3],
                uvs: [0; 3],
                color: color::WHITE,
            };
            for (i, &(p, t, n)) in corners.iter().enumerate() {
                if p >= vertices.len() || t >= tex_coords.len() || n >= normals.len() {
                    return Err(invalid(format!(
                        "face {} references missing attribute ({}/{}/{})",
                        face_index,
                        p + 1,
                        t + 1,
                        n + 1
                    )));
                }
                face.positions[i] = p;
                face.uvs[i] = t;
                face.normals[i] = n;
            }
            faces.push(face);
        }

        return Ok(Self { vertices, normals, tex_coords, faces, texture });
    }

    /// Axis aligned cube centred on the origin, 8 corners and 12 triangles.
    /// Faces are wound so that their outward side survives back-face culling.
    pub fn cube(half_extent: f32, texture: Arc<Texture>) -> Self {
        let corner = |sx: f32, sy: f32, sz: f32| -> usize {
            return (sx > 0.0) as usize | ((sy > 0.0) as usize) << 1 | ((sz > 0.0) as usize) << 2;
        };
        let mut vertices = Vec::with_capacity(8);
        for index in 0..8 {
            let sign = |bit: usize| -> f32 { if index & bit != 0 { 1.0 } else { -1.0 } };
            vertices.push(vector![sign(1), sign(2), sign(4)] * half_extent);
        }
        let tex_coords = vec![
            vector![0.0, 0.0],
            vector![1.0, 0.0],
            vector![1.0, 1.0],
            vector![0.0, 1.0],
        ];

        // Outward normal followed by two tangents whose cross product points inwards.
        let sides: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
            (Vector3::x(), Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::y(), Vector3::z()),
            (Vector3::y(), Vector3::x(), Vector3::z()),
            (-Vector3::y(), Vector3::z(), Vector3::x()),
            (Vector3::z(), Vector3::y(), Vector3::x()),
            (-Vector3::z(), Vector3::x(), Vector3::y()),
        ];

        let mut normals = Vec::with_capacity(6);
        let mut faces = Vec::with_capacity(12);
        for (side, &(n, u, v)) in sides.iter().enumerate() {
            normals.push(n);
            let quad: Vec<usize> = [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                .iter()
                .map(|&(su, sv)| {
                    let p = n + u * su + v * sv;
                    corner(p.x, p.y, p.z)
                })
                .collect();
            for (a, b, c) in [(0, 1, 2), (0, 2, 3)] {
                faces.push(Face {
                    positions: [quad[a], quad[b], quad[c]],
                    normals: [side; 3],
                    uvs: [a, b, c],
                    color: color::WHITE,
                });
            }
        }

        return Self { vertices, normals, tex_coords, faces, texture };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
v 0.0 1.0 0.0
v 1.0 0.0 0.0
v 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.25
vt 0.5 1.0
vn 0.0 1.0 0.0
f 1/1/1 2/2/1 3/3/1
";

    fn white() -> Arc<Texture> {
        return Arc::new(Texture::solid(color::WHITE));
    }

    #[test]
    fn parses_triangle_with_renderer_conventions() {
        let mesh = Mesh::from_obj_reader(TRIANGLE_OBJ.as_bytes(), Path::new("tri.obj"), white()).unwrap();
        assert_eq!(mesh.vertices[0], vector![0.0, -1.0, 0.0]);
        assert_eq!(mesh.tex_coords[1], vector![1.0, 0.75]);
        assert_eq!(mesh.normals[0], vector![0.0, -1.0, 0.0]);
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].positions, [0, 1, 2]);
        assert_eq!(mesh.faces[0].uvs, [0, 1, 2]);
        assert_eq!(mesh.faces[0].normals, [0, 0, 0]);
    }

    #[test]
    fn rejects_faces_without_normals() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let err = Mesh::from_obj_reader(text.as_bytes(), Path::new("bad.obj"), white()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh { .. }));
    }

    #[test]
    fn rejects_quads() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1 4/1/1\n";
        let err = Mesh::from_obj_reader(text.as_bytes(), Path::new("quad.obj"), white()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Mesh::load(Path::new("does/not/exist.obj"), Path::new("nope.png")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn cube_has_eight_corners_and_inward_winding() {
        let cube = Mesh::cube(1.0, white());
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 12);
        for face in &cube.faces {
            let [a, b, c] = face.positions.map(|i| cube.vertices[i]);
            let outward = cube.normals[face.normals[0]];
            assert!((b - a).cross(&(c - a)).dot(&outward) < 0.0);
            // Every corner of a side lies on that side's plane.
            for p in [a, b, c] {
                assert_eq!(p.dot(&outward), 1.0);
            }
        }
    }
}
