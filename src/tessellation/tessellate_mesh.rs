use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::{plane_basis, polygon_normal};
use crate::math::{Point2, Point3, Vector3};
use crate::mesh::Mesh;

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates every polygon face of a mesh.
///
/// Faces are flat shaded: each corner becomes its own output vertex that
/// carries the face normal and the corner UV. Triangles keep the winding of
/// the face they came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct TessellateMesh;

impl TessellateMesh {
    /// Creates a new `TessellateMesh` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the tessellation.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] if a face has zero area or its
    /// boundary crosses itself.
    pub fn execute(&self, mesh: &Mesh) -> Result<TriangleMesh> {
        let positions = mesh.positions();
        let uv_loops = mesh.uv_loops();

        let mut combined = TriangleMesh::default();
        for (face, (indices, uvs)) in mesh.face_indices().iter().zip(&uv_loops).enumerate() {
            let points: Vec<Point3> = indices.iter().map(|&i| positions[i]).collect();
            combined.merge(&tessellate_polygon(face, &points, uvs)?);
        }
        Ok(combined)
    }
}

fn failed(face: usize, reason: impl std::fmt::Display) -> TessellationError {
    TessellationError::Failed(format!("face {face}: {reason}"))
}

/// Tessellates one planar polygon with per-corner UVs.
#[allow(clippy::cast_possible_truncation)]
fn tessellate_polygon(face: usize, points: &[Point3], uvs: &[Point2]) -> Result<TriangleMesh> {
    let normal = polygon_normal(points).ok_or_else(|| failed(face, "zero area"))?;

    let mut mesh = TriangleMesh {
        vertices: points.to_vec(),
        normals: vec![normal; points.len()],
        uvs: (0..points.len())
            .map(|j| uvs.get(j).copied().unwrap_or_else(Point2::origin))
            .collect(),
        indices: Vec::new(),
    };

    if points.len() == 3 {
        mesh.indices.push([0, 1, 2]);
        return Ok(mesh);
    }

    let (u_dir, v_dir) = plane_basis(&normal);
    let origin = points[0];
    let outline: Vec<SpadePoint2<f64>> = points
        .iter()
        .map(|p| {
            let d: Vector3 = p - origin;
            SpadePoint2::new(d.dot(&u_dir), d.dot(&v_dir))
        })
        .collect();

    let mut cdt = Cdt::new();
    let mut corner_of: HashMap<usize, u32> = HashMap::new();
    let mut handles = Vec::with_capacity(outline.len());
    for (j, &p) in outline.iter().enumerate() {
        let h = cdt.insert(p).map_err(|e| failed(face, e))?;
        corner_of.entry(h.index()).or_insert(j as u32);
        handles.push(h);
    }

    for (j, &from) in handles.iter().enumerate() {
        let to = handles[(j + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(failed(face, "boundary crosses itself").into());
        }
        cdt.add_constraint(from, to);
    }

    // With the whole outline constrained, no triangle straddles the boundary,
    // so testing one interior point per triangle is exact.
    for triangle in cdt.inner_faces() {
        let corners = triangle.vertices();
        let [a, b, c] = corners.map(|v| v.position());
        let centroid = SpadePoint2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        if !encloses(&outline, centroid) {
            continue;
        }
        let mut tri = [0u32; 3];
        for (k, vh) in corners.iter().enumerate() {
            tri[k] = corner_of
                .get(&vh.fix().index())
                .copied()
                .ok_or_else(|| failed(face, "unknown triangulation vertex"))?;
        }
        mesh.indices.push(tri);
    }

    Ok(mesh)
}

/// Even-odd point-in-polygon test against a closed outline.
fn encloses(outline: &[SpadePoint2<f64>], p: SpadePoint2<f64>) -> bool {
    let mut inside = false;
    let mut prev = outline[outline.len() - 1];
    for &next in outline {
        if (next.y > p.y) != (prev.y > p.y) {
            let x = next.x + (p.y - next.y) * (prev.x - next.x) / (prev.y - next.y);
            if p.x < x {
                inside = !inside;
            }
        }
        prev = next;
    }
    inside
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ParaboxError;
    use crate::operations::Rebuild;
    use crate::params::ParameterSet;
    use crate::shape::{BoxShape, Shape};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn box_tessellates_to_12_triangles() {
        let snap = BoxShape::new().compute_geometry(&ParameterSet::new(2.0, 3.0, 4.0).unwrap());
        let mut mesh = Mesh::new("box");
        Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();

        let tris = TessellateMesh::new().execute(&mesh).unwrap();
        assert_eq!(tris.indices.len(), 12);
        assert_eq!(tris.vertices.len(), 24);
        assert_eq!(tris.normals.len(), 24);
        assert_eq!(tris.uvs.len(), 24);
        assert_relative_eq!(tris.area(), 2.0 * (2.0 * 3.0 + 2.0 * 4.0 + 3.0 * 4.0), epsilon = 1e-9);
    }

    #[test]
    fn triangles_keep_face_winding() {
        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mesh = tessellate_polygon(0, &square, &[]).unwrap();
        for t in &mesh.indices {
            let [a, b, c] = t.map(|i| mesh.vertices[i as usize]);
            assert!((b - a).cross(&(c - a)).z > 0.0);
        }
        assert!(mesh.uvs.iter().all(|uv| *uv == Point2::origin()));
    }

    #[test]
    fn concave_polygon_excludes_notch() {
        let l_shape = [
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        let mesh = tessellate_polygon(0, &l_shape, &[]).unwrap();
        assert_eq!(mesh.indices.len(), 4);
        assert_relative_eq!(mesh.area(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn uvs_follow_corners() {
        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let uvs = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh = tessellate_polygon(0, &square, &uvs).unwrap();
        for (v, uv) in mesh.vertices.iter().zip(&mesh.uvs) {
            assert_relative_eq!(v.x, uv.x);
            assert_relative_eq!(v.y, uv.y);
        }
    }

    #[test]
    fn degenerate_face_fails() {
        let vertices = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
        let uvs = vec![vec![Point2::origin(); 3]];
        let mut mesh = Mesh::new("flat");
        Rebuild::new(&vertices, &[vec![0, 1, 2]], &[0], &uvs)
            .execute(&mut mesh)
            .unwrap();

        let err = TessellateMesh::new().execute(&mesh).unwrap_err();
        assert!(matches!(err, ParaboxError::Tessellation(TessellationError::Failed(_))));
    }

    #[test]
    fn crossing_boundary_names_the_face() {
        let bowtie = [p(0.0, 0.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 1.0), p(0.5, 2.0)];
        let err = tessellate_polygon(4, &bowtie, &[]).unwrap_err();
        match err {
            ParaboxError::Tessellation(TessellationError::Failed(msg)) => {
                assert!(msg.starts_with("face 4:"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encloses_uses_even_odd_rule() {
        let outline = [
            SpadePoint2::new(0.0, 0.0),
            SpadePoint2::new(2.0, 0.0),
            SpadePoint2::new(2.0, 1.0),
            SpadePoint2::new(1.0, 1.0),
            SpadePoint2::new(1.0, 2.0),
            SpadePoint2::new(0.0, 2.0),
        ];
        assert!(encloses(&outline, SpadePoint2::new(0.5, 1.5)));
        assert!(encloses(&outline, SpadePoint2::new(1.5, 0.5)));
        assert!(!encloses(&outline, SpadePoint2::new(1.5, 1.5)));
        assert!(!encloses(&outline, SpadePoint2::new(-0.5, 0.5)));
    }
}
