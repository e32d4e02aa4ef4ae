use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{Point2, Point3};

/// Derived geometry arrays for one parameter set.
///
/// `faces[i]`, `material_ids[i]` and `uv_loops[i]` all describe face `i`;
/// `uv_loops[i][j]` belongs to the corner at `faces[i][j]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometrySnapshot {
    /// Vertex positions. Faces refer to them by index.
    pub vertices: Vec<Point3>,
    /// Vertex index loops, one per face.
    pub faces: Vec<Vec<usize>>,
    /// Material slot index per face.
    pub material_ids: Vec<u32>,
    /// UV coordinates per face corner.
    pub uv_loops: Vec<Vec<Point2>>,
}

impl GeometrySnapshot {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Checks that every vertex is finite, the per-face arrays agree with
    /// the faces and every face index refers to an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFiniteVertex`] or the first
    /// [`TopologyError`] found.
    pub fn validate(&self) -> Result<()> {
        validate_arrays(
            &self.vertices,
            &self.faces,
            &self.material_ids,
            &self.uv_loops,
        )
    }
}

/// Validates geometry arrays against each other before any mesh is touched.
pub(crate) fn validate_arrays(
    vertices: &[Point3],
    faces: &[Vec<usize>],
    material_ids: &[u32],
    uvs: &[Vec<Point2>],
) -> Result<()> {
    validate_vertices(vertices)?;
    validate_faces(vertices.len(), faces)?;
    validate_attributes(faces, material_ids, uvs)
}

pub(crate) fn validate_vertices(vertices: &[Point3]) -> Result<()> {
    match vertices.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
        Some(index) => Err(GeometryError::NonFiniteVertex { index }.into()),
        None => Ok(()),
    }
}

pub(crate) fn validate_faces(vertex_count: usize, faces: &[Vec<usize>]) -> Result<()> {
    for (face, loop_indices) in faces.iter().enumerate() {
        if loop_indices.len() < 3 {
            return Err(TopologyError::DegenerateFace {
                face,
                reason: "fewer than 3 corners",
            }
            .into());
        }
        for (j, &index) in loop_indices.iter().enumerate() {
            if index >= vertex_count {
                return Err(TopologyError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                }
                .into());
            }
            if loop_indices[..j].contains(&index) {
                return Err(TopologyError::DegenerateFace {
                    face,
                    reason: "repeated vertex",
                }
                .into());
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_attributes(
    faces: &[Vec<usize>],
    material_ids: &[u32],
    uvs: &[Vec<Point2>],
) -> Result<()> {
    if material_ids.len() != faces.len() {
        return Err(TopologyError::MaterialCount {
            faces: faces.len(),
            material_ids: material_ids.len(),
        }
        .into());
    }
    if uvs.len() != faces.len() {
        return Err(TopologyError::UvCount {
            faces: faces.len(),
            uvs: uvs.len(),
        }
        .into());
    }
    for (face, (loop_indices, loop_uvs)) in faces.iter().zip(uvs).enumerate() {
        if loop_uvs.len() != loop_indices.len() {
            return Err(TopologyError::UvLoop {
                face,
                corners: loop_indices.len(),
                uvs: loop_uvs.len(),
            }
            .into());
        }
    }
    Ok(())
}
