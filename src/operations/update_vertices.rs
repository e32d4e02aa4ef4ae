use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::mesh::Mesh;
use crate::shape::snapshot::validate_vertices;

/// Moves existing vertices in place, keeping faces, material ids and UVs.
///
/// The `i`-th position goes to the vertex at index `i`. The vertex count
/// must match the mesh exactly.
pub struct UpdateVertices<'a> {
    vertices: &'a [Point3],
}

impl<'a> UpdateVertices<'a> {
    /// Creates a new `UpdateVertices` operation.
    #[must_use]
    pub fn new(vertices: &'a [Point3]) -> Self {
        Self { vertices }
    }

    /// Executes the patch.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::TopologyMismatch`] if the vertex count
    /// differs from the mesh; the mesh is unchanged and the caller should
    /// fall back to a full rebuild. Returns
    /// [`crate::error::GeometryError::NonFiniteVertex`] for a NaN or
    /// infinite coordinate.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        validate_vertices(self.vertices)?;
        mesh.ensure_lookup_tables();
        if self.vertices.len() != mesh.vertex_count() {
            return Err(TopologyError::TopologyMismatch {
                expected: mesh.vertex_count(),
                actual: self.vertices.len(),
            }
            .into());
        }

        for (index, &point) in self.vertices.iter().enumerate() {
            let id = mesh.vertex_at(index)?;
            mesh.vertex_mut(id)?.point = point;
        }

        debug!(mesh = mesh.name(), vertices = self.vertices.len(), "patched vertices");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, ParaboxError};
    use crate::operations::Rebuild;
    use crate::params::ParameterSet;
    use crate::shape::{BoxShape, GeometrySnapshot, Shape};

    fn geometry(x: f64) -> GeometrySnapshot {
        BoxShape::new().compute_geometry(&ParameterSet::new(x, 0.8, 2.0).unwrap())
    }

    fn built(x: f64) -> Mesh {
        let mut mesh = Mesh::new("box");
        Rebuild::from_snapshot(&geometry(x)).execute(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn patch_moves_vertices_only() {
        let mut mesh = built(100.0);
        let target = geometry(50.0);
        UpdateVertices::new(&target.vertices).execute(&mut mesh).unwrap();

        assert_eq!(mesh.snapshot(), target);
        assert_eq!(mesh.positions()[6], Point3::new(50.0, 0.0, 2.0));
    }

    #[test]
    fn patch_after_rebuild_with_same_positions_is_a_no_op() {
        let snap = geometry(100.0);
        let mut mesh = built(100.0);
        UpdateVertices::new(&snap.vertices).execute(&mut mesh).unwrap();
        assert_eq!(mesh.snapshot(), snap);
    }

    #[test]
    fn patch_is_idempotent() {
        let target = geometry(12.5);
        let mut once = built(100.0);
        UpdateVertices::new(&target.vertices).execute(&mut once).unwrap();
        let mut twice = built(100.0);
        UpdateVertices::new(&target.vertices).execute(&mut twice).unwrap();
        UpdateVertices::new(&target.vertices).execute(&mut twice).unwrap();
        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn wrong_count_is_a_topology_mismatch() {
        let mut mesh = built(100.0);
        let before = mesh.snapshot();
        let target = geometry(50.0);
        let err = UpdateVertices::new(&target.vertices[..7])
            .execute(&mut mesh)
            .unwrap_err();

        assert!(matches!(
            err,
            ParaboxError::Topology(TopologyError::TopologyMismatch {
                expected: 8,
                actual: 7
            })
        ));
        assert!(err.is_recoverable());
        assert_eq!(mesh.snapshot(), before);
    }

    #[test]
    fn nan_position_is_rejected_before_patching() {
        let mut mesh = built(100.0);
        let before = mesh.snapshot();
        let mut target = geometry(50.0);
        target.vertices[3].z = f64::NAN;

        let err = UpdateVertices::new(&target.vertices)
            .execute(&mut mesh)
            .unwrap_err();
        assert!(matches!(
            err,
            ParaboxError::Geometry(GeometryError::NonFiniteVertex { index: 3 })
        ));
        assert!(!err.is_recoverable());
        assert_eq!(mesh.snapshot(), before);
    }
}
