use tracing::debug;

use crate::error::Result;
use crate::math::Point2;
use crate::mesh::Mesh;
use crate::shape::snapshot::validate_attributes;

/// Reassigns material ids and UVs on the existing topology.
pub struct UpdateAspect<'a> {
    material_ids: &'a [u32],
    uvs: &'a [Vec<Point2>],
}

impl<'a> UpdateAspect<'a> {
    /// Creates a new `UpdateAspect` operation.
    #[must_use]
    pub fn new(material_ids: &'a [u32], uvs: &'a [Vec<Point2>]) -> Self {
        Self { material_ids, uvs }
    }

    /// Executes the update. Vertex positions and face loops are untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::TopologyError`] if the arrays disagree with
    /// the mesh faces. Nothing is assigned on error.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        mesh.ensure_lookup_tables();
        validate_attributes(&mesh.face_indices(), self.material_ids, self.uvs)?;

        for (index, (&material, uvs)) in self.material_ids.iter().zip(self.uvs).enumerate() {
            let id = mesh.face_at(index)?;
            let face = mesh.face_mut(id)?;
            face.material_index = material;
            for (corner, &uv) in face.loops.iter_mut().zip(uvs) {
                corner.uv = Some(uv);
            }
        }

        debug!(mesh = mesh.name(), faces = self.material_ids.len(), "updated aspect");
        Ok(())
    }
}
