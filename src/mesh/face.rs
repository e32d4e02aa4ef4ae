use crate::math::Point2;

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in a mesh.
    pub struct FaceId;
}

/// One corner of a face.
#[derive(Debug, Clone, Copy)]
pub struct LoopData {
    /// The vertex at this corner.
    pub vertex: VertexId,
    /// UV coordinate of this corner, if the mesh has a UV layer.
    pub uv: Option<Point2>,
}

/// Data associated with a mesh face.
///
/// Corners are stored in winding order.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Face corners.
    pub loops: Vec<LoopData>,
    /// Index into the mesh material slot list.
    pub material_index: u32,
}

impl FaceData {
    /// Creates a face over the given vertices with no UVs and material 0.
    #[must_use]
    pub fn new(vertices: &[VertexId]) -> Self {
        Self {
            loops: vertices
                .iter()
                .map(|&vertex| LoopData { vertex, uv: None })
                .collect(),
            material_index: 0,
        }
    }

    /// Iterates the corner vertices in winding order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.loops.iter().map(|l| l.vertex)
    }
}
