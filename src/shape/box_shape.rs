use crate::math::{Point2, Point3};
use crate::params::ParameterSet;

use super::{GeometrySnapshot, Shape};

/// Face loops of the box.
///
/// Every loop winds the same way, so the shell is consistently oriented;
/// in a right-handed frame the Newell normals face the box interior.
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [7, 6, 5, 4],
    [7, 4, 0, 3],
    [4, 5, 1, 0],
    [5, 6, 2, 1],
    [6, 7, 3, 2],
];

/// UVs applied to every face corner, in loop order.
const FACE_UVS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// An axis-aligned box spanning `(0, 0, 0)` to `(x, y, z)`.
///
/// Topology is fixed at 8 vertices and 6 quads, so size changes never
/// require a full rebuild.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxShape;

impl BoxShape {
    /// Creates the box shape.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Shape for BoxShape {
    fn compute_geometry(&self, params: &ParameterSet) -> GeometrySnapshot {
        let (x, y, z) = (params.x(), params.y(), params.z());
        let vertices = vec![
            Point3::new(0.0, y, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(x, 0.0, 0.0),
            Point3::new(x, y, 0.0),
            Point3::new(0.0, y, z),
            Point3::new(0.0, 0.0, z),
            Point3::new(x, 0.0, z),
            Point3::new(x, y, z),
        ];
        let faces = FACES.iter().map(|f| f.to_vec()).collect();
        let uv_loops = FACES
            .iter()
            .map(|_| FACE_UVS.iter().map(|&[u, v]| Point2::new(u, v)).collect())
            .collect();

        GeometrySnapshot {
            vertices,
            faces,
            material_ids: vec![0; FACES.len()],
            uv_loops,
        }
    }
}
