use tracing::debug;

use crate::error::Result;
use crate::math::{Point2, Point3};
use crate::mesh::{FaceData, LoopData, Mesh, VertexData, VertexId};
use crate::shape::snapshot::validate_arrays;
use crate::shape::GeometrySnapshot;

use super::weld::{drop_loose, weld_points};
use super::BuildOptions;

/// Counts reported by a completed rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Vertices in the rebuilt mesh.
    pub vertices: usize,
    /// Faces in the rebuilt mesh.
    pub faces: usize,
    /// Vertices merged away by welding.
    pub welded: usize,
    /// Faces dropped because welding collapsed them.
    pub collapsed_faces: usize,
    /// Loose vertices removed by cleaning.
    pub loose_removed: usize,
}

/// Replaces the full topology and attributes of a mesh.
///
/// All input arrays are validated before the mesh is touched. The new
/// contents are assembled in a scratch mesh and swapped in only once
/// complete, so a failed rebuild leaves the target exactly as it was.
pub struct Rebuild<'a> {
    vertices: &'a [Point3],
    faces: &'a [Vec<usize>],
    material_ids: &'a [u32],
    uvs: &'a [Vec<Point2>],
    options: BuildOptions,
}

impl<'a> Rebuild<'a> {
    /// Creates a new `Rebuild` operation with default options.
    #[must_use]
    pub fn new(
        vertices: &'a [Point3],
        faces: &'a [Vec<usize>],
        material_ids: &'a [u32],
        uvs: &'a [Vec<Point2>],
    ) -> Self {
        Self {
            vertices,
            faces,
            material_ids,
            uvs,
            options: BuildOptions::default(),
        }
    }

    /// Creates a `Rebuild` from a geometry snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &'a GeometrySnapshot) -> Self {
        Self::new(
            &snapshot.vertices,
            &snapshot.faces,
            &snapshot.material_ids,
            &snapshot.uv_loops,
        )
    }

    /// Sets the weld/clean options.
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::NonFiniteVertex`] for a NaN or
    /// infinite coordinate, or a [`crate::error::TopologyError`] if the
    /// material ids or UVs disagree with the faces, or a face references a
    /// missing vertex. The mesh is unchanged on error.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<BuildStats> {
        validate_arrays(self.vertices, self.faces, self.material_ids, self.uvs)?;

        let mut stats = BuildStats::default();
        let mut points = self.vertices.to_vec();
        let mut faces: Vec<Face> = self
            .faces
            .iter()
            .zip(self.material_ids)
            .zip(self.uvs)
            .map(|((indices, &material), uvs)| Face {
                corners: indices.iter().copied().zip(uvs.iter().copied()).collect(),
                material,
            })
            .collect();

        if self.options.weld {
            let (welded, remap) = weld_points(&points, self.options.weld_distance);
            stats.welded = points.len() - welded.len();
            points = welded;

            let before = faces.len();
            faces = faces
                .into_iter()
                .filter_map(|face| face.remapped(|i| remap[i]))
                .collect();
            stats.collapsed_faces = before - faces.len();
        }

        if self.options.clean {
            let indices: Vec<Vec<usize>> = faces.iter().map(Face::indices).collect();
            let (kept, remap) = drop_loose(&points, &indices);
            stats.loose_removed = points.len() - kept.len();
            points = kept;
            for face in &mut faces {
                for corner in &mut face.corners {
                    // Every face corner is used, so it always survives cleaning
                    corner.0 = remap[corner.0].unwrap_or(corner.0);
                }
            }
        }

        let mut built = mesh.empty_like();
        let ids: Vec<VertexId> = points
            .iter()
            .map(|&p| built.add_vertex(VertexData::new(p)))
            .collect();
        for face in &faces {
            built.add_face(FaceData {
                loops: face
                    .corners
                    .iter()
                    .map(|&(i, uv)| LoopData {
                        vertex: ids[i],
                        uv: Some(uv),
                    })
                    .collect(),
                material_index: face.material,
            })?;
        }

        stats.vertices = built.vertex_count();
        stats.faces = built.face_count();
        *mesh = built;

        debug!(
            mesh = mesh.name(),
            vertices = stats.vertices,
            faces = stats.faces,
            welded = stats.welded,
            collapsed_faces = stats.collapsed_faces,
            loose_removed = stats.loose_removed,
            "rebuilt mesh"
        );
        Ok(stats)
    }
}

/// A face being assembled: corners as `(vertex index, uv)`.
struct Face {
    corners: Vec<(usize, Point2)>,
    material: u32,
}

impl Face {
    fn indices(&self) -> Vec<usize> {
        self.corners.iter().map(|&(i, _)| i).collect()
    }

    /// Remaps corner indices and removes corners that collapsed onto their
    /// predecessor. Returns `None` if fewer than 3 distinct corners remain.
    fn remapped(self, map: impl Fn(usize) -> usize) -> Option<Self> {
        let mut corners: Vec<(usize, Point2)> = Vec::with_capacity(self.corners.len());
        for (i, uv) in self.corners {
            let i = map(i);
            if corners.last().is_some_and(|&(prev, _)| prev == i) {
                continue;
            }
            corners.push((i, uv));
        }
        while corners.len() > 1 && corners.first().map(|c| c.0) == corners.last().map(|c| c.0) {
            corners.pop();
        }

        let distinct = corners
            .iter()
            .enumerate()
            .all(|(j, &(i, _))| corners[..j].iter().all(|&(k, _)| k != i));
        (corners.len() >= 3 && distinct).then_some(Self {
            corners,
            material: self.material,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, ParaboxError, TopologyError};
    use crate::params::ParameterSet;
    use crate::shape::{BoxShape, Shape};

    fn box_snapshot() -> GeometrySnapshot {
        BoxShape::new().compute_geometry(&ParameterSet::new(2.0, 3.0, 4.0).unwrap())
    }

    #[test]
    fn rebuild_reproduces_snapshot() {
        let snap = box_snapshot();
        let mut mesh = Mesh::new("box");
        let stats = Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();

        assert_eq!(stats.vertices, 8);
        assert_eq!(stats.faces, 6);
        assert_eq!(mesh.snapshot(), snap);
        assert_eq!(mesh.edges().len(), 12);
        assert!(mesh.lookup_tables_valid());
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let snap = box_snapshot();
        let mut mesh = Mesh::new("box");
        mesh.add_material("paint");
        for _ in 0..3 {
            mesh.add_vertex(VertexData::new(Point3::origin()));
        }
        Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.name(), "box");
        assert_eq!(mesh.materials(), ["paint".to_string()]);
    }

    #[test]
    fn short_material_ids_fail_without_mutation() {
        let snap = box_snapshot();
        let mut mesh = Mesh::new("box");
        Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();
        let before = mesh.snapshot();

        let bigger = BoxShape::new().compute_geometry(&ParameterSet::new(9.0, 9.0, 9.0).unwrap());
        let err = Rebuild::new(
            &bigger.vertices,
            &bigger.faces,
            &bigger.material_ids[..5],
            &bigger.uv_loops,
        )
        .execute(&mut mesh)
        .unwrap_err();

        assert!(matches!(
            err,
            ParaboxError::Topology(TopologyError::MaterialCount {
                faces: 6,
                material_ids: 5
            })
        ));
        assert_eq!(mesh.snapshot(), before);
    }

    #[test]
    fn bad_index_fails_without_mutation() {
        let mut snap = box_snapshot();
        let mut mesh = Mesh::new("box");
        Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();
        let before = mesh.snapshot();

        snap.faces[3][1] = 8;
        let err = Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap_err();
        assert!(matches!(
            err,
            ParaboxError::Topology(TopologyError::IndexOutOfRange { face: 3, index: 8, .. })
        ));
        assert_eq!(mesh.snapshot(), before);
    }

    #[test]
    fn weld_merges_duplicated_corners() {
        // Two quads sharing an edge, each with its own copy of the shared vertices
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0004, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0002, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let uvs = vec![vec![Point2::origin(); 4]; 2];
        let mut mesh = Mesh::new("strip");
        let stats = Rebuild::new(&vertices, &faces, &[0, 1], &uvs)
            .with_options(BuildOptions {
                weld: true,
                ..BuildOptions::default()
            })
            .execute(&mut mesh)
            .unwrap();

        assert_eq!(stats.welded, 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_indices(), vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]]);
        assert_eq!(mesh.material_ids(), vec![0, 1]);
    }

    #[test]
    fn weld_drops_collapsed_faces_with_their_attributes() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(5.0, 5.0, 5.0005),
            Point3::new(5.0005, 5.0, 5.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let uvs = vec![vec![Point2::origin(); 3]; 2];
        let mut mesh = Mesh::new("sliver");
        let stats = Rebuild::new(&vertices, &faces, &[2, 7], &uvs)
            .with_options(BuildOptions {
                weld: true,
                clean: true,
                ..BuildOptions::default()
            })
            .execute(&mut mesh)
            .unwrap();

        assert_eq!(stats.collapsed_faces, 1);
        assert_eq!(stats.loose_removed, 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.material_ids(), vec![2]);
    }

    #[test]
    fn clean_strips_unused_vertices() {
        let vertices = vec![
            Point3::new(7.0, 7.0, 7.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![1, 2, 3]];
        let uvs = vec![vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)]];
        let mut mesh = Mesh::new("tri");
        let stats = Rebuild::new(&vertices, &faces, &[0], &uvs)
            .with_options(BuildOptions {
                clean: true,
                ..BuildOptions::default()
            })
            .execute(&mut mesh)
            .unwrap();

        assert_eq!(stats.loose_removed, 1);
        assert_eq!(mesh.face_indices(), vec![vec![0, 1, 2]]);
        assert_eq!(mesh.uv_loops(), uvs);
    }

    #[test]
    fn without_clean_loose_vertices_stay() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(3.0, 3.0, 3.0),
        ];
        let uvs = vec![vec![Point2::origin(); 3]];
        let mut mesh = Mesh::new("tri");
        Rebuild::new(&vertices, &[vec![0, 1, 2]], &[0], &uvs)
            .execute(&mut mesh)
            .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn weld_handles_huge_coordinates() {
        let vertices = vec![
            Point3::new(1e16, 0.0, 0.0),
            Point3::new(2e16, 0.0, 0.0),
            Point3::new(1e16, 1e16, 0.0),
            Point3::new(-1e300, 0.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let uvs = vec![vec![Point2::origin(); 3]; 2];
        let mut mesh = Mesh::new("far");
        let stats = Rebuild::new(&vertices, &faces, &[0, 0], &uvs)
            .with_options(BuildOptions {
                weld: true,
                ..BuildOptions::default()
            })
            .execute(&mut mesh)
            .unwrap();

        assert_eq!(stats.welded, 0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn non_finite_vertex_fails_without_mutation() {
        let mut snap = box_snapshot();
        let mut mesh = Mesh::new("box");
        Rebuild::from_snapshot(&snap).execute(&mut mesh).unwrap();
        let before = mesh.snapshot();

        snap.vertices[5].x = f64::INFINITY;
        let err = Rebuild::from_snapshot(&snap)
            .with_options(BuildOptions {
                weld: true,
                ..BuildOptions::default()
            })
            .execute(&mut mesh)
            .unwrap_err();
        assert!(matches!(
            err,
            ParaboxError::Geometry(GeometryError::NonFiniteVertex { index: 5 })
        ));
        assert_eq!(mesh.snapshot(), before);
    }
}
