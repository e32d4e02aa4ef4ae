pub mod face;
pub mod vertex;

pub use face::{FaceData, FaceId, LoopData};
pub use vertex::{VertexData, VertexId};

use std::collections::{BTreeSet, HashMap};

use slotmap::SlotMap;

use crate::error::{Result, TopologyError};
use crate::math::{Point2, Point3};
use crate::shape::GeometrySnapshot;

/// A polygon mesh data-block.
///
/// Vertices and faces live in generational arenas. Two ordered lookup tables
/// map positional indices to IDs, so that "vertex at index k" stays stable
/// across insertions. Removals leave the tables stale until
/// [`Mesh::ensure_lookup_tables`] is called; positional queries on a stale
/// mesh fail instead of returning the wrong entity.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    name: String,
    materials: Vec<String>,
    vertices: SlotMap<VertexId, VertexData>,
    faces: SlotMap<FaceId, FaceData>,
    vertex_order: Vec<VertexId>,
    face_order: Vec<FaceId>,
    stale: bool,
}

impl Mesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty mesh that shares this mesh's name and material slots.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            materials: self.materials.clone(),
            ..Self::default()
        }
    }

    /// Mesh name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the mesh.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Material slot names, indexed by face material index.
    #[must_use]
    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Appends a material slot and returns its index.
    pub fn add_material(&mut self, name: impl Into<String>) -> u32 {
        self.materials.push(name.into());
        u32::try_from(self.materials.len() - 1).unwrap_or(u32::MAX)
    }

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

    /// Returns `true` if the mesh has no vertices and no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Removes all vertices and faces. Name and material slots are kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.vertex_order.clear();
        self.face_order.clear();
        self.stale = false;
    }

    // --- Vertex operations ---

    /// Inserts a vertex at the end of the vertex order and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        let id = self.vertices.insert(data);
        self.vertex_order.push(id);
        id
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()).into())
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()).into())
    }

    /// Removes a vertex together with every face that uses it.
    ///
    /// Leaves the lookup tables stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found in the mesh.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<VertexData> {
        let data = self
            .vertices
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?;
        self.faces.retain(|_, face| face.vertices().all(|v| v != id));
        self.stale = true;
        Ok(data)
    }

    // --- Face operations ---

    /// Inserts a face at the end of the face order and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a corner references a vertex not in the mesh.
    pub fn add_face(&mut self, data: FaceData) -> Result<FaceId> {
        if data.vertices().any(|v| !self.vertices.contains_key(v)) {
            return Err(TopologyError::EntityNotFound("face vertex".into()).into());
        }
        let id = self.faces.insert(data);
        self.face_order.push(id);
        Ok(id)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn face(&self, id: FaceId) -> Result<&FaceData> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()).into())
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()).into())
    }

    /// Removes a face. Its vertices stay. Leaves the lookup tables stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found in the mesh.
    pub fn remove_face(&mut self, id: FaceId) -> Result<FaceData> {
        let data = self
            .faces
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;
        self.stale = true;
        Ok(data)
    }

    // --- Lookup tables ---

    /// Drops removed entities from the ordered lookup tables.
    pub fn ensure_lookup_tables(&mut self) {
        if !self.stale {
            return;
        }
        let vertices = &self.vertices;
        let faces = &self.faces;
        self.vertex_order.retain(|&id| vertices.contains_key(id));
        self.face_order.retain(|&id| faces.contains_key(id));
        self.stale = false;
    }

    /// Returns `true` if the lookup tables match the arenas.
    #[must_use]
    pub fn lookup_tables_valid(&self) -> bool {
        !self.stale
    }

    fn check_lookup(&self) -> Result<()> {
        if self.stale {
            Err(TopologyError::EntityNotFound("lookup table is stale".into()).into())
        } else {
            Ok(())
        }
    }

    /// Returns the ID of the vertex at position `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup tables are stale or `index` is out of range.
    pub fn vertex_at(&self, index: usize) -> Result<VertexId> {
        self.check_lookup()?;
        self.vertex_order
            .get(index)
            .copied()
            .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {index}")).into())
    }

    /// Returns the ID of the face at position `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup tables are stale or `index` is out of range.
    pub fn face_at(&self, index: usize) -> Result<FaceId> {
        self.check_lookup()?;
        self.face_order
            .get(index)
            .copied()
            .ok_or_else(|| TopologyError::EntityNotFound(format!("face {index}")).into())
    }

    /// Iterates vertex IDs in positional order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_order
            .iter()
            .copied()
            .filter(|&id| self.vertices.contains_key(id))
    }

    /// Iterates face IDs in positional order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_order
            .iter()
            .copied()
            .filter(|&id| self.faces.contains_key(id))
    }

    // --- Array views ---

    /// Vertex positions in positional order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.vertex_ids()
            .map(|id| self.vertices[id].point)
            .collect()
    }

    /// Face loops as positional vertex indices.
    #[must_use]
    pub fn face_indices(&self) -> Vec<Vec<usize>> {
        let index_of: HashMap<VertexId, usize> = self
            .vertex_ids()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        self.face_ids()
            .map(|id| {
                self.faces[id]
                    .vertices()
                    .filter_map(|v| index_of.get(&v).copied())
                    .collect()
            })
            .collect()
    }

    /// Material index per face.
    #[must_use]
    pub fn material_ids(&self) -> Vec<u32> {
        self.face_ids()
            .map(|id| self.faces[id].material_index)
            .collect()
    }

    /// UVs per face corner. Corners without a UV read as `(0, 0)`.
    #[must_use]
    pub fn uv_loops(&self) -> Vec<Vec<Point2>> {
        self.face_ids()
            .map(|id| {
                self.faces[id]
                    .loops
                    .iter()
                    .map(|l| l.uv.unwrap_or_else(Point2::origin))
                    .collect()
            })
            .collect()
    }

    /// Unique undirected edges as sorted positional index pairs.
    #[must_use]
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = BTreeSet::new();
        for face in self.face_indices() {
            let n = face.len();
            for i in 0..n {
                let (a, b) = (face[i], face[(i + 1) % n]);
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().collect()
    }

    /// Reads the mesh contents back as a geometry snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GeometrySnapshot {
        GeometrySnapshot {
            vertices: self.positions(),
            faces: self.face_indices(),
            material_ids: self.material_ids(),
            uv_loops: self.uv_loops(),
        }
    }
}
