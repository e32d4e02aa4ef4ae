mod edit_session;
mod manipulate;
mod parametric;

pub use edit_session::EditSession;
pub use manipulate::ManipulationSession;
pub use parametric::{Manipulator, ParametricData};

use std::collections::BTreeSet;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::Point3;
use crate::mesh::Mesh;
use crate::operations::UpdateState;
use crate::params::{ParameterField, ParameterSet};
use crate::shape::Shape;

slotmap::new_key_type! {
    /// Unique identifier for an object in a scene.
    pub struct ObjectId;
}

/// Interaction mode of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Regular object mode.
    #[default]
    Object,
    /// Exclusive mesh editing.
    Edit,
}

/// A scene object owning one mesh.
#[derive(Debug)]
pub struct Object {
    /// Object name.
    pub name: String,
    /// The object mesh data-block.
    pub mesh: Mesh,
    /// Current interaction mode.
    pub mode: Mode,
    /// World-space location.
    pub location: Point3,
    /// Child objects.
    pub children: Vec<ObjectId>,
    /// Parametric data, present on parametric objects only.
    pub parametric: Option<ParametricData>,
}

impl Object {
    /// Creates a plain object at the origin.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            mode: Mode::Object,
            location: Point3::origin(),
            children: Vec::new(),
            parametric: None,
        }
    }
}

/// The host context: objects, the active object and the selection.
#[derive(Debug)]
pub struct Scene {
    objects: SlotMap<ObjectId, Object>,
    active: Option<ObjectId>,
    selected: BTreeSet<ObjectId>,
    cursor: Point3,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: SlotMap::with_key(),
            active: None,
            selected: BTreeSet::new(),
            cursor: Point3::origin(),
        }
    }
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Objects ---

    /// Links a plain object into the scene and returns its ID.
    pub fn add_object(&mut self, name: impl Into<String>, mesh: Mesh) -> ObjectId {
        self.objects.insert(Object::new(name, mesh))
    }

    /// Removes an object, detaching it from parents, selection and active slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not in the scene.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<Object> {
        let object = self
            .objects
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("object".into()))?;
        for other in self.objects.values_mut() {
            other.children.retain(|&c| c != id);
        }
        self.selected.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(object)
    }

    /// Returns a reference to an object, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not in the scene.
    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("object".into()).into())
    }

    /// Returns a mutable reference to an object, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not in the scene.
    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("object".into()).into())
    }

    /// Makes `child` a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either object is not in the scene, or
    /// [`OperationError::InvalidInput`] if `child` is `parent` itself or one
    /// of its ancestors.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<()> {
        self.object(child)?;
        self.object(parent)?;
        if self.descendants(child).any(|id| id == parent) {
            return Err(OperationError::InvalidInput(format!(
                "parenting {} under {} would create a cycle",
                self.objects[child].name, self.objects[parent].name
            ))
            .into());
        }
        self.object_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Walks `root` and everything below it in depth-first pre-order.
    ///
    /// Every object is visited at most once, so a hierarchy edited into a
    /// cycle through [`Object::children`] still terminates.
    fn descendants(&self, root: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        let mut visited = BTreeSet::new();
        let mut stack = vec![root];
        std::iter::from_fn(move || {
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                let Some(object) = self.objects.get(id) else {
                    continue;
                };
                stack.extend(object.children.iter().rev().copied());
                return Some(id);
            }
            None
        })
    }

    // --- Context ---

    /// The active object.
    #[must_use]
    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Sets the active object.
    pub fn set_active(&mut self, id: Option<ObjectId>) {
        self.active = id;
    }

    /// Adds an object to the selection.
    pub fn select(&mut self, id: ObjectId) {
        self.selected.insert(id);
    }

    /// Clears the selection.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Returns `true` if the object is selected.
    #[must_use]
    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    /// Iterates the selected objects.
    pub fn selected(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.selected.iter().copied()
    }

    /// The 3D cursor, where new objects are placed.
    #[must_use]
    pub fn cursor(&self) -> Point3 {
        self.cursor
    }

    /// Moves the 3D cursor.
    pub fn set_cursor(&mut self, cursor: Point3) {
        self.cursor = cursor;
    }

    /// Acquires exclusive edit access to an object's mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not in the scene.
    pub fn begin_edit(&mut self, target: ObjectId) -> Result<EditSession<'_>> {
        EditSession::begin(self, target)
    }

    // --- Parametric objects ---

    /// Finds the object holding parametric data, starting at `id`.
    ///
    /// Returns `id` itself if it is parametric, else the first parametric
    /// descendant in depth-first order.
    #[must_use]
    pub fn find_parametric(&self, id: ObjectId) -> Option<ObjectId> {
        self.descendants(id).find(|&found| self.objects[found].parametric.is_some())
    }

    /// Returns the parametric data reachable from `id`.
    #[must_use]
    pub fn parametric(&self, id: ObjectId) -> Option<&ParametricData> {
        let target = self.find_parametric(id)?;
        self.objects[target].parametric.as_ref()
    }

    /// Creates a parametric box at the cursor and builds its mesh.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::WrongMode`] if any object is in edit mode.
    pub fn create_parametric(
        &mut self,
        name: impl Into<String>,
        params: ParameterSet,
    ) -> Result<ObjectId> {
        self.create_parametric_with(name, ParametricData::new(params))
    }

    /// Creates a parametric object from prepared data and builds its mesh.
    ///
    /// The new object ends up active and solely selected, with size handles
    /// for every parameter field. If the initial build fails the object is
    /// removed again and the previous selection and active object return.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::WrongMode`] if any object is in edit mode,
    /// or the initial rebuild's error.
    pub fn create_parametric_with(
        &mut self,
        name: impl Into<String>,
        mut data: ParametricData,
    ) -> Result<ObjectId> {
        let name = name.into();
        if self.objects.values().any(|o| o.mode == Mode::Edit) {
            warn!(object = %name, "creation refused outside object mode");
            return Err(OperationError::WrongMode.into());
        }

        let previous = (self.selected.clone(), self.active);
        self.deselect_all();
        data.manipulators = ParameterField::ALL
            .iter()
            .map(|&field| Manipulator { field })
            .collect();

        let mut object = Object::new(name.clone(), Mesh::new(name));
        object.location = self.cursor;
        object.parametric = Some(data);
        let id = self.objects.insert(object);
        self.select(id);
        self.active = Some(id);

        if let Err(e) = self.refresh(id) {
            self.remove_object(id)?;
            (self.selected, self.active) = previous;
            return Err(e);
        }
        Ok(id)
    }

    /// Re-applies the current parameters of a parametric object.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` has no parametric data or the update fails.
    pub fn refresh(&mut self, id: ObjectId) -> Result<UpdateState> {
        self.apply(id, |params| Ok(*params))
    }

    /// Handles a parameter change: validate, recompute, update the mesh.
    ///
    /// On error neither the parameters nor the mesh change.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::InvalidParameter`] for an
    /// out-of-range value, [`OperationError::NotParametric`] if no parametric
    /// data is reachable from `id`, or the update's error.
    pub fn on_change(
        &mut self,
        id: ObjectId,
        field: ParameterField,
        value: f64,
    ) -> Result<UpdateState> {
        self.apply(id, |params| params.with(field, value))
    }

    /// Switches the shape variant of a parametric object and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotParametric`] if no parametric data is
    /// reachable from `id`, or the rebuild's error.
    pub fn set_shape(&mut self, id: ObjectId, shape: Box<dyn Shape>) -> Result<UpdateState> {
        let target = self.parametric_target(id)?;
        if let Some(data) = self.objects[target].parametric.as_mut() {
            data.shape = shape;
            data.updater.invalidate();
        }
        self.refresh(target)
    }

    fn parametric_target(&self, id: ObjectId) -> Result<ObjectId> {
        self.find_parametric(id).ok_or_else(|| {
            let name = self
                .objects
                .get(id)
                .map_or_else(|| "<missing>".to_string(), |o| o.name.clone());
            OperationError::NotParametric(name).into()
        })
    }

    fn apply(
        &mut self,
        id: ObjectId,
        next: impl FnOnce(&ParameterSet) -> Result<ParameterSet>,
    ) -> Result<UpdateState> {
        let target = self.parametric_target(id)?;
        let mut session = self.begin_edit(target)?;
        let object = session.object_mut();
        let Some(data) = object.parametric.as_mut() else {
            return Err(OperationError::NotParametric(object.name.clone()).into());
        };

        let params = next(&data.params)?;
        let snapshot = data.shape.compute_geometry(&params);
        let outcome = data.updater.apply(&mut object.mesh, &snapshot)?;
        data.params = params;

        debug!(object = %object.name, ?outcome, "applied parameters");
        Ok(outcome)
    }
}
