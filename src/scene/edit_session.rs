use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::mesh::Mesh;

use super::{Mode, Object, ObjectId, Scene};

/// Exclusive edit access to one object's mesh.
///
/// While the session lives, the target is the active, selected object and
/// is in edit mode. Dropping the session puts the target back in object
/// mode and restores the previous active object and selection, whether the
/// edit succeeded, returned an error or panicked.
#[derive(Debug)]
pub struct EditSession<'a> {
    scene: &'a mut Scene,
    target: ObjectId,
    active: Option<ObjectId>,
    selected: BTreeSet<ObjectId>,
}

impl<'a> EditSession<'a> {
    pub(super) fn begin(scene: &'a mut Scene, target: ObjectId) -> Result<Self> {
        if !scene.objects.contains_key(target) {
            return Err(TopologyError::EntityNotFound("object".into()).into());
        }

        let active = scene.active;
        let selected = scene.selected.clone();

        scene.selected.insert(target);
        scene.active = Some(target);
        let object = &mut scene.objects[target];
        object.mode = Mode::Edit;
        object.mesh.ensure_lookup_tables();
        debug!(object = %object.name, "entered edit mode");

        Ok(Self {
            scene,
            target,
            active,
            selected,
        })
    }

    /// The object being edited.
    #[must_use]
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// The object being edited.
    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.scene.objects[self.target]
    }

    /// The mesh being edited.
    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.object_mut().mesh
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if let Some(object) = self.scene.objects.get_mut(self.target) {
            object.mode = Mode::Object;
            debug!(object = %object.name, "left edit mode");
        }
        self.scene.active = self.active;
        self.scene.selected = std::mem::take(&mut self.selected);
    }
}
