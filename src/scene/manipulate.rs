use tracing::debug;

use crate::error::{OperationError, Result};
use crate::operations::UpdateState;
use crate::params::ParameterField;

use super::{ObjectId, Scene};

/// An interactive drag of one size handle.
///
/// Every intermediate value is applied as a complete update, so there is
/// never partial geometry to roll back. Cancelling re-applies the value the
/// field had when the drag began.
#[derive(Debug)]
pub struct ManipulationSession<'a> {
    scene: &'a mut Scene,
    target: ObjectId,
    field: ParameterField,
    confirmed: f64,
}

impl<'a> ManipulationSession<'a> {
    /// Starts dragging `field` on the parametric object reachable from `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotParametric`] if no parametric data is
    /// reachable, or [`OperationError::InvalidInput`] if the object has no
    /// handle for `field`.
    pub fn begin(scene: &'a mut Scene, id: ObjectId, field: ParameterField) -> Result<Self> {
        let target = scene.parametric_target(id)?;
        let data = scene
            .parametric(target)
            .ok_or_else(|| OperationError::NotParametric(format!("{target:?}")))?;
        if !data.has_manipulator(field) {
            return Err(
                OperationError::InvalidInput(format!("no manipulator for {}", field.name())).into(),
            );
        }
        let confirmed = data.params.get(field);
        debug!(field = field.name(), value = confirmed, "manipulation started");

        Ok(Self {
            scene,
            target,
            field,
            confirmed,
        })
    }

    /// The field being dragged.
    #[must_use]
    pub fn field(&self) -> ParameterField {
        self.field
    }

    /// The value the field had when the drag began.
    #[must_use]
    pub fn confirmed(&self) -> f64 {
        self.confirmed
    }

    /// Applies an intermediate drag value.
    ///
    /// # Errors
    ///
    /// Returns the parameter change error; the previous value stays applied.
    pub fn drag(&mut self, value: f64) -> Result<UpdateState> {
        self.scene.on_change(self.target, self.field, value)
    }

    /// Ends the drag, keeping the last applied value.
    #[must_use = "returns the final field value"]
    pub fn confirm(self) -> f64 {
        let value = self
            .scene
            .parametric(self.target)
            .map_or(self.confirmed, |data| data.params.get(self.field));
        debug!(field = self.field.name(), value, "manipulation confirmed");
        value
    }

    /// Aborts the drag and re-applies the value from before it began.
    ///
    /// # Errors
    ///
    /// Returns the update error if restoring fails.
    pub fn cancel(self) -> Result<UpdateState> {
        debug!(field = self.field.name(), value = self.confirmed, "manipulation cancelled");
        self.scene.on_change(self.target, self.field, self.confirmed)
    }
}
