use crate::operations::MeshUpdater;
use crate::params::{ParameterField, ParameterSet};
use crate::shape::{BoxShape, Shape};

/// An on-screen size handle bound to one parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manipulator {
    /// The field this handle drags.
    pub field: ParameterField,
}

/// Parametric data attached to an object: its parameters, the shape that
/// turns them into geometry, and the update policy for its mesh.
#[derive(Debug)]
pub struct ParametricData {
    /// Current, last-applied parameters.
    pub params: ParameterSet,
    /// Active shape variant.
    pub shape: Box<dyn Shape>,
    /// Update policy for the object mesh.
    pub updater: MeshUpdater,
    /// Handles available for interactive editing.
    pub manipulators: Vec<Manipulator>,
}

impl ParametricData {
    /// Creates parametric data for a box with no manipulators.
    #[must_use]
    pub fn new(params: ParameterSet) -> Self {
        Self::with_shape(params, Box::new(BoxShape::new()))
    }

    /// Creates parametric data for an arbitrary shape.
    #[must_use]
    pub fn with_shape(params: ParameterSet, shape: Box<dyn Shape>) -> Self {
        Self {
            params,
            shape,
            updater: MeshUpdater::default(),
            manipulators: Vec::new(),
        }
    }

    /// Returns `true` if a manipulator drives `field`.
    #[must_use]
    pub fn has_manipulator(&self, field: ParameterField) -> bool {
        self.manipulators.iter().any(|m| m.field == field)
    }
}
