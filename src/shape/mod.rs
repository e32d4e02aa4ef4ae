mod box_shape;
pub(crate) mod snapshot;

pub use box_shape::BoxShape;
pub use snapshot::GeometrySnapshot;

use crate::params::ParameterSet;

/// A parametric shape: a pure mapping from parameters to mesh geometry.
///
/// Implementations must be deterministic and side-effect free. The mesh
/// updater relies on two calls with equal parameters yielding equal snapshots.
pub trait Shape: std::fmt::Debug {
    /// Computes the vertex, face, material and UV arrays for `params`.
    fn compute_geometry(&self, params: &ParameterSet) -> GeometrySnapshot;
}
