use thiserror::Error;

/// Top-level error type for the Parabox mesh engine.
#[derive(Debug, Error)]
pub enum ParaboxError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

impl ParaboxError {
    /// Returns `true` if the caller can recover by falling back to a full rebuild.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Topology(TopologyError::TopologyMismatch { .. }))
    }
}

/// Errors related to parameters and geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised when geometry arrays disagree with the mesh topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{material_ids} material ids given for {faces} faces")]
    MaterialCount { faces: usize, material_ids: usize },

    #[error("{uvs} uv loops given for {faces} faces")]
    UvCount { faces: usize, uvs: usize },

    #[error("face {face} has {corners} corners but {uvs} uvs")]
    UvLoop {
        face: usize,
        corners: usize,
        uvs: usize,
    },

    #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("face {face} is degenerate: {reason}")]
    DegenerateFace { face: usize, reason: &'static str },

    #[error("vertex count mismatch: mesh has {expected}, got {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Errors related to scene-level operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("operation only valid in object mode")]
    WrongMode,

    #[error("object {0} carries no parametric data")]
    NotParametric(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`ParaboxError`].
pub type Result<T> = std::result::Result<T, ParaboxError>;
