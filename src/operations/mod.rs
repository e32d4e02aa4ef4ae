mod rebuild;
mod update_aspect;
mod update_vertices;
mod updater;
mod weld;

pub use rebuild::{BuildStats, Rebuild};
pub use update_aspect::UpdateAspect;
pub use update_vertices::UpdateVertices;
pub use updater::{MeshUpdater, UpdateState};

use crate::math::WELD_DISTANCE;

/// Options controlling a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Merge vertices closer than `weld_distance`.
    pub weld: bool,
    /// Remove vertices that no face uses.
    pub clean: bool,
    /// Maximum distance between two vertices that get welded.
    pub weld_distance: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            weld: false,
            clean: false,
            weld_distance: WELD_DISTANCE,
        }
    }
}
