use tracing::{debug, warn};

use crate::error::Result;
use crate::mesh::Mesh;
use crate::shape::GeometrySnapshot;

use super::{BuildOptions, Rebuild, UpdateVertices};

/// How the next geometry update reaches the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// Topology unchanged since the last build: patch vertex positions.
    FastPath,
    /// Topology changed or never built: replace everything.
    FullRebuild,
}

/// Chooses between a vertex patch and a full rebuild for each update.
///
/// Starts in [`UpdateState::FullRebuild`], since a fresh mesh has never
/// been built. After every successful rebuild the state returns to
/// [`UpdateState::FastPath`].
#[derive(Debug, Clone)]
pub struct MeshUpdater {
    state: UpdateState,
    last_counts: Option<(usize, usize)>,
    options: BuildOptions,
}

impl Default for MeshUpdater {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl MeshUpdater {
    /// Creates an updater that rebuilds with `options`.
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            state: UpdateState::FullRebuild,
            last_counts: None,
            options,
        }
    }

    /// State that the next [`MeshUpdater::apply`] starts from.
    #[must_use]
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Rebuild options.
    #[must_use]
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Forces the next update to rebuild, e.g. after a shape variant switch.
    pub fn invalidate(&mut self) {
        self.state = UpdateState::FullRebuild;
    }

    /// Applies `snapshot` to `mesh`, returning the path that was taken.
    ///
    /// A patch that fails with a topology mismatch, e.g. because vertices
    /// were removed from the mesh since the last build, falls back to a
    /// rebuild.
    ///
    /// # Errors
    ///
    /// Returns the rebuild's validation error. The mesh is unchanged and the
    /// next call will attempt a rebuild again.
    pub fn apply(&mut self, mesh: &mut Mesh, snapshot: &GeometrySnapshot) -> Result<UpdateState> {
        let counts = (snapshot.vertex_count(), snapshot.face_count());

        // A vertex count drift is caught by the patch itself
        if self.state == UpdateState::FastPath
            && self.last_counts == Some(counts)
            && mesh.face_count() == counts.1
        {
            match UpdateVertices::new(&snapshot.vertices).execute(mesh) {
                Ok(()) => return Ok(UpdateState::FastPath),
                Err(e) if e.is_recoverable() => {
                    warn!(mesh = mesh.name(), error = %e, "vertex patch failed, rebuilding");
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(
                mesh = mesh.name(),
                state = ?self.state,
                last = ?self.last_counts,
                next = ?counts,
                "topology changed, rebuilding"
            );
        }

        self.state = UpdateState::FullRebuild;
        Rebuild::from_snapshot(snapshot)
            .with_options(self.options)
            .execute(mesh)?;
        self.state = UpdateState::FastPath;
        self.last_counts = Some(counts);
        Ok(UpdateState::FullRebuild)
    }
}
