//! Asynchronous mesh-file loading.
//!
//! Mesh documents are read and parsed off-thread; completions cross back over
//! a channel and are drained once per frame from the render callback. A
//! generation stamp taken at spawn time makes completions that land after the
//! owning layer detached inert: the drain compares stamps and drops stale
//! results instead of registering into a torn-down scene.

use super::mesh::MeshData;
use super::registry::SceneObjectRole;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Outcome of one mesh-file load.
#[derive(Debug)]
pub enum MeshLoadResult {
    /// Parsed and validated mesh ready for GPU upload.
    Loaded {
        role: SceneObjectRole,
        generation: u64,
        mesh: MeshData,
    },
    /// Load failed; the role's slot stays unset.
    Failed {
        role: SceneObjectRole,
        generation: u64,
        error: String,
    },
}

impl MeshLoadResult {
    pub fn generation(&self) -> u64 {
        match self {
            MeshLoadResult::Loaded { generation, .. } => *generation,
            MeshLoadResult::Failed { generation, .. } => *generation,
        }
    }
}

/// Channel-based mesh loader.
///
/// Loads are spawned on worker threads while the frame loop keeps running;
/// results are polled with [`try_recv`](Self::try_recv).
pub struct MeshLoadChannel {
    sender: Sender<MeshLoadResult>,
    receiver: Receiver<MeshLoadResult>,
    pending: Cell<usize>,
}

impl Default for MeshLoadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLoadChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            pending: Cell::new(0),
        }
    }

    /// Number of loads spawned but not yet drained.
    pub fn pending_loads(&self) -> usize {
        self.pending.get()
    }

    /// Spawns a load of the mesh document at `path` for `role`.
    ///
    /// `generation` is echoed back in the result; the caller compares it
    /// against its current generation to discard post-detach completions.
    pub fn load_file(&self, role: SceneObjectRole, path: PathBuf, generation: u64) {
        log::debug!("loading {} mesh from {}", role.label(), path.display());
        self.pending.set(self.pending.get() + 1);
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let result = match load_mesh_file(&path) {
                Ok(mesh) => MeshLoadResult::Loaded {
                    role,
                    generation,
                    mesh,
                },
                Err(error) => MeshLoadResult::Failed {
                    role,
                    generation,
                    error,
                },
            };
            // The receiver may already be gone; a dead layer needs no result.
            let _ = sender.send(result);
        });
    }

    /// Non-blocking receive for completed loads.
    pub fn try_recv(&self) -> Option<MeshLoadResult> {
        let result = self.receiver.try_recv().ok();
        if result.is_some() {
            self.pending.set(self.pending.get().saturating_sub(1));
        }
        result
    }
}

/// Reads and validates a JSON mesh document.
fn load_mesh_file(path: &Path) -> Result<MeshData, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_mesh_document(&contents)
}

/// Parses a JSON mesh document into validated [`MeshData`].
pub fn parse_mesh_document(contents: &str) -> Result<MeshData, String> {
    let mesh: MeshData =
        serde_json::from_str(contents).map_err(|e| format!("failed to parse mesh: {}", e))?;
    mesh.validate()?;
    Ok(mesh)
}
