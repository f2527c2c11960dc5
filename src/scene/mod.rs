//! Overlay scene objects.
//!
//! This module provides:
//! - Mesh data structures shared by the builders, the loader, and GPU upload
//! - Procedural geometry builders (beam, marker, photo disc, arrow)
//! - Asynchronous mesh-file loading with detach-safe completions
//! - The placed-object registry keyed by a closed role enumeration

pub mod geometry;
mod loader;
mod mesh;
mod registry;

pub use loader::{parse_mesh_document, MeshLoadChannel, MeshLoadResult};
pub use mesh::{Material, MeshData, Vertex, VERTEX_STRIDE};
pub use registry::{SceneObjectEntry, SceneObjectRole, SceneObjectSet};
